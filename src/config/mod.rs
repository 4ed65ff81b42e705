//! Configuration management

use super::types::{Direction, ShadowError};
use clap::{ArgAction, Parser};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Mirror a directory into `.backup/` and restore from it
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "shadowbak", version, about)]
pub struct Cli {
    /// Restore working files from newer mirrors instead of backing up
    #[arg(short = 'r', long)]
    pub restore: bool,

    /// Directory to reconcile (default: current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Number of transfer workers
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Show what would be copied without touching anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Re-read both sides after each copy and compare blake3 hashes
    #[arg(long)]
    pub verify: bool,

    /// Skip entries whose name matches GLOB (repeatable)
    #[arg(short = 'e', long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// TOML file with defaults (jobs, verify, exclude)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON instead of progress lines
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Upper bound for `jobs`; each job is one runtime thread
pub const MAX_JOBS: usize = 256;

/// Defaults read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub jobs: Option<usize>,
    pub verify: Option<bool>,
    pub exclude: Vec<String>,
}

impl FileConfig {
    /// Load and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self, ShadowError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ShadowError::Config(format!("Cannot read config file {:?}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ShadowError::Config(format!("Invalid config file {:?}: {}", path, e)))
    }
}

/// Global configuration for shadowbak
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute path of the directory to reconcile
    pub directory: PathBuf,

    /// Backup (working → mirror) or restore (mirror → working)
    pub direction: Direction,

    /// Number of transfer workers
    pub jobs: usize,

    /// Dry run (classify and report, don't copy)
    pub dry_run: bool,

    /// Verify each copy with blake3
    pub verify: bool,

    /// Exclude patterns (globs on entry names)
    pub exclude_patterns: Vec<String>,

    /// JSON summary instead of progress lines
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            direction: Direction::Backup,
            dry_run: false,
            jobs: 1,
            verify: false,
            exclude_patterns: Vec::new(),
            json: false,
        }
    }
}

impl Config {
    /// Config for `directory` in the given direction with everything else default
    pub fn for_directory(directory: impl Into<PathBuf>, direction: Direction) -> Self {
        Self {
            directory: directory.into(),
            direction,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ShadowError> {
        if !self.directory.is_dir() {
            return Err(ShadowError::Config(format!(
                "Directory does not exist or is not a directory: {:?}",
                self.directory
            )));
        }

        if self.jobs == 0 {
            return Err(ShadowError::Config(
                "Number of jobs must be at least 1".to_string(),
            ));
        }

        if self.jobs > MAX_JOBS {
            return Err(ShadowError::Config(format!(
                "Number of jobs must be at most {}, got {}",
                MAX_JOBS, self.jobs
            )));
        }

        Ok(())
    }
}

impl TryFrom<Cli> for Config {
    type Error = ShadowError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let cwd = std::env::current_dir().map_err(ShadowError::WorkingDirectory)?;
        let directory = match cli.directory {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => cwd.join(dir),
            None => cwd,
        };

        let mut exclude_patterns = file.exclude;
        exclude_patterns.extend(cli.exclude);

        let config = Config {
            directory,
            direction: if cli.restore {
                Direction::Restore
            } else {
                Direction::Backup
            },
            jobs: cli.jobs.or(file.jobs).unwrap_or(1),
            dry_run: cli.dry_run,
            verify: cli.verify || file.verify.unwrap_or(false),
            exclude_patterns,
            json: cli.json,
        };

        config.validate()?;
        Ok(config)
    }
}
