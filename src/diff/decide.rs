//! Direction policy: which classifications call for a copy

use crate::types::{Classification, Decision, Direction};

/// Decide what to do with a classified regular file
///
/// Backup copies when the mirror is absent or stale. Restore only copies from
/// a mirror that is strictly newer than the working file; restoring from an
/// older or absent mirror makes no sense.
pub fn decide(classification: Classification, direction: Direction) -> Decision {
    match (direction, classification) {
        (Direction::Backup, Classification::Missing) => Decision::Copy { overwrite: false },
        (Direction::Backup, Classification::MirrorOlder) => Decision::Copy { overwrite: true },
        (Direction::Backup, Classification::InSync | Classification::MirrorNewer) => Decision::Skip,

        (Direction::Restore, Classification::MirrorNewer) => Decision::Copy { overwrite: true },
        (
            Direction::Restore,
            Classification::Missing | Classification::InSync | Classification::MirrorOlder,
        ) => Decision::Skip,
    }
}
