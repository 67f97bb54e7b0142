//! Save slots - export and import the whole progress as one binary blob.
//!
//! Uses bincode so a slot can be copied between stores or kept as a
//! backup. Loading replaces every persisted record at once.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use heartquest_logic::leaderboard::LeaderboardEntry;
use heartquest_logic::progression::LevelProgress;

use crate::context::ProgressContext;
use crate::store::KeyValueStore;

/// Version number for save slot format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of persisted progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub levels: Vec<LevelProgress>,
    pub hearts: u32,
    pub xp: u32,
}

impl SaveData {
    pub fn capture<S: KeyValueStore>(ctx: &ProgressContext<S>) -> Self {
        Self {
            version: SAVE_VERSION,
            leaderboard: ctx.leaderboard(),
            levels: ctx.level_progress(),
            hearts: ctx.hearts(),
            xp: ctx.xp(),
        }
    }
}

/// Write the current progress to a writer
pub fn save_progress<W: Write, S: KeyValueStore>(
    writer: W,
    ctx: &ProgressContext<S>,
) -> Result<(), SaveError> {
    bincode::serialize_into(writer, &SaveData::capture(ctx))?;
    Ok(())
}

/// Replace the current progress with a slot read from a reader
///
/// Nothing is written unless the slot decodes and its version matches.
pub fn load_progress<R: Read, S: KeyValueStore>(
    reader: R,
    ctx: &mut ProgressContext<S>,
) -> Result<SaveData, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    ctx.restore(&save_data);
    Ok(save_data)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use heartquest_logic::games::GameKind;

    #[test]
    fn test_slot_restores_into_fresh_context() {
        let mut ctx = ProgressContext::in_memory();
        ctx.save_score(GameKind::Puzzle, 58, 100);
        ctx.complete_game(1, GameKind::HeartClick);
        ctx.complete_game(1, GameKind::WordMatch);
        ctx.set_hearts(2);
        ctx.set_xp(45);

        let mut slot = Vec::new();
        save_progress(&mut slot, &ctx).expect("Save failed");

        let mut restored = ProgressContext::in_memory();
        load_progress(&slot[..], &mut restored).expect("Load failed");

        assert_eq!(restored.best_score(GameKind::Puzzle), 58);
        assert!(restored.is_level_unlocked(2));
        assert_eq!(restored.hearts(), 2);
        assert_eq!(restored.xp(), 45);
    }

    #[test]
    fn test_version_mismatch_leaves_progress_untouched() {
        let mut ctx = ProgressContext::in_memory();
        ctx.set_xp(30);

        let stale = SaveData {
            version: SAVE_VERSION + 1,
            leaderboard: Vec::new(),
            levels: Vec::new(),
            hearts: 0,
            xp: 90,
        };
        let slot = bincode::serialize(&stale).unwrap();

        let err = load_progress(&slot[..], &mut ctx).unwrap_err();
        assert!(matches!(err, SaveError::VersionMismatch { found, .. } if found == SAVE_VERSION + 1));
        assert_eq!(ctx.xp(), 30);
    }

    #[test]
    fn test_truncated_slot_is_an_error() {
        let mut ctx = ProgressContext::in_memory();
        let err = load_progress(&[1u8, 0, 0][..], &mut ctx).unwrap_err();
        assert!(matches!(err, SaveError::Bincode(_)));
        assert_eq!(ctx.hearts(), 5);
    }
}
