//! XP, collectibles and rank progression

use questline_store::{KvStore, PROGRESS_KEY, TypedStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// XP granted for a newly collected card
pub const CARD_XP: u64 = 25;

/// XP granted for a newly completed operation
pub const OPERATION_XP: u64 = 100;

/// Operation unlocked for every new player
pub const FIRST_OPERATION: &str = "op_1";

/// A rank reached by completing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub id: u8,
    pub name: &'static str,
    pub min_ops: usize,
}

/// Ranks in ascending order
pub const RANKS: [Rank; 6] = [
    Rank { id: 1, name: "Civilian", min_ops: 0 },
    Rank { id: 2, name: "Recruit", min_ops: 1 },
    Rank { id: 3, name: "Operator", min_ops: 4 },
    Rank { id: 4, name: "Specialist", min_ops: 8 },
    Rank { id: 5, name: "Commander", min_ops: 12 },
    Rank { id: 6, name: "Life OS Master", min_ops: 16 },
];

/// Rank for a number of completed operations
pub fn rank_for(completed_ops: usize) -> Rank {
    RANKS
        .iter()
        .rev()
        .find(|r| completed_ops >= r.min_ops)
        .copied()
        .unwrap_or(RANKS[0])
}

/// Persisted player progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameProgress {
    pub xp: u64,
    pub collected_cards: Vec<String>,
    pub completed_operations: Vec<String>,
    pub unlocked_operations: Vec<String>,
    pub achievements: Vec<String>,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            xp: 0,
            collected_cards: Vec::new(),
            completed_operations: Vec::new(),
            unlocked_operations: vec![FIRST_OPERATION.to_string()],
            achievements: Vec::new(),
        }
    }
}

impl GameProgress {
    pub fn add_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Returns true if the card was new
    pub fn collect_card(&mut self, card_id: &str) -> bool {
        if self.collected_cards.iter().any(|c| c == card_id) {
            return false;
        }
        self.collected_cards.push(card_id.to_string());
        self.add_xp(CARD_XP);
        true
    }

    /// Complete `op_N` and unlock `op_{N+1}`. Returns true if it was not
    /// already completed.
    pub fn complete_operation(&mut self, op_id: &str) -> bool {
        if self.completed_operations.iter().any(|o| o == op_id) {
            return false;
        }
        self.completed_operations.push(op_id.to_string());
        self.add_xp(OPERATION_XP);
        if let Some(next) = next_operation(op_id) {
            self.unlock_operation(&next);
        }
        true
    }

    /// Returns true if the operation was not already unlocked
    pub fn unlock_operation(&mut self, op_id: &str) -> bool {
        if self.is_unlocked(op_id) {
            return false;
        }
        self.unlocked_operations.push(op_id.to_string());
        true
    }

    pub fn is_unlocked(&self, op_id: &str) -> bool {
        self.unlocked_operations.iter().any(|o| o == op_id)
    }

    pub fn rank(&self) -> Rank {
        rank_for(self.completed_operations.len())
    }
}

fn next_operation(op_id: &str) -> Option<String> {
    let n: u32 = op_id.strip_prefix("op_")?.parse().ok()?;
    Some(format!("op_{}", n.checked_add(1)?))
}

/// Loads progress once and writes it back after every change.
///
/// Missing or corrupt saved progress starts over from the defaults; failed
/// saves are logged and otherwise ignored.
pub struct ProgressTracker {
    store: TypedStore,
    progress: GameProgress,
}

impl ProgressTracker {
    pub fn load(store: Arc<dyn KvStore>) -> Self {
        let store = TypedStore::new(store);
        let progress = store
            .get_json(PROGRESS_KEY, |p: &GameProgress| !p.unlocked_operations.is_empty())
            .unwrap_or_default();

        debug!(xp = progress.xp, rank = progress.rank().name, "Progress loaded");
        Self { store, progress }
    }

    pub fn progress(&self) -> &GameProgress {
        &self.progress
    }

    pub fn rank(&self) -> Rank {
        self.progress.rank()
    }

    pub fn add_xp(&mut self, amount: u64) {
        self.progress.add_xp(amount);
        self.save();
    }

    pub fn collect_card(&mut self, card_id: &str) -> bool {
        let added = self.progress.collect_card(card_id);
        if added {
            self.save();
        }
        added
    }

    pub fn complete_operation(&mut self, op_id: &str) -> bool {
        let before = self.progress.rank();
        let completed = self.progress.complete_operation(op_id);
        if completed {
            let after = self.progress.rank();
            if after != before {
                info!(rank = after.name, "Rank up");
            }
            self.save();
        }
        completed
    }

    pub fn unlock_operation(&mut self, op_id: &str) -> bool {
        let unlocked = self.progress.unlock_operation(op_id);
        if unlocked {
            self.save();
        }
        unlocked
    }

    /// Discard all progress
    pub fn reset(&mut self) {
        self.progress = GameProgress::default();
        self.save();
        info!("Progress reset");
    }

    fn save(&self) {
        self.store.set_json(PROGRESS_KEY, &self.progress);
    }
}
