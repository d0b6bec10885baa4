//! Session counters
//!
//! Updated by workers at expansion boundaries and read without
//! coordination: every counter is a relaxed atomic, and a snapshot is a
//! set of independent loads, not a consistent cut.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct SearchStats {
    pub nodes_added: AtomicU64,
    pub moves_added: AtomicU64,
    pub nodes_examined: AtomicU64,
    pub white_wins_found: AtomicU64,
    pub black_wins_found: AtomicU64,
    pub stalemates_found: AtomicU64,
    pub normals_found: AtomicU64,
}

impl SearchStats {
    pub fn reset(&self) {
        self.nodes_added.store(0, Ordering::Relaxed);
        self.moves_added.store(0, Ordering::Relaxed);
        self.nodes_examined.store(0, Ordering::Relaxed);
        self.white_wins_found.store(0, Ordering::Relaxed);
        self.black_wins_found.store(0, Ordering::Relaxed);
        self.stalemates_found.store(0, Ordering::Relaxed);
        self.normals_found.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            nodes_added: self.nodes_added.load(Ordering::Relaxed),
            moves_added: self.moves_added.load(Ordering::Relaxed),
            nodes_examined: self.nodes_examined.load(Ordering::Relaxed),
            white_wins_found: self.white_wins_found.load(Ordering::Relaxed),
            black_wins_found: self.black_wins_found.load(Ordering::Relaxed),
            stalemates_found: self.stalemates_found.load(Ordering::Relaxed),
            normals_found: self.normals_found.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub nodes_added: u64,
    pub moves_added: u64,
    pub nodes_examined: u64,
    pub white_wins_found: u64,
    pub black_wins_found: u64,
    pub stalemates_found: u64,
    pub normals_found: u64,
}
