//! The engine session object
//!
//! Owns the shared arena, the worker threads and worker 0's state.
//! Worker 0 is the caller's thread: it builds and seeds each session,
//! then acts as the driver while workers 1..N-1 search. One session is
//! one `setup_evaluation` followed by start/stop (or a timed evaluate);
//! a session consumes arena capacity and leaves it in place until the
//! next setup rewinds the cursors.
//!
//! Dropping the engine clears the `live` flags and joins the workers.
//! Re-initialization is expressed by dropping and constructing a new
//! instance.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::debug;

use super::expand::{examine, expand, ExamineResult, StepOutcome};
use super::worker::{worker_main, Flags, SessionSeed, WorkerState};
use super::Shared;
use crate::arena::{MovePool, NodeArena};
use crate::constants::*;
use crate::error::{EngineError, EngineResult};
use crate::evaluation::{full_eval, EvalTables};
use crate::output::{report, OutputReport};
use crate::stats::{SearchStats, StatsSnapshot};
use crate::types::Position;

struct WorkerHandle {
    flags: Arc<Flags>,
    seeds: Sender<SessionSeed>,
    thread: Option<JoinHandle<()>>,
}

pub struct Engine {
    shared: Arc<Shared>,
    workers: Vec<WorkerHandle>,
    running_count: Arc<AtomicUsize>,
    /// Worker 0's search state, used on the calling thread.
    driver: WorkerState,
    seed_reps: u32,
    setup_complete: bool,
    /// Position of the current session's root.
    session: Option<Position>,
}

impl Engine {
    /// Allocate the arena and pools and spawn `thread_count - 1` worker
    /// threads. Parameter bounds: nodes and moves in 1000..=2e9,
    /// threads in 2..=100, seed reps in 0..=2e9.
    pub fn init(
        total_nodes: i64,
        total_moves: i64,
        thread_count: i64,
        seed_reps: i64,
    ) -> EngineResult<Engine> {
        if !(MIN_NODES as i64..=MAX_NODES as i64).contains(&total_nodes) {
            return Err(EngineError::InvalidParameter {
                name: "total_nodes",
                value: total_nodes,
            });
        }
        if !(MIN_MOVES as i64..=MAX_MOVES as i64).contains(&total_moves) {
            return Err(EngineError::InvalidParameter {
                name: "total_moves",
                value: total_moves,
            });
        }
        if !(MIN_THREADS as i64..=MAX_THREADS as i64).contains(&thread_count) {
            return Err(EngineError::InvalidParameter {
                name: "thread_count",
                value: thread_count,
            });
        }
        if !(0..=MAX_SEED_REPS as i64).contains(&seed_reps) {
            return Err(EngineError::InvalidParameter {
                name: "seed_reps",
                value: seed_reps,
            });
        }

        let shared = Arc::new(Shared {
            arena: NodeArena::new(total_nodes as usize),
            moves: MovePool::new(total_moves as usize),
            tables: EvalTables::new(),
            stats: SearchStats::default(),
            depth_limit: AtomicU32::new(0),
        });
        let queue_ceiling = (total_nodes / thread_count) as usize;
        let running_count = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(thread_count as usize - 1);
        for id in 1..thread_count as u32 {
            let flags = Arc::new(Flags::new());
            let (tx, rx) = channel();
            let thread = std::thread::Builder::new()
                .name(format!("frontier-worker-{id}"))
                .spawn({
                    let shared = Arc::clone(&shared);
                    let flags = Arc::clone(&flags);
                    let running_count = Arc::clone(&running_count);
                    move || worker_main(shared, flags, rx, running_count, queue_ceiling)
                })
                .map_err(|source| EngineError::WorkerSpawn { id, source })?;
            workers.push(WorkerHandle {
                flags,
                seeds: tx,
                thread: Some(thread),
            });
        }

        debug!(
            "engine up: {} node slots, {} move slots, {} workers, {} seed reps",
            total_nodes,
            total_moves,
            thread_count - 1,
            seed_reps
        );

        Ok(Engine {
            shared,
            workers,
            running_count,
            driver: WorkerState::new(queue_ceiling),
            seed_reps: seed_reps as u32,
            setup_complete: false,
            session: None,
        })
    }

    /// Rewind the arena, build the root from `position`, expand it on
    /// worker 0, run the seed phase, and distribute the queued frontier
    /// round-robin over the other workers.
    pub fn setup_evaluation(&mut self, depth_limit: u32, position: &Position) {
        self.stop_workers();
        self.setup_complete = false;

        let shared = &self.shared;
        shared.arena.reset();
        shared.moves.reset();
        shared.stats.reset();
        shared.depth_limit.store(depth_limit, Ordering::Relaxed);
        self.driver.begin_session(position.board);

        let root = shared
            .arena
            .try_reserve(1)
            .expect("a freshly reset arena holds at least MIN_NODES slots");
        debug_assert_eq!(root, 0);
        shared.stats.nodes_added.fetch_add(1, Ordering::Relaxed);
        {
            // SAFETY: slot 0 was just reserved on this thread and no
            // worker is running.
            let node = unsafe { shared.arena.node_mut(0) };
            node.from = position.square_from;
            node.to = position.square_to;
            node.side = position.side;
            node.state = position.game_state;
            node.parent = -1;
            node.castling = position.state.castling;
            node.en_passant_file = position.state.en_passant_file;
            node.halfmove_clock = position.state.halfmove_clock;
            node.king_sq = position.state.king_sq;
            node.score = ROOT_SCORE;
            node.move_start = 0;
            node.num_moves = 0;
            node.clear_expansion();
            node.set_eval(full_eval(&position.board, &shared.tables));
        }

        if let ExamineResult::Expandable { .. } = examine(shared, &mut self.driver, 0) {
            self.driver.queue.push(ROOT_SCORE, 0);
        }

        // Seed phase: grow the tree a little on worker 0 so there is
        // something to hand out.
        for _ in 0..self.seed_reps {
            if self.driver.exhausted || self.driver.queue.is_empty() {
                break;
            }
            let index = self.driver.queue.pop().expect("queue checked non-empty");
            if let StepOutcome::OutOfSpace = expand(shared, &mut self.driver, index as usize) {
                self.driver.exhausted = true;
            }
        }

        // Distribute worker 0's frontier round-robin, lowest scores
        // first, and ship each worker its share together with the root
        // board. An empty share still resets the worker's session.
        let mut batches: Vec<Vec<(f64, u32)>> = vec![Vec::new(); self.workers.len()];
        let mut next = 0;
        while let Some(index) = self.driver.queue.pop() {
            let score = shared.arena.node(index as usize).score;
            batches[next].push((score, index));
            next = (next + 1) % self.workers.len();
        }
        let seeded: usize = batches.iter().map(Vec::len).sum();
        for (handle, entries) in self.workers.iter().zip(batches) {
            let _ = handle.seeds.send(SessionSeed {
                board: position.board,
                entries,
            });
        }

        debug!(
            "session seeded: {} nodes in arena, {} queued across {} workers",
            shared.arena.len(),
            seeded,
            self.workers.len()
        );

        self.session = Some(*position);
        self.setup_complete = true;
    }

    /// Let workers 1..N-1 search until stopped.
    pub fn evaluate_start(&self) -> bool {
        if !self.setup_complete {
            return false;
        }
        self.running_count
            .store(self.workers.len(), Ordering::Release);
        for handle in &self.workers {
            handle.flags.running.store(true, Ordering::Release);
            handle.flags.run.store(true, Ordering::Release);
        }
        true
    }

    /// Stop the workers and wait until every one has wound down. The
    /// root's children are a stable snapshot afterwards.
    pub fn evaluate_stop(&self) -> bool {
        self.stop_workers();
        true
    }

    /// Run a time-bounded session: start, spin on the wall clock on the
    /// calling thread, stop.
    pub fn evaluate_time(&self, ms: u64) -> bool {
        if !self.evaluate_start() {
            return false;
        }
        let deadline = Instant::now() + Duration::from_millis(ms);
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
        self.evaluate_stop()
    }

    /// Sorted root choices plus the session counters.
    pub fn output(&self) -> OutputReport {
        report(&self.shared, self.session.as_ref())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    fn stop_workers(&self) {
        for handle in &self.workers {
            handle.flags.run.store(false, Ordering::Release);
        }
        while self.running_count.load(Ordering::Acquire) != 0 {
            std::hint::spin_loop();
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        for handle in &self.workers {
            handle.flags.run.store(false, Ordering::Release);
            handle.flags.live.store(false, Ordering::Release);
        }
        for handle in &mut self.workers {
            if let Some(thread) = handle.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_rejects_bad_parameters() {
        assert!(matches!(
            Engine::init(999, 1_000_000, 2, 0),
            Err(EngineError::InvalidParameter {
                name: "total_nodes",
                ..
            })
        ));
        assert!(matches!(
            Engine::init(100_000, 999, 2, 0),
            Err(EngineError::InvalidParameter {
                name: "total_moves",
                ..
            })
        ));
        assert!(matches!(
            Engine::init(100_000, 1_000_000, 1, 0),
            Err(EngineError::InvalidParameter {
                name: "thread_count",
                ..
            })
        ));
        assert!(matches!(
            Engine::init(100_000, 1_000_000, 101, 0),
            Err(EngineError::InvalidParameter {
                name: "thread_count",
                ..
            })
        ));
        assert!(matches!(
            Engine::init(100_000, 1_000_000, 2, -1),
            Err(EngineError::InvalidParameter {
                name: "seed_reps",
                ..
            })
        ));
    }

    #[test]
    fn test_evaluate_requires_setup() {
        let engine = Engine::init(10_000, 100_000, 2, 10).unwrap();
        assert!(!engine.evaluate_start());
        assert!(!engine.evaluate_time(5));
        assert!(engine.evaluate_stop(), "stop is always safe");
    }

    #[test]
    fn test_tree_invariants_after_session() {
        let mut engine = Engine::init(500_000, 5_000_000, 2, 100).unwrap();
        engine.setup_evaluation(30, &Position::starting());
        assert!(engine.evaluate_time(40));

        let shared = &engine.shared;
        let total = shared.arena.len();
        let mut children_sum = 0u64;
        let mut moves_sum = 0u64;

        for index in 0..total {
            let node = shared.arena.node(index);
            moves_sum += node.num_moves as u64;

            if let Some((start, count)) = node.children() {
                assert_eq!(
                    count as u32, node.num_moves,
                    "node {index}: one child per stored move"
                );
                children_sum += count as u64;
                for child_index in start..start + count {
                    let child = shared.arena.node(child_index);
                    assert_eq!(child.parent, index as i32);
                    assert_eq!(child.side, node.side.opponent());
                    assert!(
                        child.score >= node.score + DEPTH_STEP,
                        "node {child_index}: score must be monotone along the path"
                    );
                }
            }
        }

        let stats = engine.stats();
        assert_eq!(stats.nodes_added, total as u64);
        assert_eq!(moves_sum, stats.moves_added);
        assert_eq!(
            children_sum,
            stats.nodes_added - 1,
            "every node except the root is some node's child"
        );
        assert_eq!(
            stats.normals_found
                + stats.white_wins_found
                + stats.black_wins_found
                + stats.stalemates_found,
            stats.nodes_added,
            "every added node was classified"
        );
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut engine = Engine::init(50_000, 500_000, 2, 50).unwrap();
        engine.setup_evaluation(30, &Position::starting());
        engine.evaluate_time(20);
        let first = engine.stats().nodes_added;
        assert!(first > 1);

        engine.setup_evaluation(30, &Position::starting());
        let after_reset = engine.stats();
        assert!(
            after_reset.nodes_examined <= 50,
            "setup rewinds counters to the fresh seed phase"
        );
        engine.evaluate_time(20);
        assert_eq!(engine.output().choices.len(), 20);
    }

    #[test]
    fn test_manual_start_stop_cycle() {
        let mut engine = Engine::init(200_000, 2_000_000, 3, 50).unwrap();
        engine.setup_evaluation(30, &Position::starting());
        assert!(engine.evaluate_start());
        std::thread::sleep(Duration::from_millis(20));
        assert!(engine.evaluate_stop());

        let report = engine.output();
        assert_eq!(report.choices.len(), 20);
        assert!(engine.stats().nodes_examined > 0);
    }
}
