//! Worker threads
//!
//! Workers are long-lived OS threads that busy-poll three atomic flags:
//! `live` (stay alive), `run` (search right now) and `running` (still
//! winding down). There is no parking and no sleeping; the scheduler
//! needs flag observation latency in the tens of microseconds, and an
//! expansion is the only unit of work between observations.
//!
//! Session state (the root board and the seeded queue entries) arrives
//! over a per-worker channel that is only polled while the worker is
//! idle, so the search loop itself takes no locks.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use super::expand::{expand, StepOutcome};
use super::Shared;
use crate::board::Undo;
use crate::constants::STARTING_BOARD;
use crate::move_gen::MoveBuffer;
use crate::queue::FrontierQueue;
use crate::types::Board;

/// Per-worker control flags, shared with the scheduler.
pub(crate) struct Flags {
    pub run: AtomicBool,
    pub running: AtomicBool,
    pub live: AtomicBool,
}

impl Flags {
    pub fn new() -> Flags {
        Flags {
            run: AtomicBool::new(false),
            running: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

/// Session handoff sent to an idle worker: the root board for its
/// scratch copy plus its share of the seeded queue.
pub(crate) struct SessionSeed {
    pub board: Board,
    pub entries: Vec<(f64, u32)>,
}

/// State owned by exactly one worker (worker 0's copy lives in the
/// engine, the others' in their threads).
pub(crate) struct WorkerState {
    /// Scratch board, holding the root position between expansions.
    pub board: Board,
    /// Reconstruction chain, leaf to root, reused across expansions.
    pub chain: Vec<(u8, u8)>,
    pub undos: Vec<Undo>,
    pub buf: MoveBuffer,
    pub queue: FrontierQueue,
    /// Set once the arena, pool or queue rejected a reservation; the
    /// worker idles for the rest of the session.
    pub exhausted: bool,
}

impl WorkerState {
    pub fn new(queue_ceiling: usize) -> WorkerState {
        WorkerState {
            board: STARTING_BOARD,
            chain: Vec::with_capacity(64),
            undos: Vec::with_capacity(64),
            buf: MoveBuffer::new(),
            queue: FrontierQueue::new(queue_ceiling),
            exhausted: false,
        }
    }

    pub fn begin_session(&mut self, board: Board) {
        self.board = board;
        self.queue.clear();
        self.exhausted = false;
    }
}

/// Thread body for workers 1..N-1.
pub(crate) fn worker_main(
    shared: Arc<Shared>,
    flags: Arc<Flags>,
    seeds: Receiver<SessionSeed>,
    running_count: Arc<AtomicUsize>,
    queue_ceiling: usize,
) {
    let mut w = WorkerState::new(queue_ceiling);

    while flags.live.load(Ordering::Acquire) {
        take_seed(&mut w, &seeds);

        if flags.run.load(Ordering::Acquire) {
            run_until_stopped(&shared, &mut w, &flags, &seeds);
        } else if flags.running.load(Ordering::Acquire) {
            flags.running.store(false, Ordering::Release);
            running_count.fetch_sub(1, Ordering::AcqRel);
        } else {
            std::hint::spin_loop();
        }
    }
}

/// Apply any pending session handoffs. Each seed replaces the worker's
/// session state entirely.
fn take_seed(w: &mut WorkerState, seeds: &Receiver<SessionSeed>) {
    while let Ok(seed) = seeds.try_recv() {
        w.begin_session(seed.board);
        for (score, node) in seed.entries {
            w.queue.push(score, node);
        }
    }
}

/// The search loop: expand until the scheduler clears `run`. An empty
/// queue or an exhausted session keeps spinning here (the remaining
/// session time is simply idle) so the stop flag is still observed at
/// expansion granularity.
fn run_until_stopped(shared: &Shared, w: &mut WorkerState, flags: &Flags, seeds: &Receiver<SessionSeed>) {
    // The seed for this session was sent before `run` was raised; the
    // release/acquire pair on the flag makes it visible here. Consuming
    // it now closes the window between handoff and start.
    take_seed(w, seeds);
    while flags.run.load(Ordering::Acquire) {
        if w.exhausted || w.queue.is_empty() {
            std::hint::spin_loop();
            continue;
        }
        let index = w.queue.pop().expect("queue checked non-empty");
        if let StepOutcome::OutOfSpace = expand(shared, w, index as usize) {
            w.exhausted = true;
        }
    }
}
