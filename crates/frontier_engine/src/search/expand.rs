//! The expansion engine
//!
//! Each node is visited twice. [`examine`] runs when a node is created:
//! the worker rebuilds the node's board by replaying the chain of moves
//! from the root (the node's own move is applied with state updates that
//! are written back into the node), generates the legal replies, and
//! either classifies the node as terminal or publishes its move slice
//! and its one-ply eval. [`expand`] runs when the node is popped from a
//! queue: the worker reserves one arena slot per stored move, initializes
//! and examines every child, publishes the child range with release
//! semantics, and then backtracks the minimax eval toward the root.
//!
//! Running out of arena, pool or queue space aborts the expansion in
//! progress; the caller parks the worker for the rest of the session.

use std::sync::atomic::Ordering;

use super::worker::WorkerState;
use super::Shared;
use crate::board::{apply, apply_updating, undo};
use crate::constants::*;
use crate::move_gen::{generate_moves, king_safe};
use crate::types::{GameState, PosState, Side};

pub(crate) enum ExamineResult {
    /// The node has moves; its slice and eval are published and it can
    /// be queued. `depth` is its distance from the root.
    Expandable { depth: usize },
    /// Checkmate or stalemate; classified, not to be queued.
    Terminal,
    OutOfSpace,
}

pub(crate) enum StepOutcome {
    Progress,
    OutOfSpace,
}

/// First visit of a node: rebuild its board, generate its replies, and
/// publish its move slice and eval (or classify it as terminal).
///
/// The node must be unpublished and owned by the calling worker; the
/// worker's scratch board must hold the root position.
pub(crate) fn examine(shared: &Shared, w: &mut WorkerState, index: usize) -> ExamineResult {
    let arena = &shared.arena;

    // Collect the move chain leaf-to-root. The root itself contributes
    // no move.
    w.chain.clear();
    let mut walk = index;
    loop {
        let node = arena.node(walk);
        if node.parent < 0 {
            break;
        }
        w.chain.push((node.from as u8, node.to as u8));
        walk = node.parent as usize;
    }
    let depth = w.chain.len();

    // Replay root-to-parent without state updates, recording undo info.
    w.undos.clear();
    for i in (1..w.chain.len()).rev() {
        let (f, t) = w.chain[i];
        let u = apply(&mut w.board, f, t);
        w.undos.push(u);
    }

    // SAFETY: `index` was reserved by this worker and its parent's child
    // range is not yet published, so this is the only reference.
    let node = unsafe { arena.node_mut(index) };

    // The node's own move updates the inherited state fields; write the
    // corrected values back so descendants copy the right state.
    let mut st = PosState {
        castling: node.castling,
        en_passant_file: node.en_passant_file,
        halfmove_clock: node.halfmove_clock,
        king_sq: node.king_sq,
    };
    if depth > 0 {
        let (f, t) = w.chain[0];
        let u = apply_updating(&mut w.board, &mut st, f, t);
        w.undos.push(u);
        node.castling = st.castling;
        node.en_passant_file = st.en_passant_file;
        node.halfmove_clock = st.halfmove_clock;
        node.king_sq = st.king_sq;
    }
    let side = node.side;

    generate_moves(&mut w.board, &st, side, &shared.tables, &mut w.buf);

    // Terminal classification needs the node's board, so it happens
    // before the scratch board is unwound.
    let result = if w.buf.is_empty() {
        let king = st.king_sq[side.index()];
        if king_safe(&w.board, king, side.is_black()) {
            node.state = GameState::Draw;
            node.set_eval(DRAW_EVAL);
            shared.stats.stalemates_found.fetch_add(1, Ordering::Relaxed);
        } else if side == Side::Black {
            node.state = GameState::WhiteWin;
            node.set_eval(WHITE_WINS_EVAL);
            shared.stats.white_wins_found.fetch_add(1, Ordering::Relaxed);
        } else {
            node.state = GameState::BlackWin;
            node.set_eval(BLACK_WINS_EVAL);
            shared.stats.black_wins_found.fetch_add(1, Ordering::Relaxed);
        }
        Some(ExamineResult::Terminal)
    } else {
        None
    };

    // Restore the scratch board to the root position.
    while let Some(u) = w.undos.pop() {
        undo(&mut w.board, &u);
    }

    if let Some(terminal) = result {
        return terminal;
    }

    // Publish the move slice.
    let count = w.buf.len();
    let Some(start) = shared.moves.try_reserve(count) else {
        return ExamineResult::OutOfSpace;
    };
    for i in 0..count {
        // SAFETY: the range starting at `start` was reserved above.
        unsafe {
            shared.moves.write(start + i, w.buf.froms[i], w.buf.tos[i]);
        }
    }
    node.move_start = start as u32;
    node.num_moves = count as u32;
    shared.stats.moves_added.fetch_add(count as u64, Ordering::Relaxed);

    // One-ply eval: the parent's eval plus the best static delta among
    // the replies. The root contributes no parent term.
    let parent_eval = if node.parent >= 0 {
        arena.node(node.parent as usize).eval()
    } else {
        0.0
    };
    node.set_eval(parent_eval + w.buf.best);
    shared.stats.normals_found.fetch_add(1, Ordering::Relaxed);

    ExamineResult::Expandable { depth }
}

/// Second visit: materialize the popped node's children, enqueue the
/// ones within the depth limit, publish the child range, and backtrack.
pub(crate) fn expand(shared: &Shared, w: &mut WorkerState, index: usize) -> StepOutcome {
    shared.stats.nodes_examined.fetch_add(1, Ordering::Relaxed);

    let (side, score, eval, move_start, num_moves, castling, halfmove_clock, king_sq) = {
        let node = shared.arena.node(index);
        (
            node.side,
            node.score,
            node.eval(),
            node.move_start as usize,
            node.num_moves as usize,
            node.castling,
            node.halfmove_clock,
            node.king_sq,
        )
    };
    if num_moves == 0 {
        return StepOutcome::Progress;
    }

    let Some(start) = shared.arena.try_reserve(num_moves) else {
        return StepOutcome::OutOfSpace;
    };
    shared.stats.nodes_added.fetch_add(num_moves as u64, Ordering::Relaxed);
    let depth_limit = shared.depth_limit.load(Ordering::Relaxed) as usize;

    for i in 0..num_moves {
        let (from, to) = shared.moves.read(move_start + i);
        let child_index = start + i;

        {
            // SAFETY: `child_index` was reserved above and stays
            // unpublished until `publish_children` below.
            let child = unsafe { shared.arena.node_mut(child_index) };
            child.from = from as i8;
            child.to = to as i8;
            child.side = side.opponent();
            child.state = GameState::Normal;
            child.parent = index as i32;
            child.castling = castling;
            child.en_passant_file = -1;
            child.halfmove_clock = halfmove_clock;
            child.king_sq = king_sq;
            child.score = score + DEPTH_STEP;
            child.move_start = 0;
            child.num_moves = 0;
            child.clear_expansion();
            child.set_eval(0.0);
        }

        match examine(shared, w, child_index) {
            ExamineResult::OutOfSpace => return StepOutcome::OutOfSpace,
            ExamineResult::Terminal => {}
            ExamineResult::Expandable { depth } => {
                // Queue key: accumulated eval loss plus depth bias.
                let child_eval = shared.arena.node(child_index).eval();
                let child_score = score + (child_eval - eval).abs() + DEPTH_STEP;
                // SAFETY: still unpublished, still this worker's slot.
                unsafe { shared.arena.node_mut(child_index) }.score = child_score;
                if depth <= depth_limit && !w.queue.push(child_score, child_index as u32) {
                    return StepOutcome::OutOfSpace;
                }
            }
        }
    }

    shared.arena.node(index).publish_children(start, num_moves);
    backtrack(shared, index);
    StepOutcome::Progress
}

/// Recompute ancestor evals from the expanded node toward the root.
/// Each eval becomes the mate-delay-adjusted extremum of its children's
/// evals under side-to-move polarity; the walk stops at the first
/// ancestor whose eval is unchanged.
pub(crate) fn backtrack(shared: &Shared, from_index: usize) {
    let arena = &shared.arena;
    let mut index = from_index;
    loop {
        let node = arena.node(index);
        let Some((start, count)) = node.children() else {
            break;
        };

        let minimize = node.side.is_black();
        let mut best = mate_delay(arena.node(start).eval());
        for i in 1..count {
            let e = mate_delay(arena.node(start + i).eval());
            if (minimize && e < best) || (!minimize && e > best) {
                best = e;
            }
        }

        if node.eval() == best {
            break;
        }
        node.set_eval(best);

        if node.parent < 0 {
            break;
        }
        index = node.parent as usize;
    }
}

/// Pull a mating eval one ply toward neutral, so that shorter mates
/// dominate longer ones as evals propagate up the tree.
#[inline]
pub(crate) fn mate_delay(e: f64) -> f64 {
    if e >= WHITE_WINS_THRESHOLD {
        e - EVAL_FORCED_MATE_INCREMENT
    } else if e <= BLACK_WINS_THRESHOLD {
        e + EVAL_FORCED_MATE_INCREMENT
    } else {
        e
    }
}
