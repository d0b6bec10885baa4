//! Engine benchmarks
//!
//! Criterion benchmarks for the hot primitives: move generation with the
//! legality filter, the static evaluation paths, and the move
//! apply/undo cycle that reconstruction leans on.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use frontier_engine::board::{apply, undo};
use frontier_engine::evaluation::{full_eval, move_delta, EvalTables};
use frontier_engine::move_gen::{generate_moves, MoveBuffer};
use frontier_engine::types::Position;

fn bench_generate_moves_starting(c: &mut Criterion) {
    let pos = Position::starting();
    let tables = EvalTables::new();
    let mut buf = MoveBuffer::new();

    c.bench_function("generate_moves_starting_position", |b| {
        b.iter(|| {
            let mut board = pos.board;
            generate_moves(&mut board, &pos.state, pos.side, &tables, &mut buf);
            black_box(buf.len())
        })
    });
}

fn bench_full_eval(c: &mut Criterion) {
    let pos = Position::starting();
    let tables = EvalTables::new();

    c.bench_function("full_eval_starting_position", |b| {
        b.iter(|| black_box(full_eval(&pos.board, &tables)))
    });
}

fn bench_move_delta(c: &mut Criterion) {
    let pos = Position::starting();
    let tables = EvalTables::new();

    c.bench_function("move_delta_e2e4", |b| {
        b.iter(|| black_box(move_delta(&pos.board, &tables, 12, 28, None)))
    });
}

fn bench_apply_undo_cycle(c: &mut Criterion) {
    let pos = Position::starting();

    c.bench_function("apply_undo_cycle", |b| {
        b.iter(|| {
            let mut board = pos.board;
            let u1 = apply(&mut board, 12, 28);
            let u2 = apply(&mut board, 52, 36);
            let u3 = apply(&mut board, 6, 21);
            undo(&mut board, &u3);
            undo(&mut board, &u2);
            undo(&mut board, &u1);
            black_box(board[12])
        })
    });
}

criterion_group!(
    benches,
    bench_generate_moves_starting,
    bench_full_eval,
    bench_move_delta,
    bench_apply_undo_cycle
);
criterion_main!(benches);
