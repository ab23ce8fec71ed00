use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cube_tutor::adapter::protocol::{build_observation, state_hash};
use cube_tutor::core::{rotate_face, scramble_moves, tutorial, validate, CubeEngine, EngineSnapshot, Faces};
use cube_tutor::term::{CubeView, FrameBuffer, Hud, Viewport};
use cube_tutor::types::{Direction, Face, Move};

fn bench_rotate_face(c: &mut Criterion) {
    let faces = Faces::solved();

    c.bench_function("rotate_face_front", |b| {
        b.iter(|| rotate_face(black_box(&faces), Face::Front, Direction::Clockwise))
    });
}

fn bench_apply_and_undo(c: &mut Criterion) {
    let mut engine = CubeEngine::new();
    let mv = Move::parse("R").unwrap_or_else(|e| panic!("{e}"));

    c.bench_function("apply_move_then_undo", |b| {
        b.iter(|| {
            engine.apply_move(black_box(mv));
            engine.undo();
        })
    });
}

fn bench_scramble(c: &mut Criterion) {
    c.bench_function("scramble_25", |b| {
        let mut seed = 0u32;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            let mut engine = CubeEngine::new();
            engine.scramble(black_box(seed), 25);
            engine
        })
    });
}

fn bench_validate(c: &mut Criterion) {
    let required = tutorial::required_moves(2);
    let log: Vec<Move> = scramble_moves(9, 200)
        .into_iter()
        .chain(required.iter().copied())
        .collect();

    c.bench_function("validate_200_move_log", |b| {
        b.iter(|| validate(black_box(&log), required))
    });
}

fn bench_snapshot_and_observation(c: &mut Criterion) {
    let mut engine = CubeEngine::new();
    engine.scramble(42, 25);
    let mut snap = EngineSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| engine.snapshot_into(black_box(&mut snap)))
    });

    engine.snapshot_into(&mut snap);
    c.bench_function("state_hash", |b| b.iter(|| state_hash(black_box(&snap))));
    c.bench_function("build_observation", |b| {
        b.iter(|| build_observation(black_box(&snap), 1))
    });
}

fn bench_render(c: &mut Criterion) {
    let mut engine = CubeEngine::new();
    engine.scramble(7, 25);
    let snap = engine.snapshot();
    let view = CubeView::default();
    let vp = Viewport::new(120, 40);
    let hud = Hud {
        speed: 1.0,
        ..Hud::default()
    };
    let mut fb = FrameBuffer::new(vp.width, vp.height);

    c.bench_function("render_into_120x40", |b| {
        b.iter(|| view.render_into(black_box(&snap), &hud, vp, &mut fb))
    });
}

criterion_group!(
    benches,
    bench_rotate_face,
    bench_apply_and_undo,
    bench_scramble,
    bench_validate,
    bench_snapshot_and_observation,
    bench_render
);
criterion_main!(benches);
