use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use minefield_core::*;
use std::hint::black_box;

fn empty_board_flood(c: &mut Criterion) {
    let generator = FixedMinefieldGenerator::from_mine_coords((255, 255), &[(254, 254)])
        .expect("layout fits the board");
    let level = generator.level().expect("single mine level is valid");

    c.bench_function("flood_fill_255x255", |b| {
        b.iter_batched(
            || {
                let mut engine = MinefieldEngine::new(generator.clone(), EngineOptions::default());
                engine.start(level).expect("valid level");
                engine
            },
            |mut engine| black_box(engine.reveal((0, 0))),
            BatchSize::LargeInput,
        )
    });
}

fn random_first_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_move");
    for (name, level) in [
        ("easy", Level::EASY),
        ("normal", Level::NORMAL),
        ("expert", Level::EXPERT),
    ] {
        let mut seed = 0;
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    seed += 1;
                    let mut engine = MinefieldEngine::with_seed(seed);
                    engine.start(level).expect("preset is valid");
                    engine
                },
                |mut engine| black_box(engine.reveal((level.width / 2, level.height / 2))),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, empty_board_flood, random_first_move);
criterion_main!(benches);
