use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use ilotplan::{optimize_layout, BoxSpec, OptimizerConfig, PlanGeometry, Wall};

/// A mid-size open-plan floor with a few partition walls.
fn office_floor() -> PlanGeometry {
    let mut plan = PlanGeometry::new(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(50.0, 0.0),
        Vec2::new(50.0, 40.0),
        Vec2::new(0.0, 40.0),
    ]);
    plan.walls.push(Wall::new(
        Vec2::new(15.0, 0.0),
        Vec2::new(15.0, 25.0),
        0.2,
    ));
    plan.walls.push(Wall::new(
        Vec2::new(15.0, 25.0),
        Vec2::new(38.0, 25.0),
        0.2,
    ));
    plan.walls.push(Wall::new(
        Vec2::new(38.0, 40.0),
        Vec2::new(38.0, 12.0),
        0.2,
    ));
    plan
}

fn bench_optimize(c: &mut Criterion) {
    let plan = office_floor();
    let spec = BoxSpec::default_mix();
    let config = OptimizerConfig {
        max_generations: 40,
        ..OptimizerConfig::default()
    };

    c.bench_function("optimize_50x40_density_30", |b| {
        b.iter(|| {
            optimize_layout(
                black_box(&plan),
                black_box(&spec),
                black_box(0.3),
                &config,
            )
        })
    });
}

criterion_group!(benches, bench_optimize);
criterion_main!(benches);
