//! Benchmark per-tick estimation and planning cost across grid sizes.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use marga::core::{GridCoord, WorldPoint};
use marga::estimation::{BeliefGrid, Estimator, EstimatorConfig, TransitionModel};
use marga::planning::{OtherAgent, PlanRequest, PlannerConfig, RiskPlanner, WorldGraph, dijkstra};
use marga::{BlockRect, Layout};

/// Square world with a central obstacle and a checkpoint in the far corner.
fn create_layout(size: usize) -> Layout {
    let quarter = (size / 4) as i32;
    let far = size as i32 - 1;
    Layout::new(size, size)
        .with_block(BlockRect::new(quarter, quarter, 2 * quarter, 2 * quarter))
        .with_checkpoints(vec![GridCoord::new(far, far)])
}

fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for size in [10usize, 30, 60].iter() {
        let layout = create_layout(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(WorldGraph::build(black_box(&layout), 2.0)))
        });
    }

    group.finish();
}

fn bench_dijkstra(c: &mut Criterion) {
    let mut group = c.benchmark_group("dijkstra");

    for size in [10usize, 30, 60].iter() {
        let layout = create_layout(*size);
        let Ok(graph) = WorldGraph::build(&layout, 2.0) else {
            continue;
        };
        let (Some(start), Some(goal)) = (
            graph.index(GridCoord::new(0, 0)),
            graph.index(GridCoord::new(*size as i32 - 1, *size as i32 - 1)),
        ) else {
            continue;
        };

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(dijkstra(
                    graph.adjacency(),
                    black_box(start),
                    goal,
                    |_, _, base| base,
                ))
            })
        });
    }

    group.finish();
}

fn bench_plan_next_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_next_step");

    for size in [10usize, 30, 60].iter() {
        let layout = create_layout(*size);
        let Ok(model) = TransitionModel::uniform_neighbors(*size, *size) else {
            continue;
        };
        let Ok(planner) = RiskPlanner::new(&layout, Arc::new(model), PlannerConfig::default())
        else {
            continue;
        };
        let mid = *size as i32 / 2 + 1;
        let moving = BeliefGrid::uniform(*size, *size);
        let parked = BeliefGrid::point_mass(*size, *size, GridCoord::new(mid, mid));
        let far = *size as i32 - 1;

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let request = PlanRequest {
                    current: GridCoord::new(0, 0),
                    checkpoint: GridCoord::new(far, far),
                    others: vec![
                        OtherAgent {
                            belief: &moving,
                            parked: false,
                        },
                        OtherAgent {
                            belief: &parked,
                            parked: true,
                        },
                    ],
                    pose: None,
                };
                black_box(planner.plan_next_step(black_box(&request)))
            })
        });
    }

    group.finish();
}

fn bench_estimator_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimator_update");

    for size in [10usize, 30, 60].iter() {
        let layout = create_layout(*size);
        let Ok(model) = TransitionModel::uniform_neighbors(*size, *size) else {
            continue;
        };
        let config = EstimatorConfig {
            seed: 7,
            ..Default::default()
        };
        let Ok(mut estimator) = Estimator::new(&layout, Arc::new(model), config) else {
            continue;
        };
        let observer = WorldPoint::new(0.5, 0.5);
        let range = *size as f32 / 2.0;

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let belief = estimator.update_estimate(black_box(observer), range, false);
                black_box(belief.total())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_graph_build,
    bench_dijkstra,
    bench_plan_next_step,
    bench_estimator_update,
);
criterion_main!(benches);
