//! Benchmarks for the dock layout solver, anchor detection and snapshots.
//!
//! Run with: cargo bench -p dockyard-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use dockyard_layout::{
    AnchorDetector, AnchorQuery, DockConfig, DockLocation, DockTarget, DockTree, InsertOptions,
    PanelId, PanelInit, PanelRegistry, PanelTypeOptions, Point, Rect,
};
use std::hint::black_box;

const LOCATIONS: [DockLocation; 5] = [
    DockLocation::Right,
    DockLocation::Bottom,
    DockLocation::Left,
    DockLocation::Top,
    DockLocation::Stacked,
];

/// Build a tree with `n` panels, each docked beside the previous one.
fn make_tree(n: usize) -> DockTree {
    let mut tree = DockTree::default();
    tree.set_area(Rect::from_size(1920.0, 1080.0));
    let mut previous: Option<PanelId> = None;
    for i in 0..n {
        let init = PanelInit::titled(format!("panel-{i}"))
            .with_desired(120.0 + (i % 7) as f64 * 20.0, 90.0 + (i % 5) as f64 * 15.0)
            .with_min(40.0, 30.0);
        let panel = tree.create_panel("bench", init).expect("create");
        let location = LOCATIONS[i % LOCATIONS.len()];
        tree.insert_alone(
            panel,
            location,
            previous.map(DockTarget::Panel),
            InsertOptions::default(),
        )
        .expect("insert");
        previous = Some(panel);
    }
    tree
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/solve");
    for n in [4, 16, 64, 256] {
        group.bench_with_input(BenchmarkId::new("panels", n), &n, |b, &n| {
            b.iter_batched(
                || make_tree(n),
                |mut tree| black_box(tree.solve()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_anchor_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/anchor_detect");
    let detector = AnchorDetector::new(&DockConfig::default());
    for n in [4, 16, 64] {
        let mut tree = make_tree(n);
        tree.solve();
        let candidates = tree.anchor_candidates();
        let main_region = tree.main_region_rect();
        let pointers: Vec<Point> = (0..32)
            .map(|i| Point::new((i * 59 % 1920) as f64, (i * 37 % 1080) as f64))
            .collect();
        group.bench_with_input(BenchmarkId::new("frames", n), &pointers, |b, pointers| {
            b.iter(|| {
                for pointer in pointers {
                    black_box(detector.detect(&AnchorQuery {
                        pointer: *pointer,
                        source_frame: None,
                        candidates: &candidates,
                        main_region,
                        allow_split: true,
                    }));
                }
            })
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/snapshot");
    let mut registry = PanelRegistry::new();
    registry
        .register("bench", PanelTypeOptions::default(), |_| {})
        .expect("register");

    for n in [16, 64] {
        let tree = make_tree(n);
        group.bench_with_input(BenchmarkId::new("save", n), &tree, |b, tree| {
            b.iter(|| black_box(tree.save()))
        });

        let snapshot = tree.save();
        group.bench_with_input(BenchmarkId::new("restore", n), &snapshot, |b, snapshot| {
            b.iter_batched(
                DockTree::default,
                |mut tree| black_box(tree.restore(snapshot, &registry).expect("restore")),
                BatchSize::SmallInput,
            )
        });

        let json = snapshot.to_json().expect("json");
        group.bench_with_input(BenchmarkId::new("json_round_trip", n), &json, |b, json| {
            b.iter(|| {
                black_box(
                    dockyard_layout::LayoutSnapshot::from_json(json)
                        .and_then(|s| s.to_json())
                        .expect("round trip"),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solve, bench_anchor_detect, bench_snapshot);
criterion_main!(benches);
