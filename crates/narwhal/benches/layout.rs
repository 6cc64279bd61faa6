use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal::tree::{Node, Tree};
use narwhal::{Layout, LayoutSettings, PlacementMode};
use std::hint::black_box;
use std::time::Duration;

/// Balanced tree with `fanout` children per midpoint; weights vary so the clumps differ.
fn build_tree(depth: usize, fanout: usize) -> Tree {
    let mut tree = Tree::new();
    tree.insert(Node::new("root", None, 0.0, 120.0))
        .expect("insert root");
    let mut frontier = vec!["root".to_string()];
    for level in 1..=depth {
        let mut next = Vec::with_capacity(frontier.len() * fanout);
        for (p, parent) in frontier.iter().enumerate() {
            for c in 0..fanout {
                let id = format!("{parent}/{c}");
                let between = 10.0 + ((p * 7 + c * 13 + level) % 50) as f64;
                let within = ((p * 3 + c * 5) % 40) as f64;
                tree.insert(Node::new(id.clone(), Some(parent), between, within))
                    .expect("insert node");
                next.push(id);
            }
        }
        frontier = next;
    }
    tree
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("d3_f4", 3usize, 4usize),
        ("d4_f5", 4usize, 5usize),
        ("d6_f3", 6usize, 3usize),
    ];

    for (name, depth, fanout) in cases {
        let tree = build_tree(depth, fanout);
        for mode in [PlacementMode::LengthConstrained, PlacementMode::Spider] {
            let settings = LayoutSettings {
                placement_mode: mode,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("generate::{mode:?}"), name),
                &tree,
                |b, tree| {
                    b.iter_batched(
                        || Layout::new(tree, settings.clone()),
                        |layout| {
                            let result = layout.and_then(|mut l| l.generate());
                            black_box(result.map(|r| r.positions.len()).unwrap_or_default());
                        },
                        BatchSize::LargeInput,
                    )
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
