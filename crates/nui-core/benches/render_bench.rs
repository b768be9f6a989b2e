//! Benchmarks for tree rendering and event dispatch.
//!
//! Run with: cargo bench -p nui-core

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::rc::Rc;

use nui_core::message::downcast;
use nui_core::{
    DispatchSlot, EventScope, Host, Node, Props, Rendered, decode, map, node, on, property, style,
    text, void_node,
};
use serde_json::{Value, json};

// =============================================================================
// Test Data
// =============================================================================

/// Counts created elements and drops the props.
struct CountingHost;

impl Host for CountingHost {
    type Element = usize;

    fn create_element(&self, _tag: &str, props: Props<usize>) -> usize {
        1 + props
            .children()
            .map(|c| c.iter().filter_map(Rendered::as_element).sum::<usize>())
            .unwrap_or(0)
    }
}

/// A list of `rows` rows, each wrapped in its own `map`.
fn list_view(rows: usize) -> Node<u64> {
    let items = (0..rows)
        .map(|i| {
            let row: Node<u64> = node(
                "View",
                vec![style([("padding", json!(4))]), property("key", i)],
                vec![
                    text(format!("row {i}")),
                    void_node("Button", vec![on("onPress", decode::succeed(i as u64))]),
                ],
            );
            row.map(|n: u64| n + 1)
        })
        .collect();
    node("ScrollView", vec![], items)
}

/// `depth` directly nested maps around one button.
fn deep_map(depth: usize) -> Node<u64> {
    let mut tree: Node<u64> = void_node("Button", vec![on("onPress", decode::succeed(1_u64))]);
    for _ in 0..depth {
        tree = map(|n: u64| n.wrapping_mul(3), tree);
    }
    tree
}

fn root() -> Rc<EventScope> {
    let slot = DispatchSlot::new();
    slot.install(Rc::new(|msg| {
        black_box(downcast::<u64>(msg).ok());
    }));
    EventScope::root(slot)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_render_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/list");
    let scope = root();

    for rows in [10, 100, 1000] {
        let tree = list_view(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &tree, |b, tree| {
            b.iter(|| black_box(nui_core::render(tree, &scope, &CountingHost)));
        });
    }

    group.finish();
}

/// Captures the handler from a rendered button.
struct HandlerHost;

impl Host for HandlerHost {
    type Element = Option<nui_core::EventHandler>;

    fn create_element(&self, _tag: &str, props: Props<Self::Element>) -> Self::Element {
        props.handler("onPress").cloned()
    }
}

fn bench_dispatch_deep_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/deep_map");
    let scope = root();

    for depth in [1, 8, 64] {
        let tree = deep_map(depth);
        let Rendered::Element(Some(handler)) = nui_core::render(&tree, &scope, &HandlerHost) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(depth), &handler, |b, handler| {
            b.iter(|| handler.call(black_box(&Value::Null)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render_list, bench_dispatch_deep_map);

criterion_main!(benches);
