use crate::model::{Layout, Rect};
use serde_json::{Value, json};

fn rect_json(r: &Rect) -> Value {
    json!({"x": r.left, "y": r.top, "w": r.width, "h": r.height})
}

/// Serialize a `Layout` as `{ meta, containers: [{ id, pieces: [...] }] }`.
///
/// Each piece carries the matrix key, its kind, the `source` rectangle inside the matrix and
/// the `frame` it occupies inside the container.
pub fn to_json<I: ToString>(layout: &Layout<I>) -> Value {
    let containers = layout
        .containers
        .iter()
        .enumerate()
        .map(|(id, c)| {
            let pieces: Vec<Value> = c
                .pieces
                .iter()
                .map(|p| {
                    json!({
                        "key": p.source_id().to_string(),
                        "kind": p.kind(),
                        "source": rect_json(&p.source()),
                        "frame": rect_json(&p.destination()),
                        "padding": {"w": p.padding().width, "h": p.padding().height},
                    })
                })
                .collect();
            json!({"id": id, "pieces": pieces})
        })
        .collect::<Vec<_>>();
    let meta = json!({
        "app": "cake-cutter",
        "version": env!("CARGO_PKG_VERSION"),
        "container": {"w": layout.container.width, "h": layout.container.height},
        "padding": {"w": layout.padding.width, "h": layout.padding.height},
        "stats": layout.stats(),
    });
    json!({"meta": meta, "containers": containers})
}
