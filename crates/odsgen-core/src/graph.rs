use std::collections::{BTreeMap, BTreeSet};

use crate::schema::TableSchema;

/// Order in which the columns of a row must be synthesized so that derived
/// generators run after the columns they read.
///
/// Returns column indexes; ties resolve by declaration order. References to
/// unknown columns are ignored here (`validate_schema` reports them). On a
/// cycle, returns the names of the columns that could not be ordered.
pub fn derivation_order(schema: &TableSchema) -> Result<Vec<usize>, Vec<String>> {
    let graph = build_adjacency(schema);
    toposort(&graph).map_err(|stuck| {
        stuck
            .into_iter()
            .filter_map(|idx| schema.columns.get(idx).map(|col| col.name.clone()))
            .collect()
    })
}

// input column -> columns reading it
fn build_adjacency(schema: &TableSchema) -> BTreeMap<usize, BTreeSet<usize>> {
    let mut graph: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();

    for (idx, column) in schema.columns.iter().enumerate() {
        graph.entry(idx).or_default();
        for input in column.generator.inputs() {
            if let Some(source) = schema.column_index(input) {
                graph.entry(source).or_default().insert(idx);
            }
        }
    }

    graph
}

fn toposort(graph: &BTreeMap<usize, BTreeSet<usize>>) -> Result<Vec<usize>, Vec<usize>> {
    let mut indegree: BTreeMap<usize, usize> = graph.keys().map(|node| (*node, 0)).collect();
    for targets in graph.values() {
        for target in targets {
            *indegree.entry(*target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .filter_map(|(node, count)| (*count == 0).then_some(*node))
        .collect();

    let mut order = Vec::with_capacity(graph.len());
    while let Some(node) = ready.pop_first() {
        order.push(node);

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        Err(indegree
            .into_iter()
            .filter_map(|(node, count)| (count > 0).then_some(node))
            .collect())
    }
}
