use indexmap::IndexMap;
use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};

use crate::generator::{position::SchemaId, schema::Schema};

/// Child edges between resolved schemas, used to report reference cycles.
#[derive(Debug)]
pub(crate) struct SchemaGraph<'a> {
  schemas: &'a IndexMap<SchemaId, Schema>,
  graph: DiGraphMap<usize, ()>,
}

impl<'a> SchemaGraph<'a> {
  pub(crate) fn new(schemas: &'a IndexMap<SchemaId, Schema>) -> Self {
    let mut graph = DiGraphMap::new();
    for (index, schema) in schemas.values().enumerate() {
      graph.add_node(index);
      for child in schema.children() {
        if let Some(target) = schemas.get_index_of(child) {
          graph.add_edge(index, target, ());
        }
      }
    }
    Self { schemas, graph }
  }

  /// Strongly connected groups of schemas, each listed in discovery order.
  pub(crate) fn detect_cycles(&self) -> Vec<Vec<&'a SchemaId>> {
    let mut cycles = kosaraju_scc(&self.graph)
      .into_iter()
      .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
      .map(|mut scc| {
        scc.sort_unstable();
        scc
      })
      .collect::<Vec<_>>();
    cycles.sort();

    cycles
      .into_iter()
      .map(|scc| {
        scc
          .into_iter()
          .filter_map(|index| self.schemas.get_index(index).map(|(id, _)| id))
          .collect()
      })
      .collect()
  }
}
