use crate::lineage_registry::LineageRegistry;
use capsim_data::{BacteriumId, SpeciesId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::HashMap;

/// A bacterium (living or removed) in the division tree.
pub struct DivisionNode {
    pub id: BacteriumId,
    pub species: SpeciesId,
    pub generation: u32,
    pub offspring_count: usize,
    pub is_alive: bool,
}

/// Mother-to-daughter graph of every recorded division.
pub struct DivisionTree {
    pub graph: DiGraph<DivisionNode, ()>,
    id_map: HashMap<BacteriumId, NodeIndex>,
}

impl Default for DivisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DivisionTree {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_map: HashMap::new(),
        }
    }

    pub fn build(registry: &LineageRegistry) -> Self {
        let mut tree = Self::new();
        for record in registry.records.values() {
            let idx = tree.graph.add_node(DivisionNode {
                id: record.id,
                species: record.species,
                generation: record.generation,
                offspring_count: record.children.len(),
                is_alive: record.is_alive(),
            });
            tree.id_map.insert(record.id, idx);
        }
        for record in registry.records.values() {
            if let Some(parent) = record.parent_id {
                if let (Some(&p_idx), Some(&c_idx)) =
                    (tree.id_map.get(&parent), tree.id_map.get(&record.id))
                {
                    tree.graph.add_edge(p_idx, c_idx, ());
                }
            }
        }
        tree
    }

    /// Number of bacteria descending from `id`, excluding itself.
    #[must_use]
    pub fn descendant_count(&self, id: BacteriumId) -> usize {
        let Some(&start) = self.id_map.get(&id) else {
            return 0;
        };
        let mut dfs = Dfs::new(&self.graph, start);
        let mut count = 0;
        while dfs.next(&self.graph).is_some() {
            count += 1;
        }
        count - 1
    }

    /// Export the tree to Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph Divisions {\n");
        dot.push_str("  node [shape=box, style=filled, fontname=\"Arial\"];\n");

        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            let color = if node.is_alive { "#e1f5fe" } else { "#eeeeee" };
            dot.push_str(&format!(
                "  \"{}\" [label=\"{} (Gen {}, species {})\\nDaughters: {}\", fillcolor=\"{}\"];\n",
                node.id.0, node.id, node.generation, node.species.0, node.offspring_count, color
            ));
        }

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                dot.push_str(&format!(
                    "  \"{}\" -> \"{}\";\n",
                    self.graph[from].id.0, self.graph[to].id.0
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }
}
