//! Core database trait for schema storage
//!
//! This trait defines the interface for storing extracted schema data.
//! Renderers are written against it rather than a concrete graph type.

use anyhow::Result;

/// Core trait for schema databases
///
/// The associated types let each database define its own node and edge
/// structures with type-specific metadata.
pub trait Database: Send + Sync {
    /// The node data type for this database
    type Node: Clone + Send + Sync;

    /// The edge data type for this database
    type Edge: Clone + Send + Sync;

    /// Add a node to the database
    fn add_node(&mut self, node: Self::Node) -> Result<()>;

    /// Add an edge to the database
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    /// Get a node by name
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes in insertion order
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges in insertion order
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Clear all data from the database
    fn clear(&mut self);

    /// Get the number of nodes
    fn node_count(&self) -> usize;

    /// Get the number of edges
    fn edge_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::er::{Entity, RelationshipEdge, RelationshipKind, SchemaGraph};

    #[test]
    fn test_schema_graph_is_a_database() {
        let mut graph = SchemaGraph::new();
        graph.add_node(Entity::new("Employee")).unwrap();
        graph
            .add_edge(RelationshipEdge::new(
                "Employee",
                "Role",
                RelationshipKind::ManyToOne,
                "role",
            ))
            .unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.get_node("Employee").is_some());

        graph.clear();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edges().count(), 0);
    }
}
