//! Core renderer trait for schema output
//!
//! This trait defines the interface for rendering a schema database into an
//! output format (Mermaid text, an HTML page).

use anyhow::Result;

use super::Database;

/// Core trait for schema renderers
///
/// # Example
/// ```
/// use ergraph::core::Renderer;
/// use ergraph::plugins::er::{Entity, ErDiagramRenderer, SchemaGraph};
///
/// let mut graph = SchemaGraph::new();
/// graph.insert_entity(Entity::new("Shift"));
/// let text = ErDiagramRenderer::new().render(&graph).unwrap();
/// assert!(text.starts_with("erDiagram\n"));
/// ```
pub trait Renderer<D: Database>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the database into the output format
    fn render(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
