//! ER diagram renderer
//!
//! Renders a schema graph as Mermaid `erDiagram` text.

use anyhow::Result;
use std::fmt::Write;
use tracing::{debug, span, Level};

use super::database::{Entity, RelationshipEdge, SchemaGraph};
use crate::core::{sanitize_identifier, ErGraphError, Renderer};

const HEADER: &str = "erDiagram";
const INDENT: &str = "    ";

/// Mermaid ER diagram renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct ErDiagramRenderer;

impl ErDiagramRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_entity(out: &mut String, entity: &Entity) -> std::fmt::Result {
        writeln!(out, "{INDENT}{} {{", entity.name)?;
        for field in entity.sorted_fields() {
            let key = if field.is_primary_key { " PK" } else { "" };
            writeln!(out, "{INDENT}{INDENT}{} {}{}", field.ty, field.name, key)?;
        }
        writeln!(out, "{INDENT}}}")?;
        writeln!(out)
    }

    /// Full diagram text; formatting failures surface as render errors
    fn diagram_text(graph: &SchemaGraph) -> Result<String, ErGraphError> {
        let mut out = String::new();
        writeln!(out, "{HEADER}")?;
        writeln!(out)?;

        for entity in graph.entities() {
            Self::write_entity(&mut out, entity)?;
        }

        let mut rendered = 0usize;
        for edge in graph.renderable_edges() {
            Self::write_edge(&mut out, edge)?;
            rendered += 1;
        }

        debug!(
            rendered_edges = rendered,
            pruned_edges = graph.raw_edges().len() - rendered,
            output_len = out.len(),
            "Rendered ER diagram"
        );
        Ok(out)
    }

    fn write_edge(out: &mut String, edge: &RelationshipEdge) -> std::fmt::Result {
        writeln!(
            out,
            "{INDENT}{} {} {} : \"{}\"",
            edge.from_entity,
            edge.kind.symbol(),
            edge.to_entity,
            sanitize_identifier(&edge.property_name)
        )
    }
}

impl Renderer<SchemaGraph> for ErDiagramRenderer {
    type Output = String;

    fn render(&self, graph: &SchemaGraph) -> Result<String> {
        let render_span = span!(
            Level::INFO,
            "render_er_diagram",
            entities = graph.entities().len()
        );
        let _enter = render_span.enter();

        Ok(Self::diagram_text(graph)?)
    }

    fn name(&self) -> &'static str {
        "mermaid-er"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "mermaid"
    }
}
