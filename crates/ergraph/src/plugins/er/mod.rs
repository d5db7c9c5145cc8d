//! Entity-relationship plugin
//!
//! The schema graph, its Mermaid renderer and the HTML viewer packager.

mod database;
mod html;
mod renderer;

pub use database::{
    Entity, EnumDef, Field, RelationshipEdge, RelationshipKind, SchemaGraph, SchemaStats,
};
pub use html::{HtmlPackager, HtmlRenderer};
pub use renderer::ErDiagramRenderer;
