//! ergraph - Entity-relationship diagrams from decorated model classes
//!
//! Scans entity files (classes marked with `@Entity()` and column/relationship
//! decorators) and enum files, assembles a schema graph, and renders it as a
//! Mermaid `erDiagram` plus a self-contained HTML viewer.
//!
//! # Quick Start
//!
//! ```rust
//! use ergraph::{extract_entity, render_er_diagram};
//! use ergraph::prelude::*;
//!
//! let source = r#"
//! @Entity()
//! export class Shift {
//!   @PrimaryGeneratedColumn()
//!   id: number;
//!
//!   @Column()
//!   name: string;
//! }
//! "#;
//!
//! let entity = extract_entity(source).unwrap();
//! let graph = SchemaGraph::assemble(vec![entity], vec![]);
//! let text = render_er_diagram(&graph).unwrap();
//! assert!(text.contains("        number id PK\n"));
//! ```
//!
//! # Whole Directories
//!
//! ```rust,no_run
//! use ergraph::{generate, GeneratorConfig};
//!
//! let report = generate(GeneratorConfig::default()).unwrap();
//! println!("{} entities", report.stats.entity_count);
//! ```

pub mod core;
pub mod plugins;

pub use crate::core::*;
pub use plugins::orchestrator::{Extraction, GenerationReport, Generator, GeneratorConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        normalize_type, Database, Diagnostic, DiagnosticKind, Diagnostics, Extractor, Renderer,
    };
    pub use crate::plugins::entity::{EntityExtractor, ExtractorConfig};
    pub use crate::plugins::enumeration::EnumExtractor;
    pub use crate::plugins::er::{
        Entity, EnumDef, ErDiagramRenderer, Field, HtmlPackager, HtmlRenderer, RelationshipEdge,
        RelationshipKind, SchemaGraph, SchemaStats,
    };
    pub use crate::plugins::orchestrator::{Generator, GeneratorConfig};
}

/// Run the full pipeline with the given configuration
///
/// Reads both directories, writes the Mermaid and HTML files, and returns
/// the summary counts together with every diagnostic collected.
pub fn generate(config: GeneratorConfig) -> anyhow::Result<GenerationReport> {
    Generator::new(config)?.generate()
}

/// Extract an entity from the text of one entity file with default settings
///
/// # Example
/// ```rust
/// let entity = ergraph::extract_entity("@Entity()\nclass Tag {\n  @Column()\n  label: string;\n}\n");
/// assert_eq!(entity.unwrap().fields[0].name, "label");
/// assert!(ergraph::extract_entity("export class Helper {}").is_none());
/// ```
pub fn extract_entity(text: &str) -> Option<plugins::er::Entity> {
    use crate::core::Extractor as _;
    plugins::entity::EntityExtractor::new().extract(text, &mut Diagnostics::new())
}

/// Extract an enum from the text of one enum file
///
/// # Example
/// ```rust
/// let def = ergraph::extract_enum(r#"export enum Color { RED = "RED", BLUE = "BLUE" }"#).unwrap();
/// assert_eq!(def.name, "Color");
/// assert_eq!(def.members, vec!["RED", "BLUE"]);
/// ```
pub fn extract_enum(text: &str) -> Option<plugins::er::EnumDef> {
    use crate::core::Extractor as _;
    plugins::enumeration::EnumExtractor::new().extract(text, &mut Diagnostics::new())
}

/// Render a schema graph as Mermaid `erDiagram` text
pub fn render_er_diagram(graph: &plugins::er::SchemaGraph) -> anyhow::Result<String> {
    use crate::core::Renderer as _;
    plugins::er::ErDiagramRenderer::new().render(graph)
}
