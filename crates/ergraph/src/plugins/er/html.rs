//! HTML viewer packaging
//!
//! Wraps diagram text in a self-contained page that loads Mermaid from a CDN
//! and renders it in the browser. The diagram text is embedded unmodified.

use anyhow::Result;
use std::fmt::Write;
use tracing::debug;

use super::database::{SchemaGraph, SchemaStats};
use super::renderer::ErDiagramRenderer;
use crate::core::{ErGraphError, Renderer};

const MERMAID_CDN: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";
const DEFAULT_TITLE: &str = "Entity Relationship Diagram";

const STYLE: &str = r#"        body {
            font-family: Arial, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        .container {
            max-width: 100%;
            margin: 0 auto;
            background-color: white;
            padding: 20px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        h1 {
            color: #333;
            text-align: center;
            margin-bottom: 30px;
        }
        .diagram-container {
            text-align: center;
            overflow-x: auto;
            margin: 20px 0;
        }
        .stats {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 15px;
            margin: 20px 0;
        }
        .stat-card {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 6px;
            border-left: 4px solid #007bff;
        }
        .stat-number {
            font-size: 24px;
            font-weight: bold;
            color: #007bff;
        }
        .stat-label {
            color: #666;
            font-size: 14px;
        }
        .name-list {
            margin-top: 30px;
        }
        .name-item {
            border: 1px solid #ddd;
            border-radius: 4px;
            padding: 10px;
            margin: 5px 10px 5px 0;
            display: inline-block;
        }
"#;

const INIT_SCRIPT: &str = r#"    <script>
        mermaid.initialize({
            startOnLoad: true,
            theme: 'default',
            er: { fontSize: 12, useMaxWidth: true }
        });
    </script>
"#;

/// Builds the HTML viewer document
#[derive(Debug, Clone)]
pub struct HtmlPackager {
    title: String,
}

impl HtmlPackager {
    pub fn new() -> Self {
        Self::with_title(DEFAULT_TITLE)
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Embed `diagram` verbatim together with summary counts and name listings
    pub fn package(
        &self,
        diagram: &str,
        stats: &SchemaStats,
        entity_names: &[&str],
        enum_names: &[&str],
    ) -> Result<String, ErGraphError> {
        let title = escape_html(&self.title);
        let mut out = String::with_capacity(diagram.len() + STYLE.len() + 2048);

        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html lang=\"en\">")?;
        writeln!(out, "<head>")?;
        writeln!(out, "    <meta charset=\"UTF-8\">")?;
        writeln!(
            out,
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(out, "    <title>{title}</title>")?;
        writeln!(out, "    <script src=\"{MERMAID_CDN}\"></script>")?;
        writeln!(out, "    <style>\n{STYLE}    </style>")?;
        writeln!(out, "</head>")?;
        writeln!(out, "<body>")?;
        writeln!(out, "    <div class=\"container\">")?;
        writeln!(out, "        <h1>{title}</h1>")?;

        writeln!(out, "        <div class=\"stats\">")?;
        write_stat(&mut out, stats.entity_count, "Entities")?;
        write_stat(&mut out, stats.edge_count, "Relationships")?;
        write_stat(&mut out, stats.enum_count, "Enums")?;
        writeln!(out, "        </div>")?;

        writeln!(out, "        <div class=\"diagram-container\">")?;
        writeln!(out, "<pre class=\"mermaid\">")?;
        out.push_str(diagram);
        writeln!(out, "</pre>")?;
        writeln!(out, "        </div>")?;

        write_names(&mut out, "Entities", entity_names)?;
        write_names(&mut out, "Enums", enum_names)?;

        writeln!(out, "    </div>")?;
        out.push_str(INIT_SCRIPT);
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")?;

        debug!(len = out.len(), "Packaged HTML document");
        Ok(out)
    }
}

impl Default for HtmlPackager {
    fn default() -> Self {
        Self::new()
    }
}

fn write_stat(out: &mut String, value: usize, label: &str) -> std::fmt::Result {
    writeln!(out, "            <div class=\"stat-card\">")?;
    writeln!(out, "                <div class=\"stat-number\">{value}</div>")?;
    writeln!(out, "                <div class=\"stat-label\">{label}</div>")?;
    writeln!(out, "            </div>")
}

fn write_names(out: &mut String, heading: &str, names: &[&str]) -> std::fmt::Result {
    writeln!(out, "        <div class=\"name-list\">")?;
    writeln!(out, "            <h3>{heading}:</h3>")?;
    for name in names {
        writeln!(
            out,
            "            <span class=\"name-item\">{}</span>",
            escape_html(name)
        )?;
    }
    writeln!(out, "        </div>")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders a schema graph straight to the HTML viewer
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    diagram: ErDiagramRenderer,
    packager: HtmlPackager,
}

impl HtmlRenderer {
    pub fn new(packager: HtmlPackager) -> Self {
        Self {
            diagram: ErDiagramRenderer::new(),
            packager,
        }
    }
}

impl Renderer<SchemaGraph> for HtmlRenderer {
    type Output = String;

    fn render(&self, graph: &SchemaGraph) -> Result<String> {
        let diagram = self.diagram.render(graph)?;
        let html = self.packager.package(
            &diagram,
            &graph.stats(),
            &graph.entity_names(),
            &graph.enum_names(),
        )?;
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "html"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "html"
    }
}
