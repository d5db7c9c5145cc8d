//! Generation pipeline
//!
//! Directory scan → per-file extraction → assembly → rendering → output files.
//! Per-file extraction can run in parallel; results are always reduced in
//! file-name order so the output does not depend on scheduling.

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, span, warn, Level};

use crate::core::{Diagnostics, ErGraphError, Extractor, Renderer};
use crate::plugins::entity::{EntityExtractor, ExtractorConfig, ENTITY_FILE_SUFFIX};
use crate::plugins::enumeration::{EnumExtractor, ENUM_FILE_SUFFIX};
use crate::plugins::er::{
    ErDiagramRenderer, HtmlPackager, HtmlRenderer, SchemaGraph, SchemaStats,
};

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory holding entity files
    pub models_dir: PathBuf,
    /// Directory holding enum files
    pub enums_dir: PathBuf,
    pub entity_suffix: String,
    pub enum_suffix: String,
    /// Where the Mermaid text is written
    pub mermaid_output: PathBuf,
    /// Where the HTML viewer is written
    pub html_output: PathBuf,
    /// Heading and page title of the HTML viewer
    pub title: String,
    /// Extract files on the rayon thread pool
    pub parallel: bool,
    pub extractor: ExtractorConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("./models"),
            enums_dir: PathBuf::from("./enums"),
            entity_suffix: ENTITY_FILE_SUFFIX.to_string(),
            enum_suffix: ENUM_FILE_SUFFIX.to_string(),
            mermaid_output: PathBuf::from("er-diagram.mmd"),
            html_output: PathBuf::from("er-diagram.html"),
            title: HtmlPackager::new().title().to_string(),
            parallel: true,
            extractor: ExtractorConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load a config from a JSON file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ErGraphError> {
        let contents = fs::read_to_string(path).map_err(|e| ErGraphError::io(path, e))?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ErGraphError> {
        serde_json::from_str(json).map_err(|e| ErGraphError::config_error(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ErGraphError> {
        if self.entity_suffix.is_empty() || self.enum_suffix.is_empty() {
            return Err(ErGraphError::config_error("file suffixes must not be empty"));
        }
        if self.extractor.entity_markers.is_empty() {
            return Err(ErGraphError::config_error(
                "at least one entity marker is required",
            ));
        }
        Ok(())
    }
}

/// The assembled graph and everything that was skipped along the way
#[derive(Debug, Clone)]
pub struct Extraction {
    pub graph: SchemaGraph,
    pub diagnostics: Diagnostics,
}

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub stats: SchemaStats,
    pub diagnostics: Diagnostics,
    pub mermaid_path: PathBuf,
    pub html_path: PathBuf,
}

/// One file's extraction result
struct FileResult<T> {
    name: String,
    output: Option<T>,
    diagnostics: Diagnostics,
}

/// Drives extractors and renderers over the configured directories
pub struct Generator {
    config: GeneratorConfig,
    entity_extractor: EntityExtractor,
    enum_extractor: EnumExtractor,
    diagram_renderer: ErDiagramRenderer,
    html_renderer: HtmlRenderer,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ErGraphError> {
        config.validate()?;
        Ok(Self {
            entity_extractor: EntityExtractor::with_config(config.extractor.clone())
                .with_suffix(config.entity_suffix.clone()),
            enum_extractor: EnumExtractor::new().with_suffix(config.enum_suffix.clone()),
            diagram_renderer: ErDiagramRenderer::new(),
            html_renderer: HtmlRenderer::new(HtmlPackager::with_title(config.title.clone())),
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Files in `dir` accepted by `extractor`, sorted by file name
    fn list_files<E: Extractor>(dir: &Path, extractor: &E) -> Result<Vec<PathBuf>, ErGraphError> {
        let entries = fs::read_dir(dir).map_err(|e| ErGraphError::io(dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ErGraphError::io(dir, e))?;
            let path = entry.path();
            let accepted = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| extractor.can_extract(name));
            if accepted && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn extract_file<E: Extractor>(
        extractor: &E,
        path: &Path,
    ) -> Result<FileResult<E::Output>, ErGraphError> {
        let text = fs::read_to_string(path).map_err(|e| ErGraphError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut diagnostics = Diagnostics::new();
        let output = extractor.extract(&text, &mut diagnostics);
        debug!(
            file = %name,
            extractor = extractor.name(),
            matched = output.is_some(),
            "Extracted file"
        );
        Ok(FileResult {
            name,
            output,
            diagnostics,
        })
    }

    /// Extract every accepted file in `dir`, in file-name order
    fn extract_dir<E: Extractor>(
        &self,
        dir: &Path,
        extractor: &E,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<E::Output>, ErGraphError> {
        let files = Self::list_files(dir, extractor)?;
        info!(
            dir = %dir.display(),
            files = files.len(),
            extractor = extractor.name(),
            "Reading files"
        );

        let results: Vec<FileResult<E::Output>> = if self.config.parallel {
            files
                .par_iter()
                .map(|path| Self::extract_file(extractor, path))
                .collect::<Result<_, _>>()?
        } else {
            files
                .iter()
                .map(|path| Self::extract_file(extractor, path))
                .collect::<Result<_, _>>()?
        };

        let mut outputs = Vec::with_capacity(results.len());
        for result in results {
            diagnostics.extend_from(result.diagnostics, &result.name);
            outputs.extend(result.output);
        }
        Ok(outputs)
    }

    /// Scan both directories and assemble the schema graph
    pub fn extract(&self) -> Result<Extraction> {
        let extract_span = span!(Level::INFO, "extract_schema");
        let _enter = extract_span.enter();

        let mut diagnostics = Diagnostics::new();
        let entities = self.extract_dir(
            &self.config.models_dir,
            &self.entity_extractor,
            &mut diagnostics,
        )?;
        let enums = self.extract_dir(
            &self.config.enums_dir,
            &self.enum_extractor,
            &mut diagnostics,
        )?;

        let graph = SchemaGraph::assemble(entities, enums);
        for diagnostic in graph.dangling_diagnostics() {
            diagnostics.push_diagnostic(diagnostic);
        }

        let stats = graph.stats();
        info!(
            entities = stats.entity_count,
            enums = stats.enum_count,
            "Found {} entities and {} enums",
            stats.entity_count,
            stats.enum_count
        );
        info!(
            relationships = stats.edge_count,
            rendered = stats.rendered_edge_count,
            "Found {} relationships",
            stats.edge_count
        );
        if diagnostics.warning_count() > 0 {
            warn!(warnings = diagnostics.warning_count(), "Extraction produced warnings");
        }

        Ok(Extraction { graph, diagnostics })
    }

    /// Render the Mermaid text and the HTML viewer for a graph
    pub fn render(&self, graph: &SchemaGraph) -> Result<(String, String)> {
        let diagram = self.diagram_renderer.render(graph)?;
        let html = self.html_renderer.render(graph)?;
        Ok((diagram, html))
    }

    /// Run the whole pipeline and write both output files
    pub fn generate(&self) -> Result<GenerationReport> {
        let generate_span = span!(Level::INFO, "generate");
        let _enter = generate_span.enter();

        let Extraction { graph, diagnostics } = self.extract()?;
        let (diagram, html) = self.render(&graph)?;

        write_output(&self.config.html_output, &html)?;
        info!(path = %self.config.html_output.display(), "ER diagram written");
        write_output(&self.config.mermaid_output, &diagram)?;
        info!(path = %self.config.mermaid_output.display(), "Mermaid syntax written");

        Ok(GenerationReport {
            stats: graph.stats(),
            diagnostics,
            mermaid_path: self.config.mermaid_output.clone(),
            html_path: self.config.html_output.clone(),
        })
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), ErGraphError> {
    fs::write(path, contents).map_err(|e| ErGraphError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.models_dir, PathBuf::from("./models"));
        assert_eq!(config.enums_dir, PathBuf::from("./enums"));
        assert_eq!(config.entity_suffix, ".entity.ts");
        assert_eq!(config.enum_suffix, ".enum.ts");
        assert_eq!(config.mermaid_output, PathBuf::from("er-diagram.mmd"));
        assert_eq!(config.html_output, PathBuf::from("er-diagram.html"));
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json_partial() {
        let config =
            GeneratorConfig::from_json(r#"{ "models_dir": "src/models", "parallel": false }"#)
                .unwrap();
        assert_eq!(config.models_dir, PathBuf::from("src/models"));
        assert!(!config.parallel);
        assert_eq!(config.enum_suffix, ".enum.ts");
    }

    #[test]
    fn test_config_from_json_invalid() {
        let error = GeneratorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(error, ErGraphError::Config { .. }));
    }

    #[test]
    fn test_empty_suffix_rejected() {
        let config = GeneratorConfig {
            entity_suffix: String::new(),
            ..GeneratorConfig::default()
        };
        assert!(Generator::new(config).is_err());
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let config = GeneratorConfig {
            models_dir: PathBuf::from("/nonexistent/ergraph/models"),
            ..GeneratorConfig::default()
        };
        let generator = Generator::new(config).unwrap();
        let error = generator.extract().unwrap_err();
        let error = error.downcast_ref::<ErGraphError>().unwrap();
        assert!(matches!(error, ErGraphError::Io { .. }));
    }
}
