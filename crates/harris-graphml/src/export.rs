//! Export entry points

use crate::config::HarrisConfig;
use crate::error::ExportError;
use crate::serializer::GraphMLSerializer;
use harris_core::{analyze_site, Analysis, MatrixAnalysis, UnitSource};
use std::path::Path;

/// Render an analysed site
pub fn export_graphml(analysis: &MatrixAnalysis, config: &HarrisConfig) -> Result<String, ExportError> {
    GraphMLSerializer::from_config(config).serialize(&analysis.graph, &analysis.layout, &analysis.periods)
}

/// Load, analyse and render one site
///
/// Diagnostics of every stage travel with the document.
pub fn export_site(
    source: &dyn UnitSource,
    site: &str,
    config: &HarrisConfig,
) -> Result<Analysis<String>, ExportError> {
    let analysis = analyze_site(source, site)?;
    let document = export_graphml(&analysis.value, config)?;
    tracing::info!(
        site,
        units = analysis.value.graph.node_count(),
        edges = analysis.value.layout.edges.len(),
        diagnostics = analysis.diagnostics.len(),
        bytes = document.len(),
        "exported"
    );
    Ok(Analysis::new(document, analysis.diagnostics))
}

/// Write a document, creating parent directories
pub fn write_document(path: impl AsRef<Path>, text: &str) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::io_error(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| ExportError::io_error(path, e))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use harris_core::{InMemoryStore, UnitRecord};

    #[test]
    fn unknown_site_is_fatal() {
        let err = export_site(&InMemoryStore::new(), "Nowhere", &HarrisConfig::new()).unwrap_err();
        assert!(matches!(err, ExportError::Core(_)));
        assert!(!err.is_engine_bug());
    }

    #[test]
    fn site_diagnostics_travel_with_document() {
        let store = InMemoryStore::new().with_units(
            "S",
            vec![UnitRecord::new("S", "1").with_relationships("Covers 99")],
        );
        let out = export_site(&store, "S", &HarrisConfig::new()).unwrap();
        assert!(out.value.contains("<graphml"));
        assert!(!out.diagnostics.is_empty());
    }

    #[test]
    fn write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/site.graphml");
        write_document(&path, "<graphml/>").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<graphml/>");
    }
}
