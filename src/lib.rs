pub mod agents;
pub mod analysis;
pub mod builder;
pub mod cardinality;
pub mod display_width;
pub mod error;
pub mod framework;
pub mod graph;
pub mod html_renderer;
pub mod layout;
pub mod loader;
pub mod ontology;
pub mod render;
pub mod svg_renderer;
pub mod text_renderer;
pub mod theme;
pub mod visual;

use std::path::{Path, PathBuf};

pub use builder::{build_graph, get_graph_stats};
pub use error::{Error, Result};
pub use framework::{analyze_value_flow, build_w4m_framework_graph};
pub use graph::OntologyGraph;
pub use loader::parse_ontology;
pub use ontology::Ontology;
pub use render::{render_interactive, render_static, render_text};
pub use visual::{filter_by_domain, highlight_path};

use error::LoadError;
use loader::OntologyLoader;
use render::StaticOptions;

pub const INPUT_SOURCE: &str = "input";

pub fn load_file(path: impl AsRef<Path>) -> std::result::Result<Ontology, LoadError> {
    OntologyLoader::default().load_file(path)
}

pub fn parse_document(input: &str) -> std::result::Result<Ontology, LoadError> {
    let data: serde_json::Value =
        serde_json::from_str(input).map_err(|source| LoadError::Decode {
            path: PathBuf::from(INPUT_SOURCE),
            source,
        })?;
    parse_ontology(&data, INPUT_SOURCE)
}

pub fn render(input: &str) -> Result<String> {
    render_with_options(input, None)
}

pub fn render_with_options(input: &str, max_width: Option<usize>) -> Result<String> {
    let ontology = parse_document(input)?;
    let graph = build_graph(&ontology);
    let options = StaticOptions {
        max_width,
        ..StaticOptions::default()
    };
    Ok(render::render_text_with_options(&graph, &options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use error::RenderError;

    #[test]
    fn render_invalid_json_returns_error() {
        let err = render("{not json").unwrap_err();
        assert!(
            matches!(err, Error::Load(LoadError::Decode { .. })),
            "expected decode error, got: {err}"
        );
        assert!(err.to_string().contains("input"), "got: {err}");
    }

    #[test]
    fn render_empty_ontology_returns_error() {
        let err = render(r#"{"classes": {}}"#).unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::EmptyGraph)), "got: {err}");
    }

    #[test]
    fn render_standard_document_works() {
        let output = render(
            r#"{"name": "Shop", "classes": {"Customer": {}, "Order": {}},
                "relationships": {"places": {"rdfs:domain": "Customer", "rdfs:range": "Order"}}}"#,
        )
        .unwrap();
        assert!(output.contains("Customer"));
        assert!(output.contains("places"));
    }

    #[test]
    fn render_respects_max_width() {
        let doc = r#"{"classes": {"Root": {}, "Alpha": {}, "Beta": {}, "Gamma": {}},
            "relationships": {
                "r1": {"rdfs:domain": "Root", "rdfs:range": "Alpha"},
                "r2": {"rdfs:domain": "Root", "rdfs:range": "Beta"},
                "r3": {"rdfs:domain": "Root", "rdfs:range": "Gamma"}}}"#;
        let err = render_with_options(doc, Some(10)).unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::TooWide { max_width: 10 })));
        let output = render_with_options(doc, Some(80)).unwrap();
        assert!(output.lines().all(|l| display_width::display_width(l) <= 80));
    }
}
