use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::RenderError;
use crate::graph::OntologyGraph;
use crate::theme::Theme;
use crate::{html_renderer, layout, svg_renderer, text_renderer};

#[derive(Debug, Clone)]
pub struct InteractiveOptions {
    pub physics: bool,
    pub theme: Theme,
}

impl Default for InteractiveOptions {
    fn default() -> Self {
        Self {
            physics: true,
            theme: Theme::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    pub theme: Theme,
    pub max_width: Option<usize>,
}

/// `<name>_graph.html`, lowercased with spaces replaced.
pub fn default_output_path(graph: &OntologyGraph) -> PathBuf {
    let name = if graph.meta.name.is_empty() {
        "ontology"
    } else {
        graph.meta.name.as_str()
    };
    PathBuf::from(format!("{}_graph.html", name.replace(' ', "_").to_lowercase()))
}

pub fn render_interactive(
    graph: &OntologyGraph,
    output: Option<&Path>,
    options: &InteractiveOptions,
) -> Result<PathBuf, RenderError> {
    let path = output.map_or_else(|| default_output_path(graph), Path::to_path_buf);
    let page = html_renderer::render(graph, &options.theme, options.physics);
    write_artifact(&path, &page)?;
    info!(path = %path.display(), nodes = graph.node_count(), "wrote interactive graph");
    Ok(path)
}

pub fn render_static(
    graph: &OntologyGraph,
    output: &Path,
    options: &StaticOptions,
) -> Result<PathBuf, RenderError> {
    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let body = match ext.as_str() {
        "svg" => {
            let computed = layout::compute(graph, &options.theme)?;
            svg_renderer::render(graph, &computed, &options.theme)
        }
        "txt" => {
            let mut text = render_text_with_options(graph, options)?;
            text.push('\n');
            text
        }
        "png" | "pdf" => return Err(RenderError::BackendUnavailable { format: ext }),
        _ => return Err(RenderError::UnsupportedFormat(output.display().to_string())),
    };

    write_artifact(output, &body)?;
    info!(path = %output.display(), format = %ext, "wrote static graph");
    Ok(output.to_path_buf())
}

pub fn render_text(graph: &OntologyGraph) -> Result<String, RenderError> {
    render_text_with_options(graph, &StaticOptions::default())
}

pub fn render_text_with_options(
    graph: &OntologyGraph,
    options: &StaticOptions,
) -> Result<String, RenderError> {
    let computed = match options.max_width {
        Some(w) => layout::compute_with_max_width(graph, &options.theme, w)?,
        None => layout::compute(graph, &options.theme)?,
    };
    Ok(text_renderer::render(&computed))
}

fn write_artifact(path: &Path, contents: &str) -> Result<(), RenderError> {
    std::fs::write(path, contents).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
