use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::Level;

use ontograph::builder::GraphBuilder;
use ontograph::error::LoadError;
use ontograph::framework::{DomainGraphBuilder, VsomConfig, W4mFramework};
use ontograph::graph::OntologyGraph;
use ontograph::render::{InteractiveOptions, StaticOptions};
use ontograph::theme::Theme;
use ontograph::visual::Domain;

#[derive(Parser)]
#[command(name = "ontograph", about = "Load ontology documents and render them as graphs")]
struct Cli {
    /// Ontology document (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Start from the W4M framework graph
    #[arg(long)]
    framework: bool,

    /// Output file: .html, .svg or .txt (text goes to stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Keep only nodes of one domain (Agent, VE, CE, Framework, Core)
    #[arg(long)]
    domain: Option<Domain>,

    /// With --domain, drop the one-hop neighbours
    #[arg(long, requires = "domain")]
    isolated: bool,

    /// Highlight the shortest path between two node ids
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
    highlight: Option<Vec<String>>,

    /// Disable the physics simulation in HTML output
    #[arg(long)]
    no_physics: bool,

    /// Print graph statistics as JSON
    #[arg(long)]
    stats: bool,

    /// Print a W4M value-flow analysis as JSON
    #[arg(long)]
    analyze: bool,

    /// Presentation theme (JSON)
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Maximum text output width in columns
    #[arg(long, short = 'w')]
    width: Option<usize>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> ontograph::Result<()> {
    let theme = match &cli.theme {
        Some(path) => Theme::from_file(path)?,
        None => Theme::default(),
    };
    let domain_builder = DomainGraphBuilder::new(
        W4mFramework::default(),
        VsomConfig::default(),
        GraphBuilder::new(theme.clone()),
    );

    let mut graph = load_graph(cli, &theme, &domain_builder)?;

    if let Some(domain) = cli.domain {
        graph = ontograph::filter_by_domain(&graph, domain, !cli.isolated);
    }
    if let Some([from, to]) = cli.highlight.as_deref() {
        graph = ontograph::highlight_path(&graph, from, to, &theme.highlight_color).graph;
    }

    if cli.stats {
        let stats = ontograph::get_graph_stats(&graph);
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    if cli.analyze {
        let analysis = domain_builder.analyze_value_flow(&graph, 0, domain_builder.last_layer())?;
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    }

    match &cli.output {
        Some(path) if has_extension(path, "html") => {
            let options = InteractiveOptions {
                physics: !cli.no_physics,
                theme,
            };
            let written = ontograph::render_interactive(&graph, Some(path), &options)?;
            eprintln!("wrote {}", written.display());
        }
        Some(path) => {
            let options = StaticOptions {
                theme,
                max_width: cli.width,
            };
            let written = ontograph::render_static(&graph, path, &options)?;
            eprintln!("wrote {}", written.display());
        }
        None if cli.stats || cli.analyze => {}
        None => {
            let options = StaticOptions {
                theme,
                max_width: cli.width,
            };
            println!("{}", ontograph::render::render_text_with_options(&graph, &options)?);
        }
    }
    Ok(())
}

fn load_graph(
    cli: &Cli,
    theme: &Theme,
    domain_builder: &DomainGraphBuilder,
) -> ontograph::Result<OntologyGraph> {
    let builder = GraphBuilder::new(theme.clone());
    let document = match (&cli.file, cli.framework) {
        (Some(path), _) => Some(builder.from_file(path)?),
        (None, true) => None,
        (None, false) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| LoadError::Io {
                    path: PathBuf::from("stdin"),
                    source,
                })?;
            let ontology = ontograph::parse_document(&buf)?;
            Some(builder.build(&ontology).graph)
        }
    };

    if !cli.framework {
        return Ok(document.unwrap_or_default());
    }
    let mut graph = domain_builder.build_w4m_framework_graph();
    if let Some(document) = &document {
        graph.compose(document);
    }
    Ok(graph)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
