//! ido binary - render one page of a site to HTML

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ido::{ControllerConfig, MemoryDocumentStore, Services, WebController};
use ido_config::ConfigStore;
use ido_render::{FileSystemResolver, NullResolver, TemplateResolver};

#[derive(Parser, Debug)]
#[command(name = "ido")]
#[command(version, about = "Render a page from configuration and documents")]
struct Args {
    /// Configuration seed file (JSON, YAML or TOML); may be repeated
    #[arg(short, long = "config", value_name = "FILE")]
    configs: Vec<PathBuf>,

    /// Collections of documents, including the `pages` collection
    #[arg(short, long, value_name = "FILE")]
    documents: Option<PathBuf>,

    /// Route of the page to render
    #[arg(short, long, default_value = "/")]
    route: String,

    /// Base path for static assets, available as {%env.src%}
    #[arg(long, value_name = "PREFIX", default_value = "")]
    src: String,

    /// Minimize the rendered HTML
    #[arg(long)]
    minimize: bool,

    /// Directory holding included tag trees
    #[arg(short, long, value_name = "DIR")]
    templates: Option<PathBuf>,

    /// Write the page here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ido=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let documents = match &args.documents {
        Some(path) => MemoryDocumentStore::load_file(path)
            .with_context(|| format!("Failed to load documents from {}", path.display()))?,
        None => MemoryDocumentStore::new(),
    };

    let templates: Box<dyn TemplateResolver> = match args.templates {
        Some(dir) => {
            info!(templates = %dir.display(), "Using template directory");
            Box::new(FileSystemResolver::new(dir))
        }
        None => Box::new(NullResolver),
    };

    let settings = ControllerConfig {
        seeds: args.configs,
        src: args.src,
        minimize: args.minimize.then_some(true),
        ..ControllerConfig::default()
    };
    let services = Services {
        config: ConfigStore::new(),
        documents: Box::new(documents),
        templates,
    };
    let controller = WebController::new(services, settings);

    let response = controller
        .handle(&args.route)
        .with_context(|| format!("Failed to render route {}", args.route))?;

    match &args.output {
        Some(path) => fs::write(path, &response.body)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(response.body.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    if !response.is_success() {
        bail!("Route {} rendered with status {}", args.route, response.status);
    }
    Ok(())
}
