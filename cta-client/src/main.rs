//! Cuneiform text analysis client (cta) - Main entry point
//!
//! Uploads a transliteration document to the analysis server, runs one
//! analysis on it and prints the result. Status events go to stderr so
//! stdout carries only the rendered result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cta_client::logging;
use cta_client::models::{OraccOptions, UploadFile};
use cta_client::services::HttpTransport;
use cta_client::SessionClient;
use cta_common::config::{resolve_config_path, ClientConfig, ConfigOverrides};
use cta_common::{AnalysisKind, ExportFormat, LayoutChoice};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cta
#[derive(Parser, Debug)]
#[command(name = "cta")]
#[command(about = "Upload and analyze cuneiform transliterations")]
#[command(version)]
struct Args {
    /// TOML configuration file (falls back to CTA_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Analysis server URL (falls back to CTA_SERVER_URL)
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a document and run an analysis on it
    Run {
        /// Document to upload (.docx)
        file: PathBuf,

        /// Tablet layout: lines, obverse_reverse or columns
        #[arg(short, long)]
        layout: Option<LayoutChoice>,

        /// Analysis to run: signs, words, glossary or oracc
        #[arg(short, long)]
        analysis: Option<AnalysisKind>,

        /// Oracc option: split obverse and reverse
        #[arg(long)]
        obverse_reverse: bool,

        /// Oracc option: column-divided output
        #[arg(long)]
        columns: bool,

        /// Result rendering on stdout
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,

        /// Export format for the result: csv, xlsx or atf
        #[arg(short, long, requires = "analysis")]
        export: Option<ExportFormat>,

        /// Download the export to this path instead of printing its URL
        #[arg(long, requires = "export")]
        save: Option<PathBuf>,
    },

    /// Print the resolved configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Installed before config resolution so its warnings are not lost
    let rust_log = std::env::var("RUST_LOG").ok();
    let (filter, log_filter) = logging::startup_filter(rust_log.as_deref());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::resolve(ConfigOverrides {
        config_path: args.config.clone(),
        server_url: args.server.clone(),
    })
    .context("Failed to resolve configuration")?;
    log_filter
        .apply_config_level(&config.logging.level)
        .context("Failed to apply logging level")?;

    match resolve_config_path(args.config.as_deref()) {
        Some(path) if path.exists() => info!("Configuration: {}", path.display()),
        _ => info!("Configuration: built-in defaults"),
    }
    info!("Server: {}", config.server_origin());

    match args.command {
        Command::Config => {
            let rendered =
                toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
            print!("{}", rendered);
            Ok(())
        }
        Command::Run {
            file,
            layout,
            analysis,
            obverse_reverse,
            columns,
            output,
            export,
            save,
        } => {
            run(
                &config,
                RunArgs {
                    file,
                    layout,
                    analysis,
                    oracc: OraccOptions {
                        obverse_reverse,
                        columns,
                    },
                    output,
                    export,
                    save,
                },
            )
            .await
        }
    }
}

struct RunArgs {
    file: PathBuf,
    layout: Option<LayoutChoice>,
    analysis: Option<AnalysisKind>,
    oracc: OraccOptions,
    output: OutputFormat,
    export: Option<ExportFormat>,
    save: Option<PathBuf>,
}

async fn run(config: &ClientConfig, args: RunArgs) -> Result<()> {
    let client = SessionClient::from_config(config).context("Failed to create session client")?;

    // Status area
    let mut status = client.subscribe();
    let status_task = tokio::spawn(async move {
        loop {
            match status.recv().await {
                Ok(event) => eprintln!("{}", event.status_line()),
                Err(RecvError::Lagged(skipped)) => {
                    eprintln!("({} status messages skipped)", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = run_session(&client, args).await;

    // Dropping the client closes the bus and ends the status task
    drop(client);
    let _ = status_task.await;
    outcome
}

async fn run_session(client: &SessionClient<HttpTransport>, args: RunArgs) -> Result<()> {
    let file = UploadFile::from_path(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    if let Some(layout) = args.layout {
        client.select_layout(layout).await;
    }
    client.set_oracc_options(args.oracc).await;

    let session = client.upload(Some(file)).await?;
    info!(
        "Upload {} accepted for {} ({})",
        session.upload_id, session.display_name, session.layout
    );
    if let Some(message) = &session.message {
        eprintln!("{}", message);
    }

    let Some(kind) = args.analysis else {
        println!("{}", session.upload_id);
        return Ok(());
    };

    let rendered = client.analyze(kind).await?;
    match args.output {
        OutputFormat::Text => print!("{}", rendered.to_text()),
        OutputFormat::Html => print!("{}", rendered.to_html()),
    }
    for line in rendered.diagnostics.lines() {
        eprintln!("syntax: {}", line);
    }

    if let Some(format) = args.export {
        match args.save {
            Some(path) => {
                let reference = client.save_export(format, &path).await?;
                eprintln!("Saved {} to {}", reference, path.display());
            }
            None => {
                let reference = client.export_reference(format).await?;
                println!("{}", reference.url(client.transport().origin()));
            }
        }
    }

    Ok(())
}
