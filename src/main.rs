use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;

use document_uploader::config::{self, Config};
use document_uploader::picker::FilePicker;
use document_uploader::uploader::{BatchReport, HttpTransport};
use document_uploader::{LogNotifier, UploadDialog};

#[derive(Debug, Parser)]
#[command(name = "document-uploader", version, about = "Upload documents with groups")]
struct Cli {
    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the upload server URL
    #[arg(long)]
    server: Option<String>,

    /// Override the API key
    #[arg(long)]
    api_key: Option<String>,

    /// Comma-separated groups attached to every file, e.g. "team-a, internal"
    #[arg(long, default_value = "")]
    groups: String,

    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,

    /// Documents to upload
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    config::validate_config(&config)?;
    Ok(config)
}

fn print_summary(report: &BatchReport) {
    println!(
        "Uploaded {}/{} files ({} failed)",
        report.successful_uploads.len(),
        report.total_files,
        report.total_files - report.successful_uploads.len()
    );
    for failed in &report.failed_uploads {
        println!("  ✗ {}: {}", failed.file_name, failed.error);
    }
    if let Some(error) = &report.batch_error {
        println!("  batch error: {}", error);
    }
}

/// Install the logger before anything that may log; the configured level is
/// applied afterwards with `log::set_max_level`.
fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Trace)
        .init();
    log::set_max_level(LevelFilter::Info);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging();
    let config = load_settings(&cli)?;
    log::set_max_level(config.log_level_filter());

    log::info!("Starting document uploader against {}", config.server_url);

    let picked = FilePicker::from_config(&config).pick(&cli.files).await;
    for rejected in &picked.rejected {
        eprintln!("Skipped {}: {}", rejected.path.display(), rejected.reason);
    }
    if picked.accepted.is_empty() {
        bail!("No files left to upload");
    }

    let transport = HttpTransport::from_config(&config)?;
    let dialog = UploadDialog::new(Arc::new(transport), Arc::new(LogNotifier));
    dialog.open();
    dialog.set_groups_text(cli.groups.clone());

    let submit = dialog.submit(picked.accepted);
    tokio::pin!(submit);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let report = loop {
        tokio::select! {
            result = &mut submit => break result?,
            _ = ticker.tick() => {
                let mut progress: Vec<_> = dialog.progress_snapshot().into_iter().collect();
                progress.sort();
                for (file_name, percent) in progress {
                    log::info!("{}: {}%", file_name, percent);
                }
            }
        }
    };

    if !dialog.request_close() {
        log::warn!("Upload dialog still busy after batch completed");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}
