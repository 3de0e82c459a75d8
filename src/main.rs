//! CLI entry point for `callbox`.

use std::path::PathBuf;

use clap::Parser;

use callbox::extract::MboxExtractor;

#[derive(Parser)]
#[command(
    name = "callbox",
    version,
    about = "Extract call-recording audio attachments from an MBOX archive"
)]
struct Cli {
    /// MBOX archive, as a path relative to the extraction directory
    #[arg(value_name = "ARCHIVE")]
    archive: PathBuf,

    /// Extraction directory (archive root and output target; overrides config)
    #[arg(short = 'd', long, value_name = "DIR")]
    extract_dir: Option<PathBuf>,

    /// Print a JSON report instead of plain text
    #[arg(long)]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = callbox::config::load_config();

    let log_level = match cli.verbose {
        0 => config.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level);

    let extract_dir = cli.extract_dir.unwrap_or(config.extract_dir);
    let extractor = MboxExtractor::new(extract_dir);
    let summary = extractor.extract(&cli.archive);

    if cli.json {
        let report = serde_json::json!({
            "archive": cli.archive.to_string_lossy(),
            "extracted": summary.extracted,
            "failure_count": summary.failures.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for filename in &summary.extracted {
            println!("{filename}");
        }
        eprintln!(
            "  Extracted {} audio recording(s) ({} failure(s))",
            summary.extracted.len(),
            summary.failures.len()
        );
    }

    Ok(())
}

/// Set up tracing with stderr output and a file log in the cache directory.
fn setup_logging(level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = callbox::config::cache_dir();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "callbox.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}
