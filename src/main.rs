use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use halftone_dither::{DitherMode, ToneMode};
use halftoner::models::{AppConfig, BatchRequest, Job, OptionsOverride, ProcessingOptions};
use halftoner::server;
use halftoner::services::{orchestrator, Archiver, DirectoryArchiver, JobPipeline, ZipArchiver};

#[derive(Parser)]
#[command(name = "halftoner")]
#[command(about = "Print-sized black and white halftones from photos")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Convert image files and write them to a batch directory
    Process {
        /// Images to convert (any format the image crate can read)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output root; a halftone_batch_<timestamp> directory is created inside
        /// (default: $OUTPUT_DIR or the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Printed width in centimetres
        #[arg(long)]
        width_cm: Option<f64>,

        /// Printer resolution in dots per inch
        #[arg(long)]
        dpi: Option<u32>,

        /// Contrast factor around mid-gray (0.8 to 2.0)
        #[arg(long)]
        contrast: Option<f64>,

        /// Black/white threshold (0 to 255)
        #[arg(long)]
        threshold: Option<f64>,

        /// Binarization: "floyd" or "binary"
        #[arg(long)]
        mode: Option<DitherMode>,

        /// Output tone: "bw", "gray" or "color"
        #[arg(long)]
        tone: Option<ToneMode>,

        /// Write a single halftone_batch_<timestamp>.zip instead of a directory
        #[arg(long)]
        zip: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Process {
            files,
            output,
            width_cm,
            dpi,
            contrast,
            threshold,
            mode,
            tone,
            zip,
        }) => {
            let overrides = OptionsOverride {
                contrast,
                threshold,
                mode,
                tone_mode: tone,
                output_width_cm: width_cm,
                print_dpi: dpi,
            };
            let output = output
                .or_else(|| std::env::var("OUTPUT_DIR").ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));
            run_process_command(files, output, overrides, zip).await
        }
        Some(Commands::Serve) => run_server().await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Read each file into a job; unreadable or unrecognised files are skipped.
fn load_jobs(files: &[PathBuf]) -> Vec<Job> {
    files
        .iter()
        .filter_map(|path| {
            let id = path.display().to_string();
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(%e, path = %id, "Failed to read file, skipping");
                    return None;
                }
            };
            match Job::admit(id.clone(), bytes) {
                Ok(job) => Some(job),
                Err(e) => {
                    tracing::warn!(%e, path = %id, "Not a readable image, skipping");
                    None
                }
            }
        })
        .collect()
}

fn print_output_info(jobs: &[Job], options: &ProcessingOptions) {
    for job in jobs {
        match options.target_for(job.width, job.height) {
            Ok(target) => println!(
                "{}: {}x{} px -> {:.1} x {:.1} cm, {}x{} px @ {} dpi",
                job.id,
                job.width,
                job.height,
                target.width_cm(),
                target.height_cm(),
                target.width,
                target.height,
                target.dpi
            ),
            Err(e) => println!("{}: {e}", job.id),
        }
    }
}

/// Convert files through the orchestrator and archive the results
async fn run_process_command(
    files: Vec<PathBuf>,
    output: PathBuf,
    overrides: OptionsOverride,
    zip: bool,
) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "halftoner=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = AppConfig::from_env();
    let options = overrides.apply(config.defaults);
    options.validate()?;

    let jobs = load_jobs(&files);
    if jobs.is_empty() {
        anyhow::bail!("None of the {} input files could be read", files.len());
    }

    print_output_info(&jobs, &options);
    println!(
        "Converting {} images ({}, {})",
        jobs.len(),
        options.mode,
        options.tone_mode
    );

    let handle = orchestrator::spawn(JobPipeline::default());
    let response = handle
        .process(BatchRequest { jobs, options }, |progress| {
            println!("[{}/{}]", progress.current, progress.total);
        })
        .await?;

    let archiver: Box<dyn Archiver> = if zip {
        Box::new(ZipArchiver::new(output))
    } else {
        Box::new(DirectoryArchiver::new(output))
    };
    let report = archiver.archive(&response.results)?;

    println!(
        "Wrote {} files to {} in {:.0} ms",
        report.entries.len(),
        report.location.display(),
        response.duration_ms
    );
    if report.fallbacks > 0 {
        println!(
            "{} images could not be converted and were copied unchanged",
            report.fallbacks
        );
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Read environment variables
    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let output_dir = std::env::var("OUTPUT_DIR").ok();

    // Header
    println!("Halftoner v{VERSION}");
    println!("Print-sized black and white halftones\n");

    // Environment variables section
    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  OUTPUT_DIR  = {}",
        output_dir.as_deref().unwrap_or(". (default)")
    );

    // Config source
    let config_source = match config_file {
        Some(ref path) if PathBuf::from(path).exists() => path.to_string(),
        Some(_) => "built-in (file not found)".to_string(),
        None => "built-in".to_string(),
    };
    println!("\nConfig: {config_source}");

    let defaults = AppConfig::from_env().defaults;
    println!("\nDefault Options:");
    println!("  contrast    = {}", defaults.contrast);
    println!("  threshold   = {}", defaults.threshold);
    println!("  mode        = {}", defaults.mode);
    println!("  tone        = {}", defaults.tone_mode);
    println!("  width       = {} cm", defaults.output_width_cm);
    println!("  dpi         = {}", defaults.print_dpi);

    // Commands section
    println!("\nCommands:");
    println!("  halftoner serve     Start the HTTP server");
    println!("  halftoner process   Convert image files to halftone PNGs");
    println!("\nRun 'halftoner --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "halftoner=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let config = AppConfig::from_env();

    let state = server::create_app_state(config)?;
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Halftoner server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
