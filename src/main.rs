//! # FasterDL - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Probe del compressore esterno (una sola volta)
//! - Conferma interattiva prima di cancellare un output esistente
//! - Ctrl-C come stop signal cooperativo per la pipeline
//!
//! ## Esempio di utilizzo:
//! ```bash
//! fasterdl "/srv/garrysmod/addons/cars" 1 --workers 8 --yes
//! ```

use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fasterdl::json_output::JsonMessage;
use fasterdl::platform::PlatformCommands;
use fasterdl::{CompressorPreference, Config, FastDlError, ManifestMode, Packager};

#[derive(Parser)]
#[command(name = "fasterdl")]
#[command(about = "Copy, bzip2 and list game assets for fast client downloads")]
struct Args {
    /// Folder to package (its output goes to <folder>_fasterdl_output)
    input_directory: String,

    /// Create the Lua resource file: 1 = yes, 0 = no (default: yes if addon layout).
    /// Only 0 and 1 are accepted; anything else is rejected at parse time
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    resource_file: Option<u8>,

    /// Delete an existing output folder without asking
    #[arg(short, long)]
    yes: bool,

    /// Number of parallel workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Always use the built-in bzip2 encoder
    #[arg(long, conflicts_with = "external")]
    in_process: bool,

    /// Require 7-Zip for compression
    #[arg(long)]
    external: bool,

    /// Output progress and status as JSON lines
    #[arg(long)]
    json: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Load base configuration from a JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Explicit flags win over the config file
    fn apply_to(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.yes {
            config.overwrite_output = true;
        }
        if let Some(flag) = self.resource_file {
            config.manifest = ManifestMode::from_flag(Some(flag == 1));
        }
        if self.in_process {
            config.compressor = CompressorPreference::InProcess;
        }
        if self.external {
            config.compressor = CompressorPreference::External;
        }
        if self.json {
            config.json_output = true;
        }
        if self.no_progress {
            config.show_progress = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    let json_output = config.json_output;

    match run(&args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let preflight = e
                .downcast_ref::<FastDlError>()
                .is_some_and(|err| err.is_fatal());

            if json_output {
                JsonMessage::error(e.to_string()).emit();
            } else if preflight {
                error!("Nothing was packaged: {:#}", e);
            } else {
                error!("Run aborted: {:#}", e);
            }
            std::process::exit(1);
        }
    }
}

async fn run(args: &Args, config: Config) -> Result<()> {
    let input = PathBuf::from(args.input_directory.replace('"', ""));
    let input = std::path::absolute(&input).unwrap_or(input);

    let external_tool = match config.compressor {
        CompressorPreference::InProcess => None,
        _ => PlatformCommands::instance().find_external_compressor(),
    };

    let json_output = config.json_output;
    let mut packager = Packager::new(&input, config, external_tool)?;

    if packager.has_output_conflict() && !json_output {
        if !confirm_delete(packager.output_dir())? {
            info!("Output folder kept, nothing to do");
            return Ok(());
        }
        packager.allow_overwrite();
    }

    let (stop_sender, stop_receiver) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, finishing files in progress...");
            let _ = stop_sender.send(());
        }
    });

    let report = packager.with_cancellation(stop_receiver).run().await?;

    if let Some(manifest) = report.manifest {
        info!("Resource file: {}", manifest.display());
    }

    Ok(())
}

fn confirm_delete(output_dir: &std::path::Path) -> Result<bool> {
    println!("Output folder already exists!: {}", output_dir.display());
    print!("Would you like to delete it? [y/n] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
