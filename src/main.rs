use clap::{ArgAction, Parser, Subcommand};
use ipdsms_config::Config;
use ipdsms_convert::{ConvertOptions, Event, Progress};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ipdsms", version)]
#[command(about = "Convert BlackBerry IPD/BBB backups into SMS Backup & Restore XML")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Ignored when RUST_LOG is set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (TOML, YAML or JSON). Defaults to the platform config directory.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the messages in a backup into an XML document
    Convert {
        /// Backup file (.ipd or .bbb)
        input: PathBuf,

        /// Output document; defaults to the input path with an .xml extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read this sub-database id instead of looking up the message database by name; 0 keeps the lookup
        #[arg(long, value_name = "N")]
        database_id: Option<u32>,
    },
    /// List the sub-databases of a backup with their record counts
    List {
        /// Backup file (.ipd or .bbb)
        input: PathBuf,
    },
}

/// Initialize tracing on stderr; stdout carries command output.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn,ipdsms=info",
            1 => "warn,ipdsms=debug",
            _ => "warn,ipdsms=trace",
        })
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Render an error tree, with the location of every frame, as a diagnostic.
fn report<E>(err: exn::Exn<E>) -> miette::Report
where
    E: std::error::Error + Send + Sync + 'static,
{
    miette::miette!("{:?}", err)
}

fn options(config: &Config, database_id: Option<u32>) -> miette::Result<ConvertOptions> {
    Ok(ConvertOptions {
        database_id,
        container_database: config.container.database.clone().into_bytes(),
        archive_database: config.archive.database.clone(),
        export: config.export.to_options().map_err(report)?,
        progress: Progress::default(),
    })
}

fn convert(config: &Config, input: &Path, output: Option<PathBuf>, database_id: Option<u32>) -> miette::Result<()> {
    let output = output.unwrap_or_else(|| input.with_extension("xml"));
    let (tx, rx) = mpsc::channel();
    let logger = std::thread::spawn(move || {
        for event in rx {
            match event {
                Event::RecordsProcessed(records) => tracing::trace!(records, "progress"),
                event => tracing::debug!(?event, "progress"),
            }
        }
    });
    let mut options = options(config, database_id)?;
    options.progress = Progress::new().with_sender(tx);
    let result = ipdsms_convert::convert(input, &output, &options);
    drop(options);
    let _ = logger.join();
    match result.map_err(report)? {
        0 => println!("No messages found in {}; nothing written.", input.display()),
        count => println!("Wrote {count} messages to {}", output.display()),
    }
    Ok(())
}

fn list(config: &Config, input: &Path) -> miette::Result<()> {
    let inventory = ipdsms_convert::inspect(input, &options(config, None)?).map_err(report)?;
    println!("version: {}", inventory.header.version);
    println!("{:>5}  {:>8}  name", "index", "records");
    for db in &inventory.databases {
        println!("{:>5}  {:>8}  {}", db.index, db.records, db.name);
    }
    Ok(())
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load(cli.config.as_deref()).map_err(report)?;
    match cli.command {
        Commands::Convert { input, output, database_id } => convert(&config, &input, output, database_id),
        Commands::List { input } => list(&config, &input),
    }
}
