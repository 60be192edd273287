//! VeriSeal CLI - build, anchor, and verify tamper-evident sensor records.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::warn;

use veriseal_core::{
    analyze_metric_history, parse_sensor_line, AtlasStore, KalmanConfig, MemoryStore,
    ProbeCommand, RecordBuilder, RecordStore, SealConfig, Verification, Verifier,
    WeatherService,
};
use veriseal_ledger::{AnchorStatus, LedgerAnchor, MemoLedger};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VeriSeal - tamper-evident sensor records anchored on a public ledger.
///
/// Every ingested reading becomes a record whose content hash is anchored
/// in a ledger memo transaction and whose secret-keyed lookup hash indexes
/// it in the document store. Any later party holding the content hash can
/// re-derive both hashes and prove the stored record unaltered.
#[derive(Parser)]
#[command(name = "veriseal")]
#[command(version = VERSION)]
#[command(about = "Tamper-evident sensor record anchoring and verification")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Ledger JSON-RPC endpoint
    #[arg(long)]
    rpc_url: Option<String>,

    /// Reporting device identity
    #[arg(long)]
    device_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read sensor lines and persist anchored records
    Ingest {
        /// Line source: a serial device node or file. Defaults to stdin.
        #[arg(long)]
        source: Option<PathBuf>,

        /// Capture an anchoring failure into the proof instead of aborting
        #[arg(long)]
        anchor_optional: bool,

        /// Keep records in memory instead of the document store (dry run)
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify a stored record against a claimed actual hash
    Verify {
        /// Actual SHA-256 hash that was anchored on the ledger
        #[arg(long)]
        actual_hash: String,

        /// Also check the anchor's confirmation status on the ledger
        #[arg(long)]
        check_chain: bool,
    },

    /// Query the confirmation status of an anchor reference
    Status {
        /// Transaction signature returned at anchoring time
        #[arg(long)]
        reference: String,
    },

    /// Evaluate a metric trend over an exported record history
    Trend {
        /// Metric key to analyze (e.g. temperature)
        #[arg(long, default_value = "temperature")]
        metric: String,

        /// Path to a JSON array of record documents
        #[arg(long)]
        history: PathBuf,
    },

    /// Show version and effective configuration
    Info,
}

/// Overlay environment-held secrets and endpoints onto the defaults.
fn config_from_env(cli: &Cli) -> SealConfig {
    let mut config = SealConfig::default();

    let overlay = |target: &mut String, key: &str| {
        if let Ok(value) = std::env::var(key) {
            if !value.is_empty() {
                *target = value;
            }
        }
    };

    overlay(&mut config.store_endpoint, "VERISEAL_STORE_ENDPOINT");
    overlay(&mut config.store_api_key, "VERISEAL_STORE_API_KEY");
    overlay(&mut config.store_data_source, "VERISEAL_STORE_DATA_SOURCE");
    overlay(&mut config.store_database, "VERISEAL_STORE_DATABASE");
    overlay(&mut config.store_collection, "VERISEAL_STORE_COLLECTION");
    overlay(&mut config.tweak_secret, "VERISEAL_TWEAK_SECRET");

    if let Ok(identity) = std::env::var("VERISEAL_ANCHOR_IDENTITY") {
        if !identity.is_empty() {
            config.anchor_identity = Some(identity);
        }
    }
    if let Some(rpc_url) = &cli.rpc_url {
        config.ledger_rpc_url = rpc_url.clone();
    }
    if let Some(device_id) = &cli.device_id {
        config.device_id = device_id.clone();
    }

    config
}

fn open_ledger(config: &SealConfig) -> Result<Arc<MemoLedger>, String> {
    MemoLedger::new(
        &config.ledger_rpc_url,
        &config.memo_program_id,
        config.anchor_identity.as_deref(),
        config.timeout,
    )
    .map(Arc::new)
    .map_err(|e| e.to_string())
}

async fn run_ingest(
    mut config: SealConfig,
    source: Option<PathBuf>,
    anchor_optional: bool,
    dry_run: bool,
) -> Result<(), String> {
    config.anchor_required = !anchor_optional;

    let ledger = open_ledger(&config)?;
    let store: Arc<dyn RecordStore> = if dry_run {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(AtlasStore::new(&config).map_err(|e| e.to_string())?)
    };
    let weather = WeatherService::new(&config).map_err(|e| e.to_string())?;
    let builder = RecordBuilder::new(config.clone(), ledger);

    let reader: Box<dyn BufRead> = match &source {
        Some(path) => Box::new(BufReader::new(
            File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    println!("Listening on {}...", source.as_deref().map_or_else(|| "stdin".to_string(), |p| p.display().to_string()));
    println!("Supported probe commands: CMD:TEMP, CMD:MOISTURE, CMD:SALINITY, CMD:PH");
    println!("Ledger endpoint: {}", config.ledger_rpc_url);

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "line read failed, stopping");
                break;
            },
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (sensor, source_tag) = if let Some(reading) = parse_sensor_line(line) {
            match reading.to_section() {
                Ok(section) => (section, "stm-dht11".to_string()),
                Err(e) => {
                    println!("Rejected reading: {e}");
                    continue;
                },
            }
        } else if let Some(command) = ProbeCommand::parse(line) {
            (command.synthesize(), command.source_tag().to_string())
        } else {
            println!("Ignored line (unknown format): {line}");
            continue;
        };

        let weather_section = weather.current().await;
        match builder.build(sensor, &source_tag, weather_section).await {
            Ok(record) => {
                let proof = record.proof();
                match store.insert(&record.to_document()).await {
                    Ok(()) => println!(
                        "Inserted record (actualHash={}, anchored={})",
                        proof.actual_hash,
                        proof.anchor.anchor_reference.is_some()
                    ),
                    Err(e) => println!("Insert failed: {e}"),
                }
            },
            Err(e) => println!("Build failed: {e}"),
        }
    }

    Ok(())
}

async fn run_verify(
    config: SealConfig,
    actual_hash: &str,
    check_chain: bool,
) -> Result<bool, String> {
    let ledger = open_ledger(&config)?;
    let store = Arc::new(AtlasStore::new(&config).map_err(|e| e.to_string())?);
    let verifier = Verifier::new(&config, store, ledger);

    match verifier.verify(actual_hash, check_chain).await {
        Verification::Pass { confirmation } => {
            println!("PASS: hash linkage and payload integrity verified");
            if let Some(tier) = confirmation {
                println!("PASS: anchor confirmation status: {tier}");
            }
            Ok(true)
        },
        Verification::Fail { kind, detail } => {
            println!("FAIL [{kind:?}]: {detail}");
            Ok(false)
        },
    }
}

async fn run_status(config: SealConfig, reference: &str) -> Result<(), String> {
    let ledger = open_ledger(&config)?;
    match ledger.status(reference).await.map_err(|e| e.to_string())? {
        AnchorStatus::Confirmed { tier } => println!("Anchor confirmed: {tier}"),
        AnchorStatus::Pending => println!("Anchor pending confirmation"),
        AnchorStatus::Failed { reason } => println!("Anchor failed on ledger: {reason}"),
        AnchorStatus::Unknown => println!("Anchor reference not found on ledger"),
    }
    Ok(())
}

fn run_trend(metric: &str, history_path: &Path) -> Result<(), String> {
    let file = File::open(history_path)
        .map_err(|e| format!("cannot open {}: {e}", history_path.display()))?;
    let history: Vec<Value> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("history is not a JSON array of records: {e}"))?;

    let analysis = analyze_metric_history(&history, metric, &KalmanConfig::default());
    println!(
        "Trend for {metric}: {:?} (slope {:.4}/h, confidence {:.2})",
        analysis.trend.direction, analysis.trend.slope, analysis.trend.confidence
    );
    println!(
        "Points used: {}, anomalies: {}",
        analysis.trend.points_used, analysis.trend.anomaly_count
    );
    Ok(())
}

fn print_info(config: &SealConfig) {
    println!("veriseal {VERSION}");
    println!("Ledger endpoint:  {}", config.ledger_rpc_url);
    println!("Memo program:     {}", config.memo_program_id);
    println!("Store endpoint:   {}", config.store_endpoint);
    println!("Store collection: {}/{}", config.store_database, config.store_collection);
    println!("Device identity:  {}", config.device_id);
    println!(
        "Anchoring:        {}",
        if config.anchor_identity.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_target(false)
            .init();
    }

    let config = config_from_env(&cli);

    let outcome = match cli.command {
        Commands::Ingest {
            ref source,
            anchor_optional,
            dry_run,
        } => run_ingest(config, source.clone(), anchor_optional, dry_run)
            .await
            .map(|()| true),
        Commands::Verify {
            ref actual_hash,
            check_chain,
        } => run_verify(config, actual_hash, check_chain).await,
        Commands::Status { ref reference } => {
            run_status(config, reference).await.map(|()| true)
        },
        Commands::Trend {
            ref metric,
            ref history,
        } => run_trend(metric, history).map(|()| true),
        Commands::Info => {
            print_info(&config);
            Ok(true)
        },
    };

    match outcome {
        Ok(true) => {},
        Ok(false) => std::process::exit(1),
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(2);
        },
    }
}
