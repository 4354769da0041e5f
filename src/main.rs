//! ospf-monitor: host-local OSPF state monitor
//!
//! This is the main entry point for the monitoring daemon.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! ./ospf-monitor
//!
//! # Run with custom configuration
//! ./ospf-monitor -c /path/to/config.json
//!
//! # Run with environment overrides
//! OSPF_MONITOR_METRICS_URL=http://10.0.0.5:9342/metrics ./ospf-monitor
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use ospf_monitor::aggregator::{Aggregator, ExporterSource};
use ospf_monitor::analysis::{self, Analyzer, BaselineAnalyzer};
use ospf_monitor::config::{default_config_with_env, load_config_with_env, Config};
use ospf_monitor::ipc::{IpcHandler, IpcServer, ServerControl};
use ospf_monitor::state::SharedState;

const DEFAULT_CONFIG_PATH: &str = "/etc/ospf-monitor/config.json";

/// Command-line arguments
struct Args {
    /// Configuration file path
    config_path: PathBuf,
    /// Whether `-c` was given
    config_explicit: bool,
    /// Generate default configuration
    generate_config: bool,
    /// Check configuration only
    check_config: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        let mut config_explicit = false;
        let mut generate_config = false;
        let mut check_config = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" | "--config" => {
                    if let Some(path) = args.next() {
                        config_path = PathBuf::from(path);
                        config_explicit = true;
                    }
                }
                "-g" | "--generate-config" => {
                    generate_config = true;
                }
                "--check" => {
                    check_config = true;
                }
                "-h" | "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "-v" | "--version" => {
                    println!("ospf-monitor v{}", ospf_monitor::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {arg}");
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        Self {
            config_path,
            config_explicit,
            generate_config,
            check_config,
        }
    }
}

fn print_help() {
    println!(
        r#"ospf-monitor v{}

Host-local OSPF state monitor with a Unix socket query interface.

USAGE:
    ospf-monitor [OPTIONS]

OPTIONS:
    -c, --config <PATH>     Configuration file path [default: {}]
    -g, --generate-config   Generate default configuration and exit
    --check                 Check configuration and exit
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT:
    OSPF_MONITOR_METRICS_URL     Override FRR metrics exporter URL
    OSPF_MONITOR_FRR_CONFIG      Override static FRR configuration path
    OSPF_MONITOR_IPC_SOCKET      Override IPC socket path
    OSPF_MONITOR_LOG_LEVEL       Override log level (trace, debug, info, warn, error)
    OSPF_MONITOR_POLL_INTERVAL   Override collection interval in seconds

If the default configuration file does not exist, built-in defaults are
used together with the environment overrides above.

EXAMPLE:
    OSPF_MONITOR_METRICS_URL=http://10.0.0.5:9342/metrics \
    OSPF_MONITOR_FRR_CONFIG=/etc/frr/frr-prod.conf \
        ospf-monitor

    ospf-query ospf neighbors
"#,
        ospf_monitor::VERSION,
        DEFAULT_CONFIG_PATH
    );
}

/// Initialize logging
fn init_logging(config: &Config) {
    let level = match config.log.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn", "tokio=warn"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.log.target);

    if config.log.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Load the configuration file, or defaults when the default file is absent
fn load_configuration(args: &Args) -> ospf_monitor::error::Result<Config> {
    if !args.config_explicit && !args.config_path.exists() {
        return Ok(default_config_with_env()?);
    }
    Ok(load_config_with_env(&args.config_path)?)
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Instant::now();

    let args = Args::parse();

    if args.generate_config {
        ospf_monitor::config::create_default_config(&args.config_path)?;
        println!("Generated default configuration at {:?}", args.config_path);
        return Ok(());
    }

    let config = load_configuration(&args)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config_path))?;

    if args.check_config {
        println!("Configuration is valid");
        return Ok(());
    }

    init_logging(&config);

    info!("ospf-monitor v{}", ospf_monitor::VERSION);
    if args.config_path.exists() {
        info!("Configuration loaded from {:?}", args.config_path);
    } else {
        info!("No configuration file, using defaults");
    }

    let state = Arc::new(SharedState::new());
    let shutdown = CancellationToken::new();

    // Collection loop
    let source = ExporterSource::new(
        config.aggregator.metrics_url.clone(),
        config.aggregator.request_timeout(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create metrics source: {}", e))?;
    let aggregator = Arc::new(Aggregator::new(
        Arc::new(source),
        &config.aggregator.frr_config_path,
        Arc::clone(&state),
    ));
    let aggregator_handle = tokio::spawn(
        Arc::clone(&aggregator).start_periodic(config.aggregator.poll_interval(), shutdown.child_token()),
    );

    // Analysis loop
    let analyzer: Arc<dyn Analyzer> = Arc::new(BaselineAnalyzer::new());
    let analyzer_handle = tokio::spawn(analysis::run_periodic(
        analyzer,
        Arc::clone(&state),
        config.analyzer.interval(),
        shutdown.child_token(),
    ));

    // IPC server
    let control = ServerControl::new(shutdown.child_token(), config.ipc.shutdown_grace());
    let ipc_handler = Arc::new(IpcHandler::new(Arc::clone(&state), control));
    let ipc_server = IpcServer::new(config.ipc.clone(), ipc_handler);
    let listener = ipc_server
        .bind()
        .map_err(|e| anyhow::anyhow!("Failed to start IPC server: {}", e))?;
    let mut ipc_handle = tokio::spawn(async move { ipc_server.serve(listener).await });

    info!(
        "Startup complete in {:.2}ms",
        start_time.elapsed().as_secs_f64() * 1000.0
    );

    tokio::select! {
        result = &mut ipc_handle => {
            if let Err(e) = result {
                error!("IPC server task failed: {}", e);
            } else {
                info!("IPC server stopped, exiting");
            }
        }
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, initiating shutdown...");
        }
        _ = wait_for_sigterm() => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    info!("Shutting down...");
    shutdown.cancel();

    let drain = async {
        let _ = aggregator_handle.await;
        let _ = analyzer_handle.await;
        if !ipc_handle.is_finished() {
            let _ = ipc_handle.await;
        }
    };
    if tokio::time::timeout(Duration::from_secs(5), drain).await.is_err() {
        warn!("Timed out waiting for background tasks");
    }

    info!(
        "Collection stats: {} succeeded, {} failed",
        aggregator.success_count(),
        aggregator.failure_count()
    );
    info!("Shutdown complete");

    Ok(())
}

/// Wait for SIGTERM signal
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to register SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    // On non-Unix platforms, just wait forever
    std::future::pending::<()>().await
}
