use clap::Parser;
use ferrous_forwarder_domain::CliOverrides;
use ferrous_forwarder_jobs::ShutdownSignal;
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ferrous-forwarder")]
#[command(version)]
#[command(about = "Ferrous Forwarder - caching DNS forwarder with hosts overrides")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS listening port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        port: cli.port,
        bind_address: cli.bind,
        log_level: cli.log_level,
    };
    let (config, notes) = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);
    for note in &notes {
        info!(note = %note, "Configuration adjusted");
    }

    info!("Starting Ferrous Forwarder v{}", env!("CARGO_PKG_VERSION"));

    let services = di::DnsServices::new(&config)?;

    let signal = ShutdownSignal::new();
    let jobs = services
        .job_runner(&config)
        .with_shutdown_signal(signal.clone())
        .start()?;

    let bind_addr = bootstrap::bind_address(&config.server)?;
    let workers = server::start_dns_server(
        bind_addr,
        services.dispatcher.clone(),
        &config.server,
        signal,
    )?;

    for worker in workers {
        if worker.join().is_err() {
            error!("DNS worker panicked");
        }
    }

    jobs.shutdown();
    if let Some(cache) = &services.cache {
        if let Err(e) = cache.flush() {
            warn!(error = %e, "Failed to flush record cache");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
