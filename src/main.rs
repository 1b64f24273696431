use std::sync::Arc;

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use triad_gateway::{
    adapters::{HttpClientAdapter, HttpHandler},
    config::{GatewayConfig, GatewayConfigValidator, load_config},
    core::{GatewayService, RetryPolicy},
    ports::http_client::HttpClient,
    tracing_setup::{self, LogFormat},
    utils::graceful_shutdown::GracefulShutdown,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    /// Optional config file (TOML, YAML or JSON); environment variables win
    #[clap(short, long, global = true)]
    config: Option<String>,

    /// Log output format: json or pretty
    #[clap(long, default_value = "json", global = true)]
    log_format: LogFormat,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Start the gateway server (default)
    Serve,
    /// Load and validate configuration, then exit
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    if let Some(Commands::Validate) = args.command {
        return validate_config_command(args.config.as_deref());
    }

    tracing_setup::init_tracing(args.log_format)
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Err(e) = GatewayConfigValidator::validate(&config) {
        tracing::error!("Configuration validation failed: {}", e);
        return Err(eyre!("Invalid configuration: {}", e));
    }

    let http_client: Arc<dyn HttpClient> =
        Arc::new(HttpClientAdapter::new().context("Failed to create HTTP client adapter")?);
    let gateway_service = Arc::new(GatewayService::new(&config, http_client));
    log_config(&config, gateway_service.dispatcher().policy());
    for route in gateway_service.routes().routes() {
        tracing::debug!(
            "Route {} {} -> {} {}",
            route.method(),
            route.path(),
            route.target().method(),
            route.target().url()
        );
    }

    let app = HttpHandler::new(gateway_service).router(config.cors_enabled);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    tracing::info!("Gateway listening on {}", listener.local_addr()?);

    let shutdown = GracefulShutdown::new();
    let signal_handler = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = shutdown.run_signal_handler().await {
                tracing::error!("Signal handler error: {}", e);
            }
        })
    };

    let shutdown_signal = {
        let shutdown = shutdown.clone();
        async move {
            let reason = shutdown.wait_for_shutdown_signal().await;
            tracing::info!("Stopping listener ({:?}), draining in-flight requests", reason);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    signal_handler.abort();
    tracing::info!("Gateway shut down");
    Ok(())
}

fn log_config(config: &GatewayConfig, policy: &RetryPolicy) {
    tracing::info!(
        listen_addr = %config.listen_addr,
        stack_url = %config.stack_url,
        linkedlist_url = %config.linkedlist_url,
        graph_url = %config.graph_url,
        timeout = ?policy.timeout_per_attempt(),
        retry_attempts = policy.max_attempts(),
        retry_base_sleep = ?policy.base_delay(),
        cors_enabled = config.cors_enabled,
        "Gateway configuration loaded"
    );
    tracing::info!(
        "Worst-case upstream latency per request: {:?}",
        policy.worst_case_latency()
    );
}

/// Load configuration from the environment (and optional file) and validate it.
fn validate_config_command(config_path: Option<&str>) -> Result<()> {
    match config_path {
        Some(path) => println!("🔍 Validating configuration (file: {path}, plus environment)"),
        None => println!("🔍 Validating configuration from environment"),
    }

    let config = match load_config(config_path) {
        Ok(config) => {
            println!("✅ Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("❌ Configuration parsing failed:");
            eprintln!("   {e:#}");
            std::process::exit(1);
        }
    };

    match GatewayConfigValidator::validate(&config) {
        Ok(()) => {
            println!("✅ Configuration validation: OK");
            println!();
            println!("📋 Configuration Summary:");
            println!("   • Listen Address: {}", config.listen_addr);
            println!("   • Stack service: {}", config.stack_url);
            println!("   • LinkedList service: {}", config.linkedlist_url);
            println!("   • Graph service: {}", config.graph_url);
            println!(
                "   • Timeout / attempts / base sleep: {}s / {} / {}s",
                config.upstream_timeout_seconds,
                config.upstream_retry_attempts,
                config.upstream_retry_base_sleep
            );
            println!("   • CORS Enabled: {}", config.cors_enabled);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("{e}");
            println!();
            println!("💡 Common fixes:");
            println!("   • Set STACK_URL, LINKEDLIST_URL and GRAPH_URL");
            println!("   • Ensure all URLs start with http:// or https://");
            println!("   • Verify listen address format (e.g., '0.0.0.0:5000')");
            std::process::exit(1);
        }
    }
}
