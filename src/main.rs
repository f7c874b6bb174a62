//! Pool Admission - ManagedMachinePool defaulting and validating webhook

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kube::CustomResourceExt;

use pool_admission::admission::PoolAdmission;
use pool_admission::config::ServerConfig;
use pool_admission::crd::ManagedMachinePool;
use pool_admission::telemetry::{init_telemetry, LogFormat, TelemetryConfig};
use pool_admission::webhook::{serve, webhook_router, WebhookState};
use pool_admission::DEFAULT_WEBHOOK_ADDR;

/// Pool Admission - defaulting and validating webhook for ManagedMachinePools
#[derive(Parser, Debug)]
#[command(name = "pool-admission", version, about, long_about = None)]
struct Cli {
    /// Generate the ManagedMachinePool CRD manifest and exit
    #[arg(long)]
    crd: bool,

    /// Address the webhook listens on
    #[arg(long, env = "POOL_ADMISSION_ADDR", default_value = DEFAULT_WEBHOOK_ADDR)]
    addr: SocketAddr,

    /// PEM certificate chain for HTTPS
    #[arg(long, env = "POOL_ADMISSION_TLS_CERT")]
    tls_cert: Option<PathBuf>,

    /// PEM private key for HTTPS
    #[arg(long, env = "POOL_ADMISSION_TLS_KEY")]
    tls_key: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "POOL_ADMISSION_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.crd {
        let crd = serde_yaml::to_string(&ManagedMachinePool::crd())
            .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
        println!("{crd}");
        return Ok(());
    }

    // Install crypto provider - FIPS-validated aws-lc-rs
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: Failed to install crypto provider: {:?}", e);
        std::process::exit(1);
    }

    init_telemetry(TelemetryConfig {
        format: cli.log_format,
        ..Default::default()
    })?;

    let config = ServerConfig::new(cli.addr, cli.tls_cert, cli.tls_key)?;

    let router = webhook_router(Arc::new(WebhookState::new(PoolAdmission::new())));

    tracing::info!(tls = config.tls.is_some(), "Pool admission webhook starting");
    serve(&config, router).await?;
    tracing::info!("Pool admission webhook stopped");

    Ok(())
}
