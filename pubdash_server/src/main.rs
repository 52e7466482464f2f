use std::process::ExitCode;

use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tracing::{error, info};

use pubdash_server::{app, AccessGate, AppState, Args, ConfigError, Credentials};
use pubstats::DataCache;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ConfigError> {
    let tls = args.tls_pair()?;
    let gate = match &args.secrets {
        Some(path) => Some(AccessGate::new(Credentials::read(path)?)),
        None => {
            info!("no secrets file given, serving without login");
            None
        }
    };

    let cache = DataCache::new(&args.data, args.optimize_options());
    let table = cache.get()?;
    let state = AppState::new(table, gate, args.chart_colors());
    let app = app(state);

    match tls {
        Some((cert, key)) => {
            let config = RustlsConfig::from_pem_file(cert, key).await?;
            info!("listening on https://{}", args.addr);
            axum_server::bind_rustls(args.addr, config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!("listening on http://{}", args.addr);
            axum_server::bind(args.addr)
                .serve(app.into_make_service())
                .await?;
        }
    }
    Ok(())
}
