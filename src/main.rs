use std::process::ExitCode;
use std::sync::Arc;

use storage_crab_desktop::api::ApiClient;
use storage_crab_desktop::app::console::{self, ConsolePresenter};
use storage_crab_desktop::app::{App, AppEvent};
use storage_crab_desktop::config::Config;

mod cli {
    use clap::Parser;

    #[derive(Parser, Debug)]
    #[command(name = "storage-crab-desktop", version, about = "Storage Crab desktop client")]
    pub struct Args {
        /// Base URL of the Storage Crab API (overrides STORAGE_CRAB_API_URL)
        #[arg(long)]
        pub api_url: Option<String>,

        /// Seconds between background token refreshes
        /// (overrides STORAGE_CRAB_REFRESH_INTERVAL_SECS)
        #[arg(long)]
        pub refresh_interval_secs: Option<u64>,
    }
}

fn main() -> ExitCode {
    // Load .env from the working directory if present
    let _ = dotenvy::dotenv();

    env_logger::init();
    log::info!("Storage Crab Desktop starting...");

    let args = {
        use clap::Parser;
        cli::Args::parse()
    };

    let config = match Config::from_env()
        .and_then(|c| c.with_overrides(args.api_url, args.refresh_interval_secs))
    {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Using API at {} (token refresh every {}s)",
        config.api_base_url,
        config.refresh_interval.as_secs()
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config));

    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();
    log::info!("Storage Crab Desktop exited");
    ExitCode::SUCCESS
}

async fn run(config: Config) {
    let transport = Arc::new(ApiClient::new(
        config.request_timeout,
        config.connect_timeout,
    ));
    let mut app = App::new(transport, &config, ConsolePresenter::stdout());

    console::spawn_line_reader(tokio::io::stdin(), app.sender());

    let shutdown = app.sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, closing");
            let _ = shutdown.send(AppEvent::Shutdown);
        }
    });

    app.run().await;
}
