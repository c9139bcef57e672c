use std::sync::Arc;

use clap::Parser;

use weft::config::Config;
use weft::controller::build_from_conf;
use weft::logging;
use weft::service::HttpService;

#[derive(Debug, Parser)]
#[command(name = "weft", about = "HTTP server built from composable controllers")]
struct Opt {
    /// Path to the YAML configuration file
    #[arg(short = 'c', long = "conf")]
    conf: String,
}

#[tokio::main]
async fn main() {
    // Read command-line arguments
    let opt = Opt::parse();

    // Load configuration
    let config = Config::load_from_yaml(&opt.conf).expect("Failed to load configuration");

    // Initialize logging
    logging::init(&config.log);

    // Build the controller tree from configuration
    log::info!("Building controller tree...");
    let root = build_from_conf(config.controller).expect("Failed to build controller tree");

    let service = Arc::new(HttpService::new(root, config.run_mode));

    log::info!("Starting server...");
    let mut handles = Vec::with_capacity(config.listeners.len());
    for listener in &config.listeners {
        handles.push(tokio::spawn(service.clone().run(listener.address)));
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("Received ctrl-c, shutting down");
        }
        results = futures::future::join_all(handles) => {
            for result in results {
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => log::error!("listener failed: {e}"),
                    Err(e) => log::error!("listener task panicked: {e}"),
                }
            }
        }
    }
}
