//! Binary entrypoint for the simple submit rules API server.
use simple_submit_api::{config::ServerConfig, run, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init();

    // SIMPLE_SUBMIT_CONFIG names the YAML config, SIMPLE_SUBMIT_ADDR overrides its address
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid server configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
