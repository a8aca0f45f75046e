use anyhow::Context;
use gantry::AppModule;
use gantry::kernel::config::load_config;
use gantry_logger::Logger;
use tracing::error;

#[gantry_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let result = async {
        let cfg = load_config(Some("server")).context("Critical: Configuration is malformed")?;
        gantry_server::bootstrap(cfg, AppModule::for_root()).await
    }
    .await;

    // Returning the error exits non-zero once the log guard has flushed.
    if let Err(err) = &result {
        error!("Server terminated: {err:#}");
    }
    result
}
