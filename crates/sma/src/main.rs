use std::sync::Arc;

use sma_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), sma_core::Error> {
    sma_core::logging::init("sma")?;

    let cfg = Arc::new(Config::load()?);

    sma_telegram::router::run(cfg)
        .await
        .map_err(|e| sma_core::Error::External(format!("saved-messages agent failed: {e:#}")))?;

    Ok(())
}
