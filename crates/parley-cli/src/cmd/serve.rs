use anyhow::Context;
use parley_core::config::Config;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, open: bool) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(root).context("failed to load config")?;
    if let Some(port) = port {
        config.server.port = port;
    }
    for warning in config.validate() {
        tracing::warn!("config: {}", warning.message);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(parley_server::serve(config, open))
}
