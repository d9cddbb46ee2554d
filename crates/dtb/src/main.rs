use std::sync::Arc;

use dtb_core::{config::Config, store::TodoStore, todo::TodoRegistry};

#[tokio::main]
async fn main() -> Result<(), dtb_core::Error> {
    let cfg = Arc::new(Config::load()?);
    dtb_core::logging::init("dtb", cfg.log_file.as_deref())?;

    let registry = Arc::new(TodoRegistry::open(TodoStore::new(
        cfg.todo_data_file.clone(),
    ))?);

    dtb_discord::router::run_gateway(cfg, registry)
        .await
        .map_err(|e| dtb_core::Error::External(format!("discord bot failed: {e:#}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
