use eyre::{Context, Result};
use ragline::agent::RagAgent;
use ragline::backend::new_backend;
use ragline::cli::Command;
use ragline::config::init_logger;
use ragline::storage::new_log_store;

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Command::new();
    if cmd.version() {
        cmd.print_version();
        return Ok(());
    }

    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let config = cmd.get_config()?;
    init_logger(&config.log)?;

    let storage = new_log_store(&config.storage)
        .await
        .wrap_err("initializing storage")?;
    log::debug!("Storage initialized");

    let backend = new_backend(&config.backend)
        .await
        .wrap_err("initializing backend")?;

    let mut agent = RagAgent::new(storage).with_history_limit(config.agent.history_limit);
    if let Some(system_prompt) = &config.agent.system_prompt {
        agent = agent.with_system_prompt(system_prompt);
    }

    match backend {
        Some(backend) => {
            let model = config.backend.default_model.clone().ok_or_else(|| {
                eyre::eyre!("backend.default_model must be set when a connection is enabled")
            })?;
            if let Err(err) = backend.health_check().await {
                log::warn!("Backend health check failed: {:?}", err);
            }
            agent = agent.with_backend(backend).with_model(model);
        }
        None => {
            log::warn!("No backend connection enabled; replies will use the fallback response");
        }
    }

    ragline::app::run(agent).await
}
