use std::sync::Arc;

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;

use sma_core::{agent::Agent, alias_store::AliasStore, config::Config, dispatch};

use crate::{login, updates::SavedMessagesUpdates, TelegramMessenger};

/// Connect, announce readiness in Saved Messages and serve commands until Ctrl-C.
pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let client = login::connect(&cfg).await?;

    let me = client
        .get_me()
        .await
        .map_err(|e| anyhow!("failed to fetch own account: {e}"))?;
    tracing::info!(
        user_id = me.id(),
        username = me.username().unwrap_or("-"),
        session = %cfg.session_file.display(),
        aliases = %cfg.alias_file.display(),
        "agent started"
    );

    let messenger = Arc::new(TelegramMessenger::new(
        client.clone(),
        me.pack(),
        cfg.message_limit,
    ));
    let mut agent = Agent::new(messenger, AliasStore::new(cfg.alias_file.clone()));
    agent.announce_ready().await?;

    let shutdown = CancellationToken::new();
    spawn_interrupt_watcher(shutdown.clone());

    let mut updates = SavedMessagesUpdates::new(client.clone(), me.id(), shutdown);
    let result = dispatch::run(&mut agent, &mut updates).await;

    let saved = login::save_session(&client, &cfg.session_file);
    finish(result, saved)?;
    tracing::info!("agent stopped");
    Ok(())
}

/// The dispatch error wins; a failed session save alone is still an error.
fn finish(result: sma_core::Result<()>, saved: anyhow::Result<()>) -> anyhow::Result<()> {
    match (result, saved) {
        (Err(e), Err(save_err)) => {
            tracing::warn!(error = %format!("{save_err:#}"), "session save failed");
            Err(e.into())
        }
        (Err(e), Ok(())) => Err(e.into()),
        (Ok(()), saved) => saved,
    }
}

/// First Ctrl-C: stop after the running command. Second: exit at once.
fn spawn_interrupt_watcher(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::info!("interrupt received, stopping after the current command");
        shutdown.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("second interrupt, exiting");
            std::process::exit(130);
        }
    });
}
