//! Session bootstrap: connect with the session file, sign in interactively if needed.

use std::path::Path;

use anyhow::{anyhow, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use grammers_client::{Client, Config as ClientConfig, InitParams, SignInError};
use grammers_session::Session;

use sma_core::config::Config;

pub async fn connect(cfg: &Config) -> anyhow::Result<Client> {
    let session = Session::load_file_or_create(&cfg.session_file).with_context(|| {
        format!(
            "failed to open session file {}",
            cfg.session_file.display()
        )
    })?;

    let client = Client::connect(ClientConfig {
        session,
        api_id: cfg.api_id,
        api_hash: cfg.api_hash.clone(),
        params: InitParams::default(),
    })
    .await
    .map_err(|e| anyhow!("failed to connect to Telegram: {e}"))?;

    let authorized = client
        .is_authorized()
        .await
        .map_err(|e| anyhow!("failed to check authorization: {e}"))?;
    if !authorized {
        tracing::info!("session is not authorized, starting interactive sign-in");
        sign_in(&client, cfg).await?;
        save_session(&client, &cfg.session_file)?;
    }

    Ok(client)
}

pub fn save_session(client: &Client, path: &Path) -> anyhow::Result<()> {
    client
        .session()
        .save_to_file(path)
        .with_context(|| format!("failed to save session file {}", path.display()))
}

async fn sign_in(client: &Client, cfg: &Config) -> anyhow::Result<()> {
    let phone = match &cfg.phone {
        Some(phone) => phone.clone(),
        None => prompt("Phone number (international format): ").await?,
    };

    let token = client
        .request_login_code(&phone)
        .await
        .map_err(|e| anyhow!("failed to request login code: {e}"))?;
    let code = prompt("Login code: ").await?;

    match client.sign_in(&token, &code).await {
        Ok(_) => {}
        Err(SignInError::PasswordRequired(password_token)) => {
            let hint = password_token.hint().unwrap_or("none").to_string();
            let password =
                prompt(&format!("Two-step verification password (hint: {hint}): ")).await?;
            client
                .check_password(password_token, password.trim())
                .await
                .map_err(|e| anyhow!("two-step verification failed: {e}"))?;
        }
        Err(e) => return Err(anyhow!("sign-in failed: {e}")),
    }

    tracing::info!("signed in");
    Ok(())
}

async fn prompt(message: &str) -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(message.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    let n = BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read from stdin")?;
    if n == 0 {
        return Err(anyhow!("stdin closed during sign-in"));
    }
    Ok(line.trim().to_string())
}
