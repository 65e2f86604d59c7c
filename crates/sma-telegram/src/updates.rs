use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use grammers_client::{
    types::{Chat, Message},
    Client, Update,
};

use sma_core::{ports::UpdateSource, Result};

use crate::TelegramMessenger;

/// New messages posted to the logged-in user's Saved Messages.
pub struct SavedMessagesUpdates {
    client: Client,
    me_id: i64,
    shutdown: CancellationToken,
}

impl SavedMessagesUpdates {
    pub fn new(client: Client, me_id: i64, shutdown: CancellationToken) -> Self {
        Self {
            client,
            me_id,
            shutdown,
        }
    }

    fn accepts(&self, message: &Message) -> bool {
        let chat = message.chat();
        accepts(
            message.forward_header().is_some(),
            matches!(chat, Chat::User(_)),
            chat.id(),
            self.me_id,
        )
    }
}

/// Only the user's own notes in Saved Messages are commands. Forwards are
/// skipped since search results land there too.
fn accepts(is_forward: bool, chat_is_user: bool, chat_id: i64, me_id: i64) -> bool {
    !is_forward && chat_is_user && chat_id == me_id
}

#[async_trait]
impl UpdateSource for SavedMessagesUpdates {
    async fn next_text(&mut self) -> Result<Option<String>> {
        loop {
            let update = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(None),
                update = self.client.next_update() => update.map_err(TelegramMessenger::map_err)?,
            };

            let Update::NewMessage(message) = update else {
                continue;
            };
            if !self.accepts(&message) {
                continue;
            }
            return Ok(Some(message.text().to_string()));
        }
    }
}
