use async_trait::async_trait;

use crate::{
    domain::{ChannelPeer, Dialog, InputPeer, MessageId},
    Result,
};

/// Capabilities of the messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessengerCapabilities {
    pub max_message_len: usize,
}

/// Hexagonal port over the Telegram user client.
///
/// Every reply and every forwarded message goes to the logged-in user's own
/// saved-messages chat, so no destination is passed around.
#[async_trait]
pub trait MessengerPort: Send + Sync {
    fn capabilities(&self) -> MessengerCapabilities;

    /// Most recent conversations first, at most `limit`.
    async fn recent_dialogs(&self, limit: usize) -> Result<Vec<Dialog>>;

    async fn resolve_input_peer(&self, dialog: &Dialog) -> Result<InputPeer>;

    async fn send_to_saved(&self, text: &str) -> Result<()>;

    /// Keyword search inside a channel, yielding at most `limit` hits.
    async fn search_messages(
        &self,
        peer: ChannelPeer,
        query: &str,
        limit: usize,
    ) -> Result<Box<dyn MessageCursor>>;

    async fn forward_to_saved(&self, from: ChannelPeer, message: MessageId) -> Result<()>;
}

/// Lazily fetched search results.
#[async_trait]
pub trait MessageCursor: Send {
    async fn next(&mut self) -> Result<Option<MessageId>>;
}

/// Inbound texts posted to the saved-messages chat, in arrival order.
#[async_trait]
pub trait UpdateSource: Send {
    /// `None` once the source is closed (disconnect or shutdown).
    async fn next_text(&mut self) -> Result<Option<String>>;
}
