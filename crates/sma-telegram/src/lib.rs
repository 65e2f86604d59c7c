//! Telegram adapter (grammers, MTProto user client).
//!
//! This crate implements the `sma-core` ports over a logged-in user account.
//! Replies and forwards always target that account's own Saved Messages chat.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use grammers_client::{types::Chat, Client};
use grammers_session::{PackedChat, PackedType};
use grammers_tl_types as tl;

pub mod login;
pub mod router;
pub mod updates;

use sma_core::{
    domain::{ChannelPeer, Dialog, DialogKind, InputPeer, MessageId},
    errors::Error,
    ports::{MessageCursor, MessengerCapabilities, MessengerPort},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    client: Client,
    saved: PackedChat,
    max_message_len: usize,
}

impl TelegramMessenger {
    /// `saved` is the packed chat of the logged-in user (their Saved Messages).
    pub fn new(client: Client, saved: PackedChat, max_message_len: usize) -> Self {
        Self {
            client,
            saved,
            max_message_len,
        }
    }

    pub(crate) fn map_err(e: impl std::fmt::Display) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

fn dialog_kind(ty: PackedType) -> DialogKind {
    match ty {
        PackedType::Broadcast => DialogKind::Broadcast,
        PackedType::Megagroup | PackedType::Gigagroup => DialogKind::Supergroup,
        PackedType::Chat => DialogKind::Group,
        PackedType::User => DialogKind::User,
        PackedType::Bot => DialogKind::Bot,
    }
}

fn packed_type(kind: DialogKind) -> PackedType {
    match kind {
        DialogKind::Broadcast => PackedType::Broadcast,
        DialogKind::Supergroup => PackedType::Megagroup,
        DialogKind::Group => PackedType::Chat,
        DialogKind::User => PackedType::User,
        DialogKind::Bot => PackedType::Bot,
    }
}

fn to_dialog(chat: &Chat) -> Dialog {
    let packed = chat.pack();
    Dialog {
        id: chat.id(),
        title: chat.name().to_string(),
        username: chat.username().map(|s| s.to_string()),
        kind: dialog_kind(packed.ty),
        access_hash: packed.access_hash,
    }
}

fn to_input_peer(peer: tl::enums::InputPeer) -> InputPeer {
    match peer {
        tl::enums::InputPeer::Channel(c) => InputPeer::Channel(ChannelPeer {
            channel_id: c.channel_id,
            access_hash: c.access_hash,
        }),
        tl::enums::InputPeer::User(u) => InputPeer::User {
            user_id: u.user_id,
            access_hash: u.access_hash,
        },
        tl::enums::InputPeer::Chat(c) => InputPeer::Chat { chat_id: c.chat_id },
        other => {
            let debug = format!("{other:?}");
            let variant = debug
                .split(|c: char| !c.is_alphanumeric())
                .next()
                .unwrap_or_default();
            InputPeer::Unsupported(format!("InputPeer{variant}"))
        }
    }
}

fn channel_chat(peer: ChannelPeer) -> PackedChat {
    // Broadcast and megagroup pack to the same InputPeerChannel.
    PackedChat {
        ty: PackedType::Broadcast,
        id: peer.channel_id,
        access_hash: Some(peer.access_hash),
    }
}

#[async_trait]
impl MessengerPort for TelegramMessenger {
    fn capabilities(&self) -> MessengerCapabilities {
        MessengerCapabilities {
            max_message_len: self.max_message_len,
        }
    }

    async fn recent_dialogs(&self, limit: usize) -> Result<Vec<Dialog>> {
        let mut iter = self.client.iter_dialogs().limit(limit);
        let mut out = Vec::new();
        while let Some(dialog) = iter.next().await.map_err(Self::map_err)? {
            out.push(to_dialog(dialog.chat()));
        }
        Ok(out)
    }

    async fn resolve_input_peer(&self, dialog: &Dialog) -> Result<InputPeer> {
        // A channel seen without its access hash cannot be addressed later.
        if dialog.kind.is_channel_like() && dialog.access_hash.is_none() {
            return Ok(InputPeer::Unsupported(
                "InputPeerChannel (no access hash)".to_string(),
            ));
        }
        let packed = PackedChat {
            ty: packed_type(dialog.kind),
            id: dialog.id,
            access_hash: dialog.access_hash,
        };
        Ok(to_input_peer(packed.to_input_peer()))
    }

    async fn send_to_saved(&self, text: &str) -> Result<()> {
        self.client
            .send_message(self.saved, text)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn search_messages(
        &self,
        peer: ChannelPeer,
        query: &str,
        limit: usize,
    ) -> Result<Box<dyn MessageCursor>> {
        let iter = self
            .client
            .search_messages(channel_chat(peer))
            .query(query)
            .limit(limit);

        let hits = futures::stream::unfold(Some(iter), |state| async move {
            let mut iter = state?;
            match iter.next().await {
                Ok(Some(message)) => Some((Ok(MessageId(message.id())), Some(iter))),
                Ok(None) => None,
                Err(e) => Some((Err(Self::map_err(e)), None)),
            }
        });

        Ok(Box::new(SearchCursor {
            hits: Box::pin(hits),
        }))
    }

    async fn forward_to_saved(&self, from: ChannelPeer, message: MessageId) -> Result<()> {
        self.client
            .forward_messages(self.saved, &[message.0], channel_chat(from))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

struct SearchCursor {
    hits: Pin<Box<dyn Stream<Item = Result<MessageId>> + Send>>,
}

#[async_trait]
impl MessageCursor for SearchCursor {
    async fn next(&mut self) -> Result<Option<MessageId>> {
        self.hits.next().await.transpose()
    }
}
