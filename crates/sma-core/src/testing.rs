//! In-memory port implementations for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    domain::{ChannelPeer, Dialog, DialogKind, InputPeer, MessageId},
    ports::{MessageCursor, MessengerCapabilities, MessengerPort, UpdateSource},
    Result,
};

/// Dialog whose access hash is `id * 1000`.
pub(crate) fn dialog(id: i64, title: &str, username: Option<&str>, kind: DialogKind) -> Dialog {
    Dialog {
        id,
        title: title.to_string(),
        username: username.map(|s| s.to_string()),
        kind,
        access_hash: Some(id * 1000),
    }
}

pub(crate) struct FakeMessenger {
    max_message_len: Mutex<usize>,
    dialogs: Mutex<Vec<Dialog>>,
    peer_overrides: Mutex<HashMap<i64, InputPeer>>,
    hits: Mutex<HashMap<(i64, String), Vec<i32>>>,
    sent: Mutex<Vec<String>>,
    forwarded: Mutex<Vec<(ChannelPeer, MessageId)>>,
    dialog_requests: Mutex<Vec<usize>>,
    resolve_requests: Mutex<Vec<i64>>,
    search_requests: Mutex<Vec<(i64, String, usize)>>,
}

impl FakeMessenger {
    pub(crate) fn with_dialogs(dialogs: Vec<Dialog>) -> Self {
        Self {
            max_message_len: Mutex::new(4096),
            dialogs: Mutex::new(dialogs),
            peer_overrides: Mutex::default(),
            hits: Mutex::default(),
            sent: Mutex::default(),
            forwarded: Mutex::default(),
            dialog_requests: Mutex::default(),
            resolve_requests: Mutex::default(),
            search_requests: Mutex::default(),
        }
    }

    pub(crate) fn set_max_message_len(&self, len: usize) {
        *self.max_message_len.lock().unwrap() = len;
    }

    pub(crate) fn rename_dialog(&self, id: i64, title: &str) {
        for d in self.dialogs.lock().unwrap().iter_mut() {
            if d.id == id {
                d.title = title.to_string();
            }
        }
    }

    pub(crate) fn override_peer(&self, dialog_id: i64, peer: InputPeer) {
        self.peer_overrides.lock().unwrap().insert(dialog_id, peer);
    }

    pub(crate) fn set_hits(&self, channel_id: i64, query: &str, ids: Vec<i32>) {
        self.hits
            .lock()
            .unwrap()
            .insert((channel_id, query.to_string()), ids);
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn forwarded(&self) -> Vec<(ChannelPeer, MessageId)> {
        self.forwarded.lock().unwrap().clone()
    }

    pub(crate) fn dialog_requests(&self) -> Vec<usize> {
        self.dialog_requests.lock().unwrap().clone()
    }

    pub(crate) fn resolve_requests(&self) -> Vec<i64> {
        self.resolve_requests.lock().unwrap().clone()
    }

    pub(crate) fn search_requests(&self) -> Vec<(i64, String, usize)> {
        self.search_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessengerPort for FakeMessenger {
    fn capabilities(&self) -> MessengerCapabilities {
        MessengerCapabilities {
            max_message_len: *self.max_message_len.lock().unwrap(),
        }
    }

    async fn recent_dialogs(&self, limit: usize) -> Result<Vec<Dialog>> {
        self.dialog_requests.lock().unwrap().push(limit);
        Ok(self
            .dialogs
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn resolve_input_peer(&self, dialog: &Dialog) -> Result<InputPeer> {
        self.resolve_requests.lock().unwrap().push(dialog.id);
        if let Some(peer) = self.peer_overrides.lock().unwrap().get(&dialog.id) {
            return Ok(peer.clone());
        }
        Ok(match (dialog.kind, dialog.access_hash) {
            (DialogKind::Broadcast | DialogKind::Supergroup, Some(access_hash)) => {
                InputPeer::Channel(ChannelPeer {
                    channel_id: dialog.id,
                    access_hash,
                })
            }
            (DialogKind::User | DialogKind::Bot, Some(access_hash)) => InputPeer::User {
                user_id: dialog.id,
                access_hash,
            },
            (DialogKind::Group, _) => InputPeer::Chat { chat_id: dialog.id },
            _ => InputPeer::Unsupported("InputPeerEmpty".to_string()),
        })
    }

    async fn send_to_saved(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn search_messages(
        &self,
        peer: ChannelPeer,
        query: &str,
        limit: usize,
    ) -> Result<Box<dyn MessageCursor>> {
        self.search_requests
            .lock()
            .unwrap()
            .push((peer.channel_id, query.to_string(), limit));
        let ids = self
            .hits
            .lock()
            .unwrap()
            .get(&(peer.channel_id, query.to_string()))
            .cloned()
            .unwrap_or_default();
        // Deliberately ignores `limit`: the agent must bound iteration itself.
        Ok(Box::new(FakeCursor {
            ids: ids.into_iter().map(MessageId).collect(),
        }))
    }

    async fn forward_to_saved(&self, from: ChannelPeer, message: MessageId) -> Result<()> {
        self.forwarded.lock().unwrap().push((from, message));
        Ok(())
    }
}

struct FakeCursor {
    ids: VecDeque<MessageId>,
}

#[async_trait]
impl MessageCursor for FakeCursor {
    async fn next(&mut self) -> Result<Option<MessageId>> {
        Ok(self.ids.pop_front())
    }
}

/// Update source replaying a fixed list of texts, then closing.
pub(crate) struct ScriptedUpdates {
    texts: VecDeque<String>,
}

impl ScriptedUpdates {
    pub(crate) fn new(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.texts.len()
    }
}

#[async_trait]
impl UpdateSource for ScriptedUpdates {
    async fn next_text(&mut self) -> Result<Option<String>> {
        Ok(self.texts.pop_front())
    }
}
