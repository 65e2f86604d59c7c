/// Telegram message id (numeric, unique within its chat).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// Kind of a conversation as reported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DialogKind {
    /// Broadcast channel.
    Broadcast,
    /// Supergroup (megagroup or gigagroup).
    Supergroup,
    /// Basic group.
    Group,
    User,
    Bot,
}

impl DialogKind {
    /// Only channels and supergroups can be listed and bound.
    pub fn is_channel_like(self) -> bool {
        matches!(self, DialogKind::Broadcast | DialogKind::Supergroup)
    }

    pub fn label(self) -> &'static str {
        match self {
            DialogKind::Broadcast => "channel",
            DialogKind::Supergroup => "supergroup",
            DialogKind::Group => "group",
            DialogKind::User => "user",
            DialogKind::Bot => "bot",
        }
    }
}

/// One recent conversation, as returned by [`crate::ports::MessengerPort::recent_dialogs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialog {
    pub id: i64,
    pub title: String,
    pub username: Option<String>,
    pub kind: DialogKind,
    /// Credential the client holds for this conversation, if any.
    pub access_hash: Option<i64>,
}

impl Dialog {
    /// Lowercased `"{title} {username}"`, used by the listing filter.
    pub fn haystack(&self) -> String {
        format!("{} {}", self.title, self.username.as_deref().unwrap_or("")).to_lowercase()
    }
}

/// Addressable channel reference (id + access credential).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelPeer {
    pub channel_id: i64,
    pub access_hash: i64,
}

/// Addressable form of a conversation, including the credential needed to act on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputPeer {
    Channel(ChannelPeer),
    User { user_id: i64, access_hash: i64 },
    Chat { chat_id: i64 },
    /// Any other peer form the client may produce, named by its type.
    Unsupported(String),
}

impl InputPeer {
    pub fn type_name(&self) -> &str {
        match self {
            InputPeer::Channel(_) => "InputPeerChannel",
            InputPeer::User { .. } => "InputPeerUser",
            InputPeer::Chat { .. } => "InputPeerChat",
            InputPeer::Unsupported(name) => name,
        }
    }
}
