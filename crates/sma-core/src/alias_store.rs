//! JSON file mapping alias names to channel references.
//!
//! The whole file is read on every command and rewritten on every mutation.
//! There is no locking: one agent process owns the file.

use std::{
    collections::BTreeMap,
    fmt,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{domain::ChannelPeer, errors::Error, Result};

/// Tag stored in the `type` field of an alias record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AliasKind {
    InputPeerChannel,
    /// Unknown tag, kept verbatim so a load/save cycle does not rewrite it.
    Other(String),
}

impl From<String> for AliasKind {
    fn from(s: String) -> Self {
        if s == "InputPeerChannel" {
            AliasKind::InputPeerChannel
        } else {
            AliasKind::Other(s)
        }
    }
}

impl From<AliasKind> for String {
    fn from(kind: AliasKind) -> Self {
        match kind {
            AliasKind::InputPeerChannel => "InputPeerChannel".to_string(),
            AliasKind::Other(s) => s,
        }
    }
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasKind::InputPeerChannel => f.write_str("InputPeerChannel"),
            AliasKind::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    #[serde(rename = "type")]
    pub kind: AliasKind,
    pub channel_id: i64,
    pub access_hash: i64,
    /// Cached at bind time; not refreshed afterwards.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
}

impl AliasEntry {
    pub fn channel(peer: ChannelPeer, title: impl Into<String>) -> Self {
        Self {
            kind: AliasKind::InputPeerChannel,
            channel_id: peer.channel_id,
            access_hash: peer.access_hash,
            title: title.into(),
        }
    }

    /// The addressable peer, if this entry is a channel binding.
    pub fn channel_peer(&self) -> Option<ChannelPeer> {
        match self.kind {
            AliasKind::InputPeerChannel => Some(ChannelPeer {
                channel_id: self.channel_id,
                access_hash: self.access_hash,
            }),
            AliasKind::Other(_) => None,
        }
    }
}

fn null_as_empty<'de, D>(de: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

pub type Aliases = BTreeMap<String, AliasEntry>;

#[derive(Clone, Debug)]
pub struct AliasStore {
    path: PathBuf,
}

impl AliasStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means no aliases yet.
    pub fn load(&self) -> Result<Aliases> {
        let txt = match std::fs::read_to_string(&self.path) {
            Ok(txt) => txt,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Aliases::new()),
            Err(e) => return Err(e.into()),
        };
        if txt.trim().is_empty() {
            return Ok(Aliases::new());
        }
        serde_json::from_str(&txt).map_err(|source| Error::AliasFile {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the whole file: temp file in the same directory, fsync, rename.
    pub fn save(&self, aliases: &Aliases) -> Result<()> {
        let mut txt = serde_json::to_string_pretty(aliases)?;
        txt.push('\n');

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("aliases.json");
        let tmp = parent.join(format!(".{file_name}.{}.tmp", std::process::id()));

        let write_tmp = || -> std::io::Result<()> {
            let mut f = std::fs::File::create(&tmp)?;
            f.write_all(txt.as_bytes())?;
            f.sync_all()
        };
        if let Err(e) = write_tmp().and_then(|_| std::fs::rename(&tmp, &self.path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), count = aliases.len(), "alias file written");
        Ok(())
    }
}
