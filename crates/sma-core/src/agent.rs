//! Command handlers for the saved-messages agent.
//!
//! The agent owns the alias store handle and the listing cache. Commands run
//! one at a time through `&mut self`, so neither needs a lock.

use std::sync::Arc;

use crate::{
    alias_store::{AliasEntry, AliasStore},
    commands::{self, Command},
    domain::{ChannelPeer, Dialog, InputPeer},
    formatting::split_message,
    ports::MessengerPort,
    Result,
};

/// How many recent dialogs are fetched per listing.
pub const DIALOG_FETCH_LIMIT: usize = 400;
/// How many entries a listing shows (and caches for `/bind`).
pub const LISTING_CAP: usize = 40;
/// Upper bound on forwarded messages per search.
pub const SEARCH_CAP: u64 = 50;

pub const READY_NOTICE: &str = "Agent ready. Send /help to see the commands.";

const HELP_TEXT: &str = "Commands:\n\
/channels [filter] -> list recent channels and supergroups (\"contains\" filter).\n\
/bind N alias=name -> save item N of the last listing as an alias.\n\
/aliases -> list saved aliases.\n\
/delalias name -> delete an alias.\n\
/search alias \"text\" N -> search and forward up to N results to Saved Messages.\n\
\n\
Example:\n\
/channels kubernetes\n\
/bind 3 alias=k8s\n\
/search k8s \"error 500\" 5";

/// Result of the last `/channels`, addressed by 1-based index.
#[derive(Debug, Default)]
pub struct ListingCache {
    generation: u64,
    entries: Vec<Dialog>,
}

impl ListingCache {
    /// Drop the current listing; every index becomes stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.entries.clear();
    }

    pub fn replace(&mut self, entries: Vec<Dialog>) {
        self.clear();
        self.entries = entries;
    }

    pub fn get(&self, index: i64) -> Option<&Dialog> {
        let pos = usize::try_from(index.checked_sub(1)?).ok()?;
        self.entries.get(pos)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Agent {
    messenger: Arc<dyn MessengerPort>,
    store: AliasStore,
    listing: ListingCache,
}

impl Agent {
    pub fn new(messenger: Arc<dyn MessengerPort>, store: AliasStore) -> Self {
        Self {
            messenger,
            store,
            listing: ListingCache::default(),
        }
    }

    pub fn listing(&self) -> &ListingCache {
        &self.listing
    }

    pub fn store(&self) -> &AliasStore {
        &self.store
    }

    pub async fn announce_ready(&self) -> Result<()> {
        self.reply(READY_NOTICE).await
    }

    /// Handle one saved-messages text. Returns `false` if it was not a command.
    pub async fn handle_text(&mut self, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let Some(cmd) = commands::parse(text) else {
            tracing::trace!("ignoring non-command text");
            return Ok(false);
        };

        tracing::info!(command = cmd.name(), "handling command");
        self.execute(cmd).await?;
        Ok(true)
    }

    pub async fn execute(&mut self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Help => self.reply(HELP_TEXT).await,
            Command::ListChannels { filter } => self.list_channels(filter.as_deref()).await,
            Command::Bind { index, alias } => self.bind(index, &alias).await,
            Command::ListAliases => self.list_aliases().await,
            Command::DeleteAlias { alias } => self.delete_alias(&alias).await,
            Command::Search {
                alias,
                query,
                count,
            } => self.search(&alias, &query, count).await,
        }
    }

    async fn reply(&self, text: &str) -> Result<()> {
        let limit = self.messenger.capabilities().max_message_len;
        for chunk in split_message(text, limit) {
            self.messenger.send_to_saved(&chunk).await?;
        }
        Ok(())
    }

    async fn list_channels(&mut self, filter: Option<&str>) -> Result<()> {
        let filter = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());

        self.listing.clear();

        // Client order is most-recent-first; keep it.
        let dialogs = self.messenger.recent_dialogs(DIALOG_FETCH_LIMIT).await?;
        let total = dialogs.len();
        let items: Vec<Dialog> = dialogs
            .into_iter()
            .filter(|d| d.kind.is_channel_like())
            .filter(|d| filter.as_deref().map_or(true, |f| d.haystack().contains(f)))
            .take(LISTING_CAP)
            .collect();

        tracing::info!(dialogs = total, listed = items.len(), "channel listing");

        if items.is_empty() {
            return self
                .reply("No results. Try another filter or run /channels without one.")
                .await;
        }

        let lines = items
            .iter()
            .enumerate()
            .map(|(i, d)| {
                format!("{}. [{}] {} (id={})", i + 1, d.kind.label(), d.title, d.id)
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.listing.replace(items);
        self.reply(&format!("Pick one with /bind N alias=name\n\n{lines}"))
            .await
    }

    async fn bind(&mut self, index: i64, alias: &str) -> Result<()> {
        let Some(dialog) = self.listing.get(index).cloned() else {
            return self
                .reply("Invalid index or stale list. Run /channels again.")
                .await;
        };

        let peer: ChannelPeer = match self.messenger.resolve_input_peer(&dialog).await? {
            InputPeer::Channel(peer) => peer,
            other => {
                return self
                    .reply(&format!(
                        "This chat is not an InputPeerChannel (type={}).",
                        other.type_name()
                    ))
                    .await;
            }
        };

        let mut aliases = self.store.load()?;
        let entry = AliasEntry::channel(peer, dialog.title.clone());
        let reply = format!(
            "Saved alias '{alias}' -> {} (channel_id={}).",
            entry.title, entry.channel_id
        );
        aliases.insert(alias.to_string(), entry);
        self.store.save(&aliases)?;

        tracing::info!(alias, channel_id = peer.channel_id, "alias bound");
        self.reply(&reply).await
    }

    async fn list_aliases(&self) -> Result<()> {
        let aliases = self.store.load()?;
        if aliases.is_empty() {
            return self.reply("No aliases yet. Use /channels and /bind.").await;
        }

        let mut entries: Vec<_> = aliases.iter().collect();
        entries.sort_by_key(|(name, _)| name.to_lowercase());

        let lines = entries
            .into_iter()
            .map(|(name, e)| format!("- {name}: {} (channel_id={})", e.title, e.channel_id))
            .collect::<Vec<_>>()
            .join("\n");
        self.reply(&format!("Aliases:\n{lines}")).await
    }

    async fn delete_alias(&self, alias: &str) -> Result<()> {
        let mut aliases = self.store.load()?;
        let Some(deleted) = aliases.remove(alias) else {
            return self.reply("That alias does not exist.").await;
        };
        self.store.save(&aliases)?;

        tracing::info!(alias, "alias deleted");
        self.reply(&format!("Alias '{alias}' deleted (was: {}).", deleted.title))
            .await
    }

    async fn search(&self, alias: &str, query: &str, count: u64) -> Result<()> {
        let aliases = self.store.load()?;
        let Some(entry) = aliases.get(alias) else {
            return self
                .reply(&format!(
                    "Alias '{alias}' does not exist. Use /aliases or create one with /bind."
                ))
                .await;
        };
        let Some(peer) = entry.channel_peer() else {
            return self
                .reply("Unsupported alias (not an InputPeerChannel).")
                .await;
        };

        if count < 1 {
            return self.reply("N must be >= 1.").await;
        }
        // Bounded so a search cannot flood Saved Messages.
        let limit = count.min(SEARCH_CAP) as usize;

        self.reply(&format!("Searching in '{}'… (max {limit})", entry.title))
            .await?;

        let mut cursor = self.messenger.search_messages(peer, query, limit).await?;
        let mut forwarded = 0usize;
        while forwarded < limit {
            let Some(message) = cursor.next().await? else {
                break;
            };
            self.messenger.forward_to_saved(peer, message).await?;
            forwarded += 1;
        }

        tracing::info!(alias, forwarded, limit, "search finished");
        self.reply(&format!(
            "Done: forwarded {forwarded} messages to Saved Messages."
        ))
        .await
    }
}
