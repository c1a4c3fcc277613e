use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};

use crate::{common::types::GuildId, server::session::Session};

/// Process-wide map of guild to live session; the single source of truth
/// for whether a session exists.
///
/// Constructed once at startup and passed explicitly to everything that
/// needs it. Lookups are read-only snapshots (`Arc` clones), so the
/// populator's liveness check never blocks command handlers.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<GuildId, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Arc<Session>> {
        self.sessions.get(&guild_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, guild_id: GuildId) -> bool {
        self.sessions.contains_key(&guild_id)
    }

    /// Register `session` unless one already exists for its guild. Returns
    /// the existing session on conflict.
    pub fn insert_new(&self, session: Arc<Session>) -> Result<(), Arc<Session>> {
        match self.sessions.entry(session.guild_id()) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(session);
                Ok(())
            }
        }
    }

    /// Atomically swap in `session`, returning the one it replaced.
    pub fn replace(&self, session: Arc<Session>) -> Option<Arc<Session>> {
        self.sessions.insert(session.guild_id(), session)
    }

    /// Swap in `replacement` only while the entry is still `current`.
    /// Returns `false` if the guild was left or already replaced.
    pub fn replace_if_current(&self, current: &Arc<Session>, replacement: Arc<Session>) -> bool {
        match self.sessions.get_mut(&current.guild_id()) {
            Some(mut entry) if Arc::ptr_eq(entry.value(), current) => {
                *entry.value_mut() = replacement;
                true
            }
            _ => false,
        }
    }

    pub fn is_current(&self, session: &Arc<Session>) -> bool {
        self.sessions
            .get(&session.guild_id())
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), session))
    }

    pub fn remove(&self, guild_id: GuildId) -> Option<Arc<Session>> {
        self.sessions.remove(&guild_id).map(|(_, session)| session)
    }

    /// Remove the entry only if it still is `session`; a replacement
    /// installed by a forced reset is left alone.
    pub fn remove_if_current(&self, session: &Arc<Session>) -> bool {
        self.sessions
            .remove_if(&session.guild_id(), |_, current| Arc::ptr_eq(current, session))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn guild_ids(&self) -> Vec<GuildId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Remove and return every session.
    pub fn drain(&self) -> Vec<Arc<Session>> {
        self.guild_ids()
            .into_iter()
            .filter_map(|guild_id| self.remove(guild_id))
            .collect()
    }
}
