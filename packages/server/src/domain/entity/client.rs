//! Client registry: which connection joined with which role.

use indexmap::IndexMap;

use crate::domain::value_object::{ConnectionId, JoinMetadata, Role};

/// Registry value for one joined connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEntry {
    pub role: Role,
    pub metadata: JoinMetadata,
}

impl ClientEntry {
    pub fn new(role: Role, metadata: JoinMetadata) -> Self {
        Self { role, metadata }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Connection → role mapping for every connection that has sent a join message.
///
/// Entries are kept in first-join order so diagnostic listings are stable.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    entries: IndexMap<ConnectionId, ClientEntry>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `connection_id`.
    ///
    /// Re-joining keeps the connection's original position.
    pub fn register(&mut self, connection_id: ConnectionId, role: Role, metadata: JoinMetadata) {
        self.entries
            .insert(connection_id, ClientEntry::new(role, metadata));
    }

    pub fn lookup(&self, connection_id: &ConnectionId) -> Option<&ClientEntry> {
        self.entries.get(connection_id)
    }

    /// Remove and return the entry, if the connection ever joined.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<ClientEntry> {
        // shift_remove keeps the remaining entries in join order
        self.entries.shift_remove(connection_id)
    }

    pub fn snapshot(&self) -> Vec<(ConnectionId, ClientEntry)> {
        self.entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }

    /// `true` if the connection is registered with the admin role.
    pub fn is_admin(&self, connection_id: &ConnectionId) -> bool {
        self.lookup(connection_id)
            .is_some_and(ClientEntry::is_admin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
