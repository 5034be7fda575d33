use std::sync::Arc;

use redactedhook_core::records::{TorrentRecord, UserRecord};
use redactedhook_core::types::{EntityKind, Indexer};

/// Cache identity of one tracker record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub indexer: Indexer,
    pub kind: EntityKind,
    pub id: i64,
}

impl CacheKey {
    pub fn torrent(indexer: Indexer, id: i64) -> Self {
        Self {
            indexer,
            kind: EntityKind::Torrent,
            id,
        }
    }

    pub fn user(indexer: Indexer, id: i64) -> Self {
        Self {
            indexer,
            kind: EntityKind::User,
            id,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.indexer, self.kind, self.id)
    }
}

/// An immutable record shared between the cache and its readers.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexerRecord {
    Torrent(Arc<TorrentRecord>),
    User(Arc<UserRecord>),
}

impl IndexerRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Torrent(_) => EntityKind::Torrent,
            Self::User(_) => EntityKind::User,
        }
    }
}
