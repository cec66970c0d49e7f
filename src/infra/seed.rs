//! Seed data for the in-memory backend.
//!
//! ```toml
//! [[messages]]
//! sender = "tenant-1"
//! recipient = "owner-7"
//! context = "listing-42"
//! text = "Is the flat still available?"
//! kind = "inquiry"
//! created_at_ms = 1700000000000
//!
//! [[presence]]
//! user = "owner-7"
//! is_online = false
//! last_seen_at_ms = 1700000000000
//! ```

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    domain::{
        ids::{ContextId, MessageId, UserId},
        message::{Message, MessageKind},
        presence::PresenceRecord,
    },
    infra::{error::AppError, memory_backend::InMemoryBackend},
};

#[derive(Debug, Deserialize, Default)]
pub struct SeedFile {
    #[serde(default)]
    pub messages: Vec<SeedMessage>,
    #[serde(default)]
    pub presence: Vec<SeedPresence>,
}

#[derive(Debug, Deserialize)]
pub struct SeedMessage {
    pub sender: UserId,
    pub recipient: UserId,
    pub context: Option<ContextId>,
    pub text: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub created_at_ms: i64,
    pub read_at_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SeedPresence {
    pub user: UserId,
    #[serde(default)]
    pub is_online: bool,
    pub last_seen_at_ms: i64,
}

pub fn load_seed_file(path: &Path) -> Result<SeedFile, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::SeedRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| AppError::SeedParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the seed rows into `backend`. Ids follow file order starting at 1.
pub fn apply_seed(backend: &InMemoryBackend, seed: SeedFile) -> usize {
    let count = seed.messages.len();
    for (index, row) in seed.messages.into_iter().enumerate() {
        backend.seed_message(Message {
            id: MessageId::new(index as i64 + 1),
            context_id: row.context,
            sender_id: row.sender,
            recipient_id: row.recipient,
            text: row.text,
            kind: row.kind,
            created_at_ms: row.created_at_ms,
            read_at_ms: row.read_at_ms,
        });
    }

    for row in seed.presence {
        backend.seed_presence(PresenceRecord {
            user_id: row.user,
            is_online: row.is_online,
            last_seen_at_ms: row.last_seen_at_ms,
        });
    }

    tracing::info!(messages = count, "seeded in-memory backend");
    count
}
