use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a marketplace user, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Listing or subject a conversation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label used wherever a missing context has to be rendered as text.
pub const DIRECT_CONTEXT_LABEL: &str = "direct";

pub fn context_label(context_id: Option<&ContextId>) -> &str {
    context_id.map_or(DIRECT_CONTEXT_LABEL, ContextId::as_str)
}

const KEY_ESCAPE: char = '@';

/// Segment naming a context inside thread ids and channel keys.
///
/// Direct conversations map to `@direct`. Listing ids starting with `@` get one
/// more `@`, so a listing literally named `direct` or `@direct` never shares a
/// key with the direct conversation.
pub fn context_key(context_id: Option<&ContextId>) -> String {
    match context_id {
        None => format!("{KEY_ESCAPE}{DIRECT_CONTEXT_LABEL}"),
        Some(context_id) if context_id.as_str().starts_with(KEY_ESCAPE) => {
            format!("{KEY_ESCAPE}{context_id}")
        }
        Some(context_id) => context_id.as_str().to_owned(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
