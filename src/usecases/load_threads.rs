use crate::domain::{
    ids::UserId,
    message::Message,
    thread::{aggregate_threads, Thread},
};

use super::contracts::{MessageQuery, MessageStore, StoreError};

const DEFAULT_PAGE_SIZE: usize = 500;
const MAX_PAGE_SIZE: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadThreadsQuery {
    pub viewer: UserId,
    /// Rows fetched per store round trip. Every page is read.
    pub page_size: usize,
}

impl LoadThreadsQuery {
    pub fn new(viewer: UserId) -> Self {
        Self {
            viewer,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn normalized_page_size(&self) -> usize {
        match self.page_size {
            0 => DEFAULT_PAGE_SIZE,
            value if value > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
            value => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadThreadsOutput {
    pub messages: Vec<Message>,
    pub threads: Vec<Thread>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadThreadsError {
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
}

impl LoadThreadsError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "THREADS_UNAUTHORIZED",
            Self::TemporarilyUnavailable => "THREADS_UNAVAILABLE",
            Self::DataContractViolation => "THREADS_INVALID_DATA",
        }
    }
}

/// Fetches every message the viewer sent or received and folds them into threads.
pub fn load_threads(
    store: &dyn MessageStore,
    query: LoadThreadsQuery,
) -> Result<LoadThreadsOutput, LoadThreadsError> {
    let messages = fetch_all(store, &query.viewer, query.normalized_page_size())?;
    let threads = aggregate_threads(&messages, &query.viewer);

    Ok(LoadThreadsOutput { messages, threads })
}

/// Walks the store newest to oldest until a short page says nothing is left.
fn fetch_all(
    store: &dyn MessageStore,
    viewer: &UserId,
    page_size: usize,
) -> Result<Vec<Message>, LoadThreadsError> {
    let mut page_query = MessageQuery::involving(viewer.clone(), page_size);
    let mut messages = Vec::new();

    loop {
        let page = store.query(&page_query).map_err(map_store_error)?;
        let exhausted = page.len() < page_size;
        let Some(oldest) = page.last() else {
            break;
        };
        let next_query = page_query.after_page(oldest);
        if next_query.before == page_query.before {
            return Err(LoadThreadsError::DataContractViolation);
        }
        page_query = next_query;
        messages.extend(page);
        if exhausted {
            break;
        }
    }

    Ok(messages)
}

fn map_store_error(error: StoreError) -> LoadThreadsError {
    match error {
        StoreError::Unauthorized | StoreError::Forbidden => LoadThreadsError::Unauthorized,
        StoreError::Unavailable | StoreError::NotFound => LoadThreadsError::TemporarilyUnavailable,
        StoreError::InvalidData => LoadThreadsError::DataContractViolation,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        domain::{
            ids::{ContextId, MessageId},
            message::{MessageKind, NewMessage},
        },
        infra::memory_backend::InMemoryBackend,
    };

    /// Serves canned rows through the same cursor rules as a real store.
    struct StubStore {
        result: Result<Vec<Message>, StoreError>,
        captured_queries: Mutex<Vec<MessageQuery>>,
    }

    impl StubStore {
        fn with_result(result: Result<Vec<Message>, StoreError>) -> Self {
            Self {
                result,
                captured_queries: Mutex::new(Vec::new()),
            }
        }

        fn captured_limits(&self) -> Vec<usize> {
            self.captured_queries
                .lock()
                .expect("query lock")
                .iter()
                .map(|query| query.limit)
                .collect()
        }
    }

    impl MessageStore for StubStore {
        fn insert(&self, _message: NewMessage) -> Result<Message, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn mark_read(&self, _id: MessageId, _read_at_ms: i64) -> Result<Message, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn query(&self, query: &MessageQuery) -> Result<Vec<Message>, StoreError> {
            self.captured_queries
                .lock()
                .expect("query lock")
                .push(query.clone());
            let mut rows: Vec<Message> = self
                .result
                .clone()?
                .into_iter()
                .filter(|message| query.matches(message))
                .collect();
            rows.sort_by(|a, b| (b.created_at_ms, b.id).cmp(&(a.created_at_ms, a.id)));
            rows.truncate(query.limit);
            Ok(rows)
        }

        fn delete(&self, _id: MessageId, _requester: &UserId) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    /// Ignores the cursor and keeps returning the same full page.
    struct StuckStore(Vec<Message>);

    impl MessageStore for StuckStore {
        fn insert(&self, _message: NewMessage) -> Result<Message, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn mark_read(&self, _id: MessageId, _read_at_ms: i64) -> Result<Message, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn query(&self, _query: &MessageQuery) -> Result<Vec<Message>, StoreError> {
            Ok(self.0.clone())
        }

        fn delete(&self, _id: MessageId, _requester: &UserId) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    fn message(id: i64, from: &str, to: &str, ctx: &str) -> Message {
        Message {
            id: MessageId::new(id),
            context_id: Some(ContextId::new(ctx)),
            sender_id: UserId::new(from),
            recipient_id: UserId::new(to),
            text: "hi".to_owned(),
            kind: MessageKind::General,
            created_at_ms: id,
            read_at_ms: None,
        }
    }

    #[test]
    fn uses_default_page_size_when_zero() {
        let store = StubStore::with_result(Ok(vec![]));

        let _ = load_threads(
            &store,
            LoadThreadsQuery {
                viewer: UserId::new("a"),
                page_size: 0,
            },
        )
        .expect("load should succeed");

        assert_eq!(store.captured_limits(), vec![500]);
    }

    #[test]
    fn caps_page_size_to_maximum_boundary() {
        let store = StubStore::with_result(Ok(vec![]));

        let _ = load_threads(
            &store,
            LoadThreadsQuery {
                viewer: UserId::new("a"),
                page_size: 1_000_000,
            },
        )
        .expect("load should succeed");

        assert_eq!(store.captured_limits(), vec![5_000]);
    }

    #[test]
    fn aggregates_fetched_messages_for_viewer() {
        let store = StubStore::with_result(Ok(vec![
            message(1, "a", "b", "P1"),
            message(2, "b", "a", "P1"),
            message(3, "a", "c", "P2"),
        ]));

        let output =
            load_threads(&store, LoadThreadsQuery::new(UserId::new("a"))).expect("load");

        assert_eq!(output.messages.len(), 3);
        assert_eq!(output.threads.len(), 2);
        assert_eq!(output.threads[0].other_user_id(), &UserId::new("c"));
    }

    #[test]
    fn reads_every_page_when_history_exceeds_one_page() {
        let mut rows: Vec<Message> = (2..=8).map(|id| message(id, "b", "a", "P1")).collect();
        rows.push(message(1, "c", "a", "OLD"));
        let store = StubStore::with_result(Ok(rows));

        let output = load_threads(
            &store,
            LoadThreadsQuery {
                viewer: UserId::new("a"),
                page_size: 3,
            },
        )
        .expect("load");

        assert_eq!(store.captured_limits(), vec![3, 3, 3]);
        assert_eq!(output.messages.len(), 8);
        let old = output
            .threads
            .iter()
            .find(|thread| thread.context_id() == Some(&ContextId::new("OLD")))
            .expect("oldest thread must survive paging");
        assert_eq!(old.unread_count, 1);
    }

    #[test]
    fn exact_multiple_of_page_size_stops_on_empty_page() {
        let rows: Vec<Message> = (1..=4).map(|id| message(id, "b", "a", "P1")).collect();
        let store = StubStore::with_result(Ok(rows));

        let output = load_threads(
            &store,
            LoadThreadsQuery {
                viewer: UserId::new("a"),
                page_size: 2,
            },
        )
        .expect("load");

        assert_eq!(output.messages.len(), 4);
        assert_eq!(store.captured_limits().len(), 3);
    }

    #[test]
    fn old_unread_thread_survives_a_large_newer_history() {
        let backend = InMemoryBackend::new();
        backend
            .insert(NewMessage {
                context_id: Some(ContextId::new("OLD")),
                sender_id: UserId::new("c"),
                recipient_id: UserId::new("a"),
                text: "still there?".to_owned(),
                kind: MessageKind::General,
                created_at_ms: 1,
            })
            .expect("insert");
        for at in 2..=501 {
            backend
                .insert(NewMessage {
                    context_id: Some(ContextId::new("P1")),
                    sender_id: UserId::new("b"),
                    recipient_id: UserId::new("a"),
                    text: "hi".to_owned(),
                    kind: MessageKind::General,
                    created_at_ms: at,
                })
                .expect("insert");
        }

        let output =
            load_threads(&backend, LoadThreadsQuery::new(UserId::new("a"))).expect("load");

        assert_eq!(output.threads.len(), 2);
        assert_eq!(output.messages.len(), 501);
    }

    #[test]
    fn store_ignoring_the_cursor_is_a_contract_violation() {
        let store = StuckStore(vec![message(2, "b", "a", "P1"), message(1, "b", "a", "P1")]);

        let err = load_threads(
            &store,
            LoadThreadsQuery {
                viewer: UserId::new("a"),
                page_size: 2,
            },
        )
        .expect_err("must not loop forever");

        assert_eq!(err, LoadThreadsError::DataContractViolation);
    }

    #[test]
    fn maps_unavailable_error() {
        let store = StubStore::with_result(Err(StoreError::Unavailable));

        let err = load_threads(&store, LoadThreadsQuery::new(UserId::new("a")))
            .expect_err("must fail");

        assert_eq!(err, LoadThreadsError::TemporarilyUnavailable);
    }

    #[test]
    fn maps_invalid_data_error() {
        let store = StubStore::with_result(Err(StoreError::InvalidData));

        let err = load_threads(&store, LoadThreadsQuery::new(UserId::new("a")))
            .expect_err("must fail");

        assert_eq!(err, LoadThreadsError::DataContractViolation);
    }
}
