use super::thread::Thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadListUiState {
    Loading,
    Ready,
    Empty,
    Error,
}

/// Thread list pane state. A failed refresh never blanks a list that was
/// already loaded; it only marks it stale until the next good fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadListState {
    ui_state: ThreadListUiState,
    threads: Vec<Thread>,
    selected_index: Option<usize>,
    stale: bool,
}

impl Default for ThreadListState {
    fn default() -> Self {
        Self {
            ui_state: ThreadListUiState::Loading,
            threads: Vec::new(),
            selected_index: None,
            stale: false,
        }
    }
}

impl ThreadListState {
    pub fn ui_state(&self) -> ThreadListUiState {
        self.ui_state
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected_thread(&self) -> Option<&Thread> {
        self.selected_index.and_then(|index| self.threads.get(index))
    }

    pub fn find(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.iter().find(|thread| thread.id == thread_id)
    }

    pub fn set_ready(&mut self, threads: Vec<Thread>) {
        self.stale = false;
        if threads.is_empty() {
            self.ui_state = ThreadListUiState::Empty;
            self.threads.clear();
            self.selected_index = None;
            return;
        }

        let previous_selected_id = self.selected_thread().map(|thread| thread.id.clone());
        self.ui_state = ThreadListUiState::Ready;
        self.threads = threads;
        self.selected_index = resolve_selection_index(&self.threads, previous_selected_id);
    }

    /// Keeps whatever was shown before; only a list that never loaded turns into an error.
    pub fn set_refresh_failed(&mut self) {
        match self.ui_state {
            ThreadListUiState::Loading | ThreadListUiState::Error => {
                self.ui_state = ThreadListUiState::Error;
            }
            ThreadListUiState::Ready | ThreadListUiState::Empty => self.stale = true,
        }
    }

    pub fn select_thread(&mut self, thread_id: &str) -> bool {
        match self.threads.iter().position(|thread| thread.id == thread_id) {
            Some(index) => {
                self.selected_index = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn select_next(&mut self) {
        let Some(index) = self.selected_index else {
            return;
        };

        let last_index = self.threads.len().saturating_sub(1);
        self.selected_index = Some(std::cmp::min(index.saturating_add(1), last_index));
    }

    pub fn select_previous(&mut self) {
        let Some(index) = self.selected_index else {
            return;
        };

        self.selected_index = Some(index.saturating_sub(1));
    }
}

fn resolve_selection_index(threads: &[Thread], previous_selected_id: Option<String>) -> Option<usize> {
    if threads.is_empty() {
        return None;
    }

    previous_selected_id
        .and_then(|id| threads.iter().position(|thread| thread.id == id))
        .or(Some(0))
}
