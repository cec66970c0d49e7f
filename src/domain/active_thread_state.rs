use super::{
    message::Message,
    thread::{Thread, ThreadKey},
};

/// Scroll margin - number of items to keep visible above/below cursor before scrolling.
const SCROLL_MARGIN: usize = 5;

/// The conversation open in the right-hand pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveThreadState {
    key: Option<ThreadKey>,
    thread_id: Option<String>,
    messages: Vec<Message>,
    selected_index: Option<usize>,
    scroll_offset: usize,
}

impl ActiveThreadState {
    pub fn key(&self) -> Option<&ThreadKey> {
        self.key.as_ref()
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_open(&self) -> bool {
        self.key.is_some()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn open(&mut self, thread: &Thread) {
        self.key = Some(thread.key.clone());
        self.thread_id = Some(thread.id.clone());
        self.scroll_offset = 0;
        self.set_messages(thread.messages.clone());
    }

    /// Replaces the messages after a refresh. Keeps the cursor pinned to the
    /// newest message when it was already there.
    pub fn sync(&mut self, thread: &Thread) {
        if self.thread_id.as_deref() != Some(thread.id.as_str()) {
            return;
        }

        let was_at_bottom = match self.selected_index {
            None => true,
            Some(index) => index + 1 >= self.messages.len(),
        };
        let previous = self.selected_index;
        self.messages = thread.messages.clone();
        self.selected_index = if self.messages.is_empty() {
            None
        } else if was_at_bottom {
            Some(self.messages.len() - 1)
        } else {
            previous.map(|index| index.min(self.messages.len() - 1))
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn set_messages(&mut self, messages: Vec<Message>) {
        self.selected_index = if messages.is_empty() {
            None
        } else {
            Some(messages.len() - 1)
        };
        self.messages = messages;
    }

    pub fn select_next(&mut self) {
        if self.messages.is_empty() {
            return;
        }

        self.selected_index = match self.selected_index {
            None => Some(0),
            Some(idx) if idx + 1 < self.messages.len() => Some(idx + 1),
            Some(idx) => Some(idx),
        };
    }

    pub fn select_previous(&mut self) {
        if self.messages.is_empty() {
            return;
        }

        self.selected_index = match self.selected_index {
            None => Some(self.messages.len() - 1),
            Some(idx) => Some(idx.saturating_sub(1)),
        };
    }

    /// Keeps the cursor visible with SCROLL_MARGIN rows of context.
    pub fn update_scroll_offset(&mut self, element_index: usize, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }

        let effective_margin = SCROLL_MARGIN.min(viewport_height / 2);

        if element_index < self.scroll_offset + effective_margin {
            self.scroll_offset = element_index.saturating_sub(effective_margin);
        }

        let visible_bottom = self.scroll_offset + viewport_height;
        if element_index + effective_margin >= visible_bottom {
            self.scroll_offset =
                (element_index + effective_margin + 1).saturating_sub(viewport_height);
        }
    }
}
