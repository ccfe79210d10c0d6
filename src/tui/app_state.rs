use crate::api::FormattedFiles;
use crate::error::ApiError;
use ratatui::text::Span;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum AppMode {
    Normal,
    EditingPath,
    EditingSearch,
}

/// Pane receiving navigation keys.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum Focus {
    Extensions,
    Current,
    Proposed,
    Search,
}

impl Focus {
    pub(super) fn next(self) -> Focus {
        match self {
            Focus::Extensions => Focus::Current,
            Focus::Current => Focus::Proposed,
            Focus::Proposed => Focus::Search,
            Focus::Search => Focus::Extensions,
        }
    }

    pub(super) fn previous(self) -> Focus {
        match self {
            Focus::Extensions => Focus::Search,
            Focus::Current => Focus::Extensions,
            Focus::Proposed => Focus::Current,
            Focus::Search => Focus::Proposed,
        }
    }
}

/// Single-line text field with a cursor counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct LineInput {
    pub(super) text: String,
    pub(super) cursor: usize,
}

impl LineInput {
    pub(super) fn new(text: &str) -> Self {
        LineInput {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub(super) fn insert(&mut self, c: char) {
        let byte_idx = self.byte_index(self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub(super) fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.byte_index(self.cursor);
            self.text.remove(byte_idx);
        }
    }

    pub(super) fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(super) fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub(super) fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub(super) fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Terminal columns occupied by the text left of the cursor.
    pub(super) fn display_offset(&self) -> usize {
        let byte_idx = self.byte_index(self.cursor);
        Span::raw(&self.text[..byte_idx]).width()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

/// One line of the extension panel: a group header, or one of its
/// extensions when the group is expanded.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum ExtensionRow {
    Group(usize),
    Extension { group: usize, ext: usize },
}

/// Results posted back by network worker threads.
#[derive(Debug)]
pub(super) enum WorkerMessage {
    Fetched(Result<FormattedFiles, ApiError>),
    Committed(Result<(), ApiError>),
    /// Local search hits, relative to the searched root.
    Searched(anyhow::Result<Vec<String>>),
}
