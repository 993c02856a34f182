//! Reading list editor state.
//!
//! Every action works on the selected row by position. Mutations change the
//! [`Document`] in place; the session persists right after.

use crate::model::{Document, Kind, ReadingItem};
use crate::validation::{parse_page_or_zero, title_or_untitled, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Title,
    Page,
    Kind,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::List => Focus::Title,
            Focus::Title => Focus::Page,
            Focus::Page => Focus::Kind,
            Focus::Kind => Focus::List,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Editor {
    selected: Option<usize>,
    new_item: bool,
    pub focus: Focus,
    pub title: String,
    pub page: String,
    pub kind: Kind,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            selected: None,
            new_item: false,
            focus: Focus::List,
            title: String::new(),
            page: String::new(),
            kind: Kind::Book,
        }
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_new_item(&self) -> bool {
        self.new_item
    }

    pub fn select(&mut self, doc: &Document, idx: usize) {
        if let Some(item) = doc.active.get(idx) {
            self.selected = Some(idx);
            self.new_item = false;
            self.load(item);
        }
    }

    pub fn select_next(&mut self, doc: &Document) {
        let next = match self.selected {
            Some(idx) if idx + 1 < doc.active.len() => idx + 1,
            Some(idx) => idx,
            None => 0,
        };
        self.select(doc, next);
    }

    pub fn select_prev(&mut self, doc: &Document) {
        let prev = self.selected.map(|idx| idx.saturating_sub(1)).unwrap_or(0);
        self.select(doc, prev);
    }

    /// Starts a blank form for a new row.
    pub fn begin_new(&mut self) {
        self.selected = None;
        self.new_item = true;
        self.title.clear();
        self.page = "0".to_string();
        self.kind = Kind::Book;
        self.focus = Focus::Title;
    }

    pub fn edit_selected(&mut self) -> Result<(), ValidationError> {
        self.selected.ok_or(ValidationError::NoSelection)?;
        self.focus = Focus::Title;
        Ok(())
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            Focus::Title => self.title.push(c),
            Focus::Page if c.is_ascii_digit() || c == '-' => self.page.push(c),
            _ => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            Focus::Title => {
                self.title.pop();
            }
            Focus::Page => {
                self.page.pop();
            }
            _ => {}
        }
    }

    pub fn cycle_kind(&mut self, forward: bool) {
        self.kind = if forward {
            self.kind.next()
        } else {
            self.kind.prev()
        };
    }

    /// Appends in new-item mode or with nothing selected, otherwise replaces
    /// the selected row in place. Returns the affected position.
    pub fn save(&mut self, doc: &mut Document) -> Result<usize, ValidationError> {
        let last_page = parse_page_or_zero(&self.page)?;
        let item = ReadingItem::new(title_or_untitled(&self.title), last_page, self.kind);

        let idx = match self.selected.filter(|idx| !self.new_item && *idx < doc.active.len()) {
            Some(idx) => {
                doc.active[idx] = item;
                idx
            }
            None => {
                doc.active.push(item);
                doc.active.len() - 1
            }
        };
        self.focus = Focus::List;
        self.select(doc, idx);
        Ok(idx)
    }

    pub fn remove(&mut self, doc: &mut Document) -> Result<ReadingItem, ValidationError> {
        let idx = self.selected_index(doc)?;
        let removed = doc.active.remove(idx);
        self.clear();
        Ok(removed)
    }

    /// The row "mark completed" acts on, without changing anything yet.
    pub fn completion_target(&self, doc: &Document) -> Result<(usize, ReadingItem), ValidationError> {
        let idx = self.selected_index(doc)?;
        Ok((idx, doc.active[idx].clone()))
    }

    pub fn finish_completion(&mut self, doc: &mut Document, idx: usize) {
        if idx < doc.active.len() {
            doc.active.remove(idx);
        }
        self.clear();
    }

    fn selected_index(&self, doc: &Document) -> Result<usize, ValidationError> {
        self.selected
            .filter(|idx| *idx < doc.active.len())
            .ok_or(ValidationError::NoSelection)
    }

    fn load(&mut self, item: &ReadingItem) {
        self.title = item.title.clone();
        self.page = item.last_page.to_string();
        self.kind = item.kind;
    }

    fn clear(&mut self) {
        self.selected = None;
        self.new_item = false;
        self.focus = Focus::List;
        self.title.clear();
        self.page.clear();
        self.kind = Kind::Book;
    }
}
