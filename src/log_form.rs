use crate::model::Document;
use crate::validation::{parse_page, ValidationError};

/// "Log your reading" form: pick a title, type the last page.
#[derive(Debug, Clone)]
pub struct LogForm {
    titles: Vec<String>,
    selected: Option<usize>,
    pub page_input: String,
}

impl LogForm {
    pub fn new(doc: &Document) -> Self {
        let titles: Vec<String> = doc.active.iter().map(|item| item.title.clone()).collect();
        let selected = if titles.is_empty() { None } else { Some(0) };
        Self {
            titles,
            selected,
            page_input: String::new(),
        }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select_next(&mut self) {
        if let Some(idx) = self.selected {
            if idx + 1 < self.titles.len() {
                self.selected = Some(idx + 1);
            }
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(idx) = self.selected {
            self.selected = Some(idx.saturating_sub(1));
        }
    }

    pub fn push_char(&mut self, c: char) {
        if c.is_ascii_digit() || c == '-' {
            self.page_input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.page_input.pop();
    }

    /// Validated `(title, page)`; the form stays as-is on error.
    pub fn submit(&self) -> Result<(String, u64), ValidationError> {
        let title = self
            .selected
            .and_then(|idx| self.titles.get(idx))
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingTitle)?;
        let page = parse_page(&self.page_input)?;
        Ok((title.to_string(), page))
    }
}
