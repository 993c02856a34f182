use thiserror::Error;

pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 600;

/// Rejected user input. The message is what the modal shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Last page must be a non-negative integer.")]
    InvalidPage,
    #[error("Enter minutes as an integer between 1 and 600.")]
    InvalidMinutes,
    #[error("Select a title.")]
    MissingTitle,
    #[error("Select an item first.")]
    NoSelection,
}

impl ValidationError {
    pub fn heading(&self) -> &'static str {
        match self {
            ValidationError::InvalidPage => "Invalid page",
            ValidationError::InvalidMinutes => "Invalid",
            ValidationError::MissingTitle => "Missing",
            ValidationError::NoSelection => "Nothing selected",
        }
    }
}

/// Parses a last-page field. Negative numbers and non-numbers are rejected.
pub fn parse_page(input: &str) -> Result<u64, ValidationError> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidPage)
}

/// Like [`parse_page`], but a blank field counts as page 0.
pub fn parse_page_or_zero(input: &str) -> Result<u64, ValidationError> {
    if input.trim().is_empty() {
        Ok(0)
    } else {
        parse_page(input)
    }
}

pub fn parse_minutes(input: &str) -> Result<u32, ValidationError> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidMinutes)?;
    if (MIN_MINUTES as i64..=MAX_MINUTES as i64).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ValidationError::InvalidMinutes)
    }
}

pub fn title_or_untitled(input: &str) -> String {
    match input.trim() {
        "" => "Untitled".to_string(),
        title => title.to_string(),
    }
}
