pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod error;

pub use error::FilterError;
pub use filter::Filter;
pub use types::*;

/// Quote `column` or `alias.column` as SQL identifiers.
pub(crate) fn quote_column(column: &str) -> String {
    column
        .split('.')
        .map(|part| format!("\"{}\"", part))
        .collect::<Vec<_>>()
        .join(".")
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Accepts `column` or `alias.column`.
pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
    let parts: Vec<&str> = column.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| is_identifier(p)) {
        return Err(FilterError::InvalidColumn(column.to_string()));
    }
    Ok(())
}
