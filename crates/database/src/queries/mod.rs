use ingestion::store::StoreError;

pub mod trip;

pub(crate) fn convert_error(why: sqlx::Error) -> StoreError {
    StoreError::backend(why)
}

/// Table names are spliced into statements, so only plain unquoted
/// PostgreSQL identifiers are accepted.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= 63
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
