/// Failures the engine reports to its caller instead of degrading silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("expected 5 fields (weekday month day time year), got {found} in {input:?}")]
    FieldCount { input: String, found: usize },

    #[error("unrecognized weekday {found:?} in {input:?}")]
    Weekday { input: String, found: String },

    #[error("unrecognized date {input:?}: {source}")]
    Format {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}
