use thiserror::Error;

/// Per-record data problems. These are recovered locally: the offending
/// record is skipped and counted, and the rest of the batch proceeds.
/// Only structurally unusable input (a file without the expected columns)
/// is fatal, and that is raised at ingest time instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// A raw stat the requested metric family cannot do without.
    #[error("record for `{entity_id}` is missing required field `{field}`")]
    MissingField {
        entity_id: String,
        field: &'static str,
    },

    /// The source date did not parse, so the record cannot take part in
    /// rest-interval ordering for its entity.
    #[error("record for `{entity_id}` has unparsable game date `{raw}`")]
    UnparsableDate { entity_id: String, raw: String },
}
