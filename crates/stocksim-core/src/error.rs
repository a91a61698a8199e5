use thiserror::Error;

/// Validation failures on values entering the simulation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("trade quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("unknown stock '{stock_id}'")]
    UnknownStock { stock_id: String },
    #[error("news impact must be between 1 and 5, got {value}")]
    ImpactOutOfRange { value: i64 },

    #[error("invalid tick interval '{value}', expected milliseconds greater than zero")]
    InvalidTickInterval { value: String },
}

/// Failures reading or writing persisted collections.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Warehouse(#[from] stocksim_warehouse::WarehouseError),

    #[error("collection '{collection}' is malformed: {source}")]
    Malformed {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("collection '{collection}' has schema_version {found}, expected {expected}")]
    UnsupportedSchemaVersion {
        collection: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the stored bytes are unusable, as opposed to the backend failing.
    pub fn is_bad_data(&self) -> bool {
        matches!(
            self,
            Self::Malformed { .. } | Self::UnsupportedSchemaVersion { .. }
        )
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
