use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The aggregate row targeted by a recomputation does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
}

impl ComputeError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ComputeError::NotFound { entity, id }
    }

    /// True when the error is a missing aggregate row, which API callers
    /// map to 404 rather than 500.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ComputeError::NotFound { .. })
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
