//! Store error types

use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("instrument {0} already registered")]
    DuplicateInstrument(Uuid),

    #[error("instrument {0} not found")]
    InstrumentNotFound(Uuid),

    #[error("store backend error: {0}")]
    Backend(String),
}
