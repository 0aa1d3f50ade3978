//! Error types for polyscan.
//!
//! Only precondition failures are errors. Everything else the kernel can
//! run into (a polygon clipped away, a zero-height edge, an empty span) is
//! a defined outcome and is reported through normal return values.

use thiserror::Error;

/// The error type for polyscan operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyScanError {
    /// Box-clipping the polygon could need more vertices than the clip
    /// buffers hold (`n + 6` must fit).
    #[error("clip buffer too small: need {required} vertices, capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    /// A field mask names slots that do not exist in the record schema.
    #[error("field mask {bits:#010x} has bits outside the record schema")]
    UnknownFields { bits: u32 },
}

/// A specialized Result type for polyscan operations.
pub type Result<T> = std::result::Result<T, PolyScanError>;
