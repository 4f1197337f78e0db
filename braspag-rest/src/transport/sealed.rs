//! Sealed trait marker for Transport implementations.
//!
//! Only transports defined in this crate can carry merchant credentials.

pub(crate) mod private {
    /// Sealed trait marker.
    pub trait Sealed {}
}
