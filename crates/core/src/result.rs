//! Result alias and the fallback combinator used where a failure should
//! degrade to an empty value instead of failing the request.

use crate::error::Error;

/// The standard Result type for Marcus operations.
pub type Result<T> = std::result::Result<T, Error>;

pub trait ResultExt<T> {
    /// The value, or `T::default()` after logging the error at `warn` with
    /// `context`.
    fn or_default_logged(self, context: &str) -> T
    where
        T: Default;
}

impl<T> ResultExt<T> for Result<T> {
    fn or_default_logged(self, context: &str) -> T
    where
        T: Default,
    {
        self.unwrap_or_else(|e| {
            tracing::warn!("{context}: {e}, using empty value");
            T::default()
        })
    }
}
