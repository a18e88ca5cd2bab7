//! Sensitive data marker for secret values
//!
//! Every secret value that flows through a diff, a version change or a
//! snapshot is wrapped in `Sensitive<T>` so that `Debug` and `Display`
//! (and therefore `tracing` fields) never print it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wrapper for a secret value that redacts itself in Debug and Display
///
/// Serialization is transparent: a snapshot written by an external
/// serializer must carry the real value.
///
/// # Example
///
/// ```
/// use vaultline_core_types::Sensitive;
///
/// let password = Sensitive::new("hunter2");
/// assert_eq!(format!("{:?}", password), "***REDACTED***");
/// assert_eq!(password.to_string(), "***REDACTED***");
///
/// // Access the actual value when needed
/// assert_eq!(password.expose(), &"hunter2");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Call sites are the only places a secret can leak, keep them few.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Eq> Eq for Sensitive<T> {}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T: Serialize> Serialize for Sensitive<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self)
    }
}
