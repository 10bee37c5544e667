//! Presence-tracking wrapper for partial updates.
//!
//! A plain `Option<T>` cannot tell "the client did not send this field"
//! apart from "the client sent `null`". [`Patch`] keeps the three cases
//! separate so update routines only touch the columns a payload names.
//!
//! Fields of this type must carry `#[serde(default)]` so that a missing
//! key deserializes to [`Patch::Absent`]; serialization should pair it with
//! `skip_serializing_if = "Patch::is_absent"`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One field of a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was not present in the payload. Leave the column alone.
    Absent,
    /// The key was present with an explicit `null`. Clear the column.
    Null,
    /// The key was present with a value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    /// True when the payload named this field, whether `null` or a value.
    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(v),
        }
    }

    /// Collapse into the value to write.
    ///
    /// `None` means "keep the stored value"; an explicit `null` becomes
    /// `cleared`, the column's empty representation.
    pub fn resolve(self, cleared: T) -> Option<T> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(cleared),
            Patch::Value(v) => Some(v),
        }
    }
}

impl<T: Clone> Patch<T> {
    /// Borrowing form of [`Patch::resolve`].
    pub fn resolved(&self, cleared: impl FnOnce() -> T) -> Option<T> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(cleared()),
            Patch::Value(v) => Some(v.clone()),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key exists; missing keys go through `Default`.
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}
