// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes for objects owned by other systems.
//!
//! Neither the access plane nor PagerDuty lets us mint IDs, so these wrappers
//! only carry opaque strings around with type safety.

/// Define a newtype ID wrapper around `SmolStr`.
///
/// Generates `new()`, `as_str()`, `is_empty()`, `Display`, `From<String>`,
/// `From<&str>`, `PartialEq<str>`, `PartialEq<&str>`, `Borrow<str>`, and
/// `Deref` implementations.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct RequestId;
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            /// Wrap an existing identifier.
            pub fn new(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the ID is an empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Access request identifier assigned by the access plane.
    pub struct RequestId;
}

define_id! {
    /// Incident identifier assigned by PagerDuty.
    pub struct IncidentId;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
