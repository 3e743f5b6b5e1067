//! Core ID Types for the typed tree and HIR
//!
//! Each ID type is a lightweight wrapper around u32 that prevents mixing up
//! symbols, types and synthesized temporaries.

use serde::Serialize;
use std::fmt;

/// Macro to define ID types with consistent behavior
macro_rules! define_id_type {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Create a new ID from a raw u32 value
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw u32 value of this ID
            pub const fn as_raw(self) -> u32 {
                self.0
            }

            /// Check if this ID is valid (not the sentinel value)
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            /// Get an invalid/null sentinel value
            pub const fn invalid() -> Self {
                Self(u32::MAX)
            }

            /// Create the first valid ID
            pub const fn first() -> Self {
                Self(0)
            }

            /// Get the next ID in sequence
            pub const fn next(self) -> Self {
                Self(self.0.wrapping_add(1))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}{}", $prefix, self.0)
                } else {
                    write!(f, "{}<invalid>", $prefix)
                }
            }
        }
    };
}

define_id_type!(
    /// Identifies a symbol (method, property, field, local) in the symbol table
    SymbolId, "sym#"
);

define_id_type!(
    /// Identifies an interned type in the type table
    TypeId, "ty#"
);

define_id_type!(
    /// Identifies a synthesized temporary. Unique within one lowering context,
    /// i.e. within one method body.
    TempId, "tmp#"
);
