//! Type-safe handles into the region and canal arenas.
//!
//! Regions and canals live in insertion-ordered arenas owned by the water
//! network. A handle is the position of the entity in its arena, so handle
//! order is collection order. The allocation passes depend on that order
//! for their first-match-wins tie-breaking.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `u32` arena index with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Create a handle from a raw arena index.
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Return the arena index as a `usize` for slice access.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self(index)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Handle for a region (node in the water network).
    RegionId
}

define_id! {
    /// Handle for a canal (directed edge in the water network).
    CanalId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_index() {
        let first = RegionId::new(0);
        let second = RegionId::new(1);
        assert!(first < second);
        assert_eq!(second.index(), 1);
    }

    #[test]
    fn display_uses_hash_prefix() {
        assert_eq!(CanalId::new(7).to_string(), "#7");
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&RegionId::new(3)).unwrap_or_default();
        assert_eq!(json, "3");
        let back: CanalId = serde_json::from_str("12").unwrap_or(CanalId::new(0));
        assert_eq!(back, CanalId::new(12));
    }
}
