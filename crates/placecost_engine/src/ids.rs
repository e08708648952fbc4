//! Opaque ID newtypes for netlist entities.
//!
//! [`BlockId`], [`NetId`], and [`PinId`] are `u32` indices into the netlist's
//! arenas and into the engine's per-net tables.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the ID as a `usize` table index.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// ID of a placeable block.
    BlockId
);

define_id!(
    /// ID of a net. Also indexes the engine's per-net cost and box tables.
    NetId
);

define_id!(
    /// ID of a block pin.
    PinId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_raw() {
        let id = NetId::from_raw(17);
        assert_eq!(id.as_raw(), 17);
        assert_eq!(id.index(), 17);
    }

    #[test]
    fn ids_order_by_index() {
        assert!(BlockId::from_raw(2) < BlockId::from_raw(9));
    }

    #[test]
    fn display_is_raw_index() {
        assert_eq!(format!("{}", PinId::from_raw(5)), "5");
    }

    #[test]
    fn serde_is_transparent_number() {
        let json = serde_json::to_string(&NetId::from_raw(3)).unwrap();
        assert_eq!(json, "3");
        let back: NetId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NetId::from_raw(3));
    }
}
