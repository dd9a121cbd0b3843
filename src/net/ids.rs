use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::net::index_vec::Idx;

static NET_TAG_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Identity of the net that issued a handle. Every net, clones included,
/// draws a tag of its own.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NetTag(u32);

impl NetTag {
    pub fn fresh() -> Self {
        Self(NET_TAG_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        /// Dense arena handle, valid only for the net that issued it. Handles
        /// are renumbered when a node or edge is swap-removed from its
        /// collection.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            owner: NetTag,
            index: u32,
        }

        impl $name {
            /// Position within the owning collection.
            pub const fn index(self) -> usize {
                self.index as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, stringify!($name))?;
                f.debug_tuple("").field(&self.index).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.index)
            }
        }

        impl Idx for $name {
            fn index(self) -> usize {
                self.index as usize
            }

            fn owner(self) -> NetTag {
                self.owner
            }

            fn from_parts(owner: NetTag, idx: usize) -> Self {
                Self {
                    owner,
                    index: idx as u32,
                }
            }
        }
    };
}

define_id!(PlaceId, "place");
define_id!(TransitionId, "transition");
define_id!(EdgeId, "edge");
