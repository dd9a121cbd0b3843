//! # Place/Transition nets
//!
//! A net is a bipartite graph of places `P` and transitions `T` joined by
//! weighted arcs. Place → transition arcs always weigh 1; transition → place
//! arcs carry the number of tokens produced. Each place holds a token count
//! (the initial marking) and each transition carries either a visible action
//! label or the internal action `τ`.
//!
//! Nodes and edges live in dense arenas ([`IndexVec`]); removal swaps the last
//! element into the freed slot so handles always form `0..len`.
//!
//! ## Example
//!
//! ```rust
//! use pn2ccs::net::*;
//!
//! let mut net = Net::empty();
//! let p1 = net.add_place(None, 1).unwrap();
//! let p2 = net.add_place(None, 0).unwrap();
//! let t1 = net.add_transition(None, "a").unwrap();
//!
//! net.add_edge(p1.into(), t1.into(), 1).unwrap();
//! net.add_edge(t1.into(), p2.into(), 1).unwrap();
//!
//! assert_eq!(net.preset(t1).collect::<Vec<_>>(), vec![p1]);
//! net.remove_place(p1).unwrap();
//! assert_eq!(net.places_len(), 1);
//! assert_eq!(net.edges_len(), 1);
//! ```

pub mod core;
pub mod ids;
pub mod index_vec;
pub mod io;
pub mod names;
pub mod structure;

pub use self::core::{Net, NetError};
pub use ids::{EdgeId, NetTag, PlaceId, TransitionId};
pub use index_vec::{Idx, IndexVec};
pub use structure::{Edge, Label, NameIndex, Node, Place, TAU, Transition, Weight};
