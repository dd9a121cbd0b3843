//! Structural classification of Place/Transition nets and their encoding into
//! CCS process terms.
//!
//! The pipeline is: build a [`net::Net`], ask [`classify`] which structural
//! classes it belongs to, run the [`sync::Synchronizer`] over group-choice nets
//! that are not yet 2-τ-synchronisation nets, then hand the result to
//! [`ccs::encode`].

pub mod ccs;
pub mod classify;
pub mod config;
pub mod net;
pub mod options;
pub mod sync;
