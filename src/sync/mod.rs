//! Conversion of group-choice nets into 2-τ-synchronisation nets.
//!
//! A transition consuming from more places than its label allows is replaced
//! by a binary tree of fresh `τ` transitions. Each tree node consumes from two
//! places of the choice group and produces into a fresh place; the surviving
//! places are then wired back to every transition of the group. The tree shape
//! is drawn from an injected random source.
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classify::{is_2tau_synchronisation_net, is_group_choice_net};
use crate::net::{Label, Net, NetError, PlaceId, TransitionId};

mod pairing;

pub use pairing::pairing_order;

#[derive(Debug)]
pub struct SyncResult {
    pub net: Net,
    pub steps: Vec<SyncStep>,
}

impl SyncResult {
    /// `true` when the input already was a 2-τ-synchronisation net.
    pub fn is_unchanged(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One rewrite applied to the output net. Handles belong to
/// [`SyncResult::net`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    Merged {
        left: PlaceId,
        right: PlaceId,
        transition: TransitionId,
        place: PlaceId,
    },
    Reconnected {
        places: Vec<PlaceId>,
        transitions: Vec<TransitionId>,
    },
}

pub struct Synchronizer<R> {
    rng: R,
}

impl<R> Synchronizer<R>
where
    R: Rng,
{
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn synchronize(&mut self, net: &Net) -> Result<SyncResult, NetError> {
        synchronize(net, &mut self.rng)
    }
}

impl Synchronizer<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

/// Returns a fresh 2-τ-synchronisation net equivalent to `net`. The input is
/// never mutated.
pub fn synchronize<R>(net: &Net, rng: &mut R) -> Result<SyncResult, NetError>
where
    R: Rng + ?Sized,
{
    if is_2tau_synchronisation_net(net) {
        debug!("net already is a 2-τ-synchronisation net, copying");
        return Ok(SyncResult {
            net: net.clone(),
            steps: Vec::new(),
        });
    }
    if !is_group_choice_net(net) {
        return Err(NetError::StructuralMismatch {
            operation: "synchronisation",
            required: "group-choice or 2-τ-synchronisation",
        });
    }

    let mut output = net.clone();
    let mut steps = Vec::new();
    // transitions appended below are binary τ joins and never need splitting
    for idx in 0..net.transitions_len() {
        let Some(transition) = output.transitions().handle(idx) else {
            break;
        };
        if within_limit(&output, transition) {
            continue;
        }
        split_group(&mut output, transition, rng, &mut steps)?;
    }

    if !is_2tau_synchronisation_net(&output) {
        return Err(NetError::StructuralMismatch {
            operation: "synchronisation",
            required: "group-choice",
        });
    }
    info!(
        "synchronised net: {} merges, {} places, {} transitions",
        steps
            .iter()
            .filter(|step| matches!(step, SyncStep::Merged { .. }))
            .count(),
        output.places_len(),
        output.transitions_len()
    );
    Ok(SyncResult { net: output, steps })
}

fn within_limit(net: &Net, transition: TransitionId) -> bool {
    let transition = &net.transitions()[transition];
    let limit = if transition.is_tau() { 2 } else { 1 };
    transition.incoming.len() <= limit
}

fn split_group<R>(
    net: &mut Net,
    transition: TransitionId,
    rng: &mut R,
    steps: &mut Vec<SyncStep>,
) -> Result<(), NetError>
where
    R: Rng + ?Sized,
{
    let places: Vec<PlaceId> = net.preset(transition).collect();
    let Some(&representative) = places.first() else {
        return Ok(());
    };
    let transitions: Vec<TransitionId> = net.consumers(representative).collect();
    let keep = if transitions
        .iter()
        .all(|t| net.transitions()[*t].is_tau())
    {
        2
    } else {
        1
    };
    let pairs = pairing_order(places.len(), keep, rng);
    debug!(
        "splitting {} over {} places into {} joins",
        transition,
        places.len(),
        pairs.len()
    );

    for &place in &places {
        while let Some(&edge) = net.places()[place].outgoing.last() {
            net.remove_edge(edge)?;
        }
    }
    for &consumer in &transitions {
        while let Some(&edge) = net.transitions()[consumer].incoming.last() {
            net.remove_edge(edge)?;
        }
    }

    let mut working = places;
    for (first, second) in pairs {
        let left = working[first];
        let right = working[second];
        let join = net.add_labelled_transition(None, Label::Tau)?;
        let joined = net.add_place(None, 0)?;
        net.add_edge(left.into(), join.into(), 1)?;
        net.add_edge(right.into(), join.into(), 1)?;
        net.add_edge(join.into(), joined.into(), 1)?;
        debug!("joined {left} and {right} through {join} into {joined}");

        working[first] = joined;
        working.swap_remove(second);
        steps.push(SyncStep::Merged {
            left,
            right,
            transition: join,
            place: joined,
        });
    }

    for &place in &working {
        for &consumer in &transitions {
            net.add_edge(place.into(), consumer.into(), 1)?;
        }
    }
    steps.push(SyncStep::Reconnected {
        places: working,
        transitions,
    });
    Ok(())
}
