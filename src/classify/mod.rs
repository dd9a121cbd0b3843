//! Structural net classes.
//!
//! Each predicate is a single pure pass over the net. [`classify`] bundles all
//! five into a [`NetClass`] set.
use std::collections::BTreeSet;
use std::fmt;

use bitflags::bitflags;

use crate::net::{Net, PlaceId, TransitionId};

mod workflow;

pub use workflow::is_workflow_net;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NetClass: u8 {
        const CCS = 1 << 0;
        const TWO_TAU_SYNCHRONISATION = 1 << 1;
        const FREE_CHOICE = 1 << 2;
        const GROUP_CHOICE = 1 << 3;
        const WORKFLOW = 1 << 4;
    }
}

impl fmt::Display for NetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(NetClass, &str); 5] = [
            (NetClass::CCS, "CCS"),
            (NetClass::TWO_TAU_SYNCHRONISATION, "2-τ-synchronisation"),
            (NetClass::FREE_CHOICE, "free-choice"),
            (NetClass::GROUP_CHOICE, "group-choice"),
            (NetClass::WORKFLOW, "workflow"),
        ];
        let names = NAMES
            .iter()
            .filter(|(class, _)| self.contains(*class))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();
        if names.is_empty() {
            f.write_str("unclassified")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

pub fn classify(net: &Net) -> NetClass {
    let mut class = NetClass::empty();
    class.set(NetClass::CCS, is_ccs_net(net));
    class.set(
        NetClass::TWO_TAU_SYNCHRONISATION,
        is_2tau_synchronisation_net(net),
    );
    class.set(NetClass::FREE_CHOICE, is_free_choice_net(net));
    class.set(NetClass::GROUP_CHOICE, is_group_choice_net(net));
    class.set(NetClass::WORKFLOW, is_workflow_net(net));
    log::info!("net classified as {class}");
    class
}

/// Every transition consumes from exactly one place, or from exactly two when
/// it is labelled `τ`.
pub fn is_ccs_net(net: &Net) -> bool {
    net.transitions().iter().all(|transition| {
        match transition.incoming.len() {
            1 => true,
            2 => transition.is_tau(),
            _ => false,
        }
    })
}

/// Like [`is_ccs_net`] but also admits transitions without inputs.
pub fn is_2tau_synchronisation_net(net: &Net) -> bool {
    net.transitions().iter().all(|transition| {
        match transition.incoming.len() {
            0 | 1 => true,
            2 => transition.is_tau(),
            _ => false,
        }
    })
}

/// Transitions with several inputs only consume from places that feed
/// nothing else.
pub fn is_free_choice_net(net: &Net) -> bool {
    net.transitions().iter().all(|transition| {
        transition.incoming.len() <= 1
            || net
                .preset(transition.id)
                .all(|place| net.places()[place].outgoing.len() == 1)
    })
}

/// Places that share a consumer share their whole post-set.
pub fn is_group_choice_net(net: &Net) -> bool {
    let mut confirmed = vec![false; net.places_len()];
    for place in net.places().indices() {
        if confirmed[place.index()] {
            continue;
        }
        let group = post_set(net, place);
        for &transition in &group {
            for other in net.preset(transition) {
                if other == place {
                    continue;
                }
                if post_set(net, other) != group {
                    log::trace!("{place} and {other} share {transition} but differ in post-set");
                    return false;
                }
                confirmed[other.index()] = true;
            }
        }
        confirmed[place.index()] = true;
    }
    true
}

fn post_set(net: &Net, place: PlaceId) -> BTreeSet<TransitionId> {
    net.consumers(place).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::net::Node;

    /// Places `p1..pn`, each with one token, all feeding one transition.
    pub(crate) fn join(inputs: usize, label: &str) -> (Net, TransitionId) {
        let mut net = Net::empty();
        let t = net.add_transition(None, label).unwrap();
        for _ in 0..inputs {
            let p = net.add_place(None, 1).unwrap();
            net.add_edge(Node::Place(p), Node::Transition(t), 1).unwrap();
        }
        let out = net.add_place(None, 0).unwrap();
        net.add_edge(Node::Transition(t), Node::Place(out), 1).unwrap();
        (net, t)
    }

    #[test]
    fn ccs_net_bounds_in_degree_by_label() {
        assert!(is_ccs_net(&join(1, "a").0));
        assert!(is_ccs_net(&join(2, "τ").0));
        assert!(!is_ccs_net(&join(2, "a").0));
        assert!(!is_ccs_net(&join(3, "τ").0));
        assert!(!is_ccs_net(&join(0, "a").0));
    }

    #[test]
    fn two_tau_admits_generators() {
        assert!(is_2tau_synchronisation_net(&join(0, "a").0));
        assert!(is_2tau_synchronisation_net(&join(2, "τ").0));
        assert!(!is_2tau_synchronisation_net(&join(2, "b").0));
        assert!(!is_2tau_synchronisation_net(&join(3, "τ").0));
    }

    fn shared_choice() -> Net {
        // p1 -> {t1, t2}, p2 -> {t2}
        let mut net = Net::empty();
        let p1 = net.add_place(None, 1).unwrap();
        let p2 = net.add_place(None, 1).unwrap();
        let t1 = net.add_transition(None, "a").unwrap();
        let t2 = net.add_transition(None, "τ").unwrap();
        net.add_edge(p1.into(), t1.into(), 1).unwrap();
        net.add_edge(p1.into(), t2.into(), 1).unwrap();
        net.add_edge(p2.into(), t2.into(), 1).unwrap();
        net
    }

    #[test]
    fn choice_classes() {
        let net = shared_choice();
        assert!(!is_free_choice_net(&net));
        assert!(!is_group_choice_net(&net));

        let mut grouped = shared_choice();
        let p2 = grouped.places().handle(1).unwrap();
        let t1 = grouped.transitions().handle(0).unwrap();
        grouped.add_edge(p2.into(), t1.into(), 1).unwrap();
        assert!(!is_free_choice_net(&grouped));
        assert!(is_group_choice_net(&grouped));

        let (free, _) = join(3, "a");
        assert!(is_free_choice_net(&free));
        assert!(is_group_choice_net(&free));
    }

    #[test]
    fn classify_collects_every_predicate() {
        let (net, _) = join(2, "τ");
        let class = classify(&net);
        assert!(class.contains(NetClass::CCS | NetClass::TWO_TAU_SYNCHRONISATION));
        assert!(class.contains(NetClass::FREE_CHOICE | NetClass::GROUP_CHOICE));
        // two source places
        assert!(!class.contains(NetClass::WORKFLOW));
        assert_eq!(
            class.to_string(),
            "CCS, 2-τ-synchronisation, free-choice, group-choice"
        );
    }
}
