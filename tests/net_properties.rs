use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pn2ccs::ccs::{Action, ActionName, ConstantName, Process, encode};
use pn2ccs::classify::{
    is_2tau_synchronisation_net, is_ccs_net, is_free_choice_net, is_group_choice_net,
};
use pn2ccs::net::io::NetDocument;
use pn2ccs::net::{Net, NetError, Node};
use pn2ccs::sync::Synchronizer;

const LABELS: [&str; 3] = ["τ", "a", "b"];

fn random_node(net: &Net, rng: &mut StdRng, place: bool) -> Option<Node> {
    if place {
        let len = net.places_len();
        (len > 0)
            .then(|| net.places().handle(rng.random_range(0..len)))
            .flatten()
            .map(Node::Place)
    } else {
        let len = net.transitions_len();
        (len > 0)
            .then(|| net.transitions().handle(rng.random_range(0..len)))
            .flatten()
            .map(Node::Transition)
    }
}

fn mutate(net: &mut Net, rng: &mut StdRng) {
    match rng.random_range(0..10) {
        0 | 1 => {
            net.add_place(None, rng.random_range(0..3)).unwrap();
        }
        2 | 3 => {
            let label = LABELS[rng.random_range(0..LABELS.len())];
            net.add_transition(None, label).unwrap();
        }
        4..=7 => {
            let forward = rng.random_bool(0.6);
            let place = random_node(net, rng, true);
            let transition = random_node(net, rng, false);
            if let (Some(place), Some(transition)) = (place, transition) {
                let (from, to) = if forward {
                    (place, transition)
                } else {
                    (transition, place)
                };
                // duplicates are rejected without touching the net
                let _ = net.add_edge(from, to, rng.random_range(1..3));
            }
        }
        8 => {
            if net.edges_len() > 0 && rng.random_bool(0.5) {
                let edge = net.edges().handle(rng.random_range(0..net.edges_len()));
                net.remove_edge(edge.unwrap()).unwrap();
            } else if let Some(Node::Place(place)) = random_node(net, rng, true) {
                net.remove_place(place).unwrap();
            }
        }
        _ => {
            if let Some(Node::Transition(transition)) = random_node(net, rng, false) {
                net.remove_transition(transition).unwrap();
            }
        }
    }
}

fn sync_counts(process: &Process, counts: &mut HashMap<ActionName, (usize, usize)>) {
    for action in process.actions() {
        match action {
            Action::Input(name) => counts.entry(name.clone()).or_default().0 += 1,
            Action::Co(name) => counts.entry(name.clone()).or_default().1 += 1,
            Action::Internal => {}
        }
    }
}

fn check_encoding(net: &Net) {
    let encoding = encode(net).unwrap();
    let mut counts = HashMap::new();
    for body in encoding.definitions.values() {
        sync_counts(body, &mut counts);
    }
    sync_counts(&encoding.initial, &mut counts);
    for name in &encoding.sync_names {
        assert_eq!(counts.get(name), Some(&(1, 1)), "{name} in {encoding}");
    }
}

#[test]
fn random_mutations_keep_the_net_consistent() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..40 {
        let mut net = Net::empty();
        for _ in 0..60 {
            mutate(&mut net, &mut rng);
            net.check_consistency().unwrap();
            for transition in net.transitions().iter() {
                for edge in &transition.incoming {
                    assert_eq!(net.edges()[*edge].to, Node::Transition(transition.id));
                }
            }
        }
    }
}

#[test]
fn class_implications_hold_on_random_nets() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..200 {
        let mut net = Net::empty();
        for _ in 0..rng.random_range(1..25) {
            mutate(&mut net, &mut rng);
        }

        if is_ccs_net(&net) {
            assert!(is_2tau_synchronisation_net(&net));
        }
        if is_free_choice_net(&net) {
            assert!(is_group_choice_net(&net));
        }
        if is_2tau_synchronisation_net(&net) {
            assert!(net.transitions().iter().all(|t| t.incoming.len() <= 2));
            let copy = Synchronizer::seeded(round).synchronize(&net).unwrap();
            assert!(copy.is_unchanged());
            assert_eq!(NetDocument::from_net(&copy.net), NetDocument::from_net(&net));
            check_encoding(&net);
        } else if is_group_choice_net(&net) {
            let result = Synchronizer::seeded(round).synchronize(&net).unwrap();
            result.net.check_consistency().unwrap();
            assert!(is_2tau_synchronisation_net(&result.net));
            check_encoding(&result.net);
        }
    }
}

fn constant(name: &str) -> Process {
    Process::Constant(ConstantName::new(name).unwrap())
}

#[test]
fn single_marked_place() {
    let mut net = Net::empty();
    net.add_place(None, 1).unwrap();

    let encoding = encode(&net).unwrap();
    assert_eq!(encoding.definitions.len(), 1);
    assert_eq!(encoding.definitions[0], Process::Inaction);
    assert_eq!(encoding.initial, constant("X_p1"));
}

#[test]
fn visible_transition_between_two_places() {
    let mut net = Net::empty();
    let p1 = net.add_place(None, 1).unwrap();
    let t1 = net.add_transition(None, "a").unwrap();
    let p2 = net.add_place(None, 0).unwrap();
    net.add_edge(p1.into(), t1.into(), 1).unwrap();
    net.add_edge(t1.into(), p2.into(), 1).unwrap();

    let encoding = encode(&net).unwrap();
    assert_eq!(encoding.to_string(), "X_p1 := a?.X_p2\nX_p2 := 0\nX_p1");
}

#[test]
fn tau_join_becomes_restricted_handshake() {
    let mut net = Net::empty();
    let p1 = net.add_place(None, 1).unwrap();
    let p2 = net.add_place(None, 1).unwrap();
    let t1 = net.add_transition(None, "τ").unwrap();
    let p3 = net.add_place(None, 0).unwrap();
    for p in [p1, p2] {
        net.add_edge(p.into(), t1.into(), 1).unwrap();
    }
    net.add_edge(t1.into(), p3.into(), 1).unwrap();
    assert!(is_ccs_net(&net));

    let encoding = encode(&net).unwrap();
    assert_eq!(encoding.sync_names, vec![ActionName::new("s_t1").unwrap()]);
    let mut bodies = [
        encoding.definitions[0].to_string(),
        encoding.definitions[1].to_string(),
    ];
    bodies.sort();
    assert_eq!(bodies, ["s_t1!.0".to_owned(), "s_t1?.X_p3".to_owned()]);
    assert_eq!(encoding.initial.to_string(), "(νs_t1)(X_p1 ∥ X_p2)");
}

#[test]
fn three_way_visible_group_is_synchronised() {
    let mut net = Net::empty();
    let t = net.add_transition(None, "go").unwrap();
    for _ in 0..3 {
        let p = net.add_place(None, 1).unwrap();
        net.add_edge(p.into(), t.into(), 1).unwrap();
    }
    assert!(is_group_choice_net(&net));
    assert!(!is_2tau_synchronisation_net(&net));

    let result = Synchronizer::seeded(7).synchronize(&net).unwrap();
    let out = &result.net;
    assert_eq!(out.places_len(), 5);
    assert_eq!(out.transitions_len(), 3);
    assert_eq!(
        out.transitions().iter().skip(1).filter(|t| t.is_tau()).count(),
        2
    );
    let t = out.transitions().handle(t.index()).unwrap();
    assert_eq!(out.transitions()[t].incoming.len(), 1);
    assert!(is_2tau_synchronisation_net(out));
    check_encoding(out);
}

#[test]
fn handles_from_another_net_are_rejected() {
    let mut small = Net::empty();
    let kept = small.add_place(None, 1).unwrap();
    let mut large = Net::empty();
    let borrowed = large.add_place(None, 0).unwrap();
    large.add_place(None, 0).unwrap();
    assert_eq!(borrowed.index(), kept.index());

    assert!(matches!(
        small.remove_place(borrowed),
        Err(NetError::UnrelatedReference(_))
    ));
    assert_eq!(small.places_len(), 1);
    assert_eq!(small.places()[kept].tokens, 1);
    assert_eq!(large.places_len(), 2);
}
