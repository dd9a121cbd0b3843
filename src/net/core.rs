//! The mutable net: node and edge arenas, structural mutation and invariant
//! enforcement.
use std::fmt::{self, Write as FmtWrite};
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::net::ids::{EdgeId, NetTag, PlaceId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec, SwapRemoved};
use crate::net::names::NameTable;
use crate::net::structure::{Adjacency, Edge, Label, NameIndex, Node, Place, Transition, Weight};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("an edge from {from} to {to} already exists")]
    DuplicateEdge { from: Node, to: Node },
    #[error("{0} does not belong to this net")]
    UnrelatedReference(String),
    #[error("{operation} requires a {required} net")]
    StructuralMismatch {
        operation: &'static str,
        required: &'static str,
    },
}

fn unrelated(what: impl fmt::Display) -> NetError {
    NetError::UnrelatedReference(what.to_string())
}

/// A Place/Transition net.
///
/// Invariants held after every public operation:
/// * handles of each collection form the dense range `0..len`, and every
///   element's `id` field equals its handle;
/// * `e ∈ n.outgoing ⇔ edges[e].from == n` and `e ∈ n.incoming ⇔
///   edges[e].to == n` for every node `n`;
/// * every edge joins a place and a transition, at most one edge exists per
///   ordered pair, place → transition edges weigh exactly 1 and
///   transition → place edges weigh at least 1;
/// * display names are unique within places and within transitions;
/// * every handle stored in the net carries the net's own [`NetTag`].
pub struct Net {
    tag: NetTag,
    places: IndexVec<PlaceId, Place>,
    transitions: IndexVec<TransitionId, Transition>,
    edges: IndexVec<EdgeId, Edge>,
    place_names: NameTable,
    transition_names: NameTable,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("edges", &self.edges)
            .finish()
    }
}

impl Default for Net {
    fn default() -> Self {
        Self::empty()
    }
}

impl Clone for Net {
    /// The copy draws a fresh tag, so handles of `self` are foreign to it.
    /// Positions are preserved: [`IndexVec::handle`] maps a handle's
    /// [`index`](PlaceId::index) to the copy's counterpart.
    fn clone(&self) -> Self {
        let mut copy = Self {
            tag: self.tag,
            places: self.places.clone(),
            transitions: self.transitions.clone(),
            edges: self.edges.clone(),
            place_names: self.place_names.clone(),
            transition_names: self.transition_names.clone(),
        };
        copy.retag(NetTag::fresh());
        copy
    }
}

impl Net {
    pub fn empty() -> Self {
        let tag = NetTag::fresh();
        Self {
            tag,
            places: IndexVec::new(tag),
            transitions: IndexVec::new(tag),
            edges: IndexVec::new(tag),
            place_names: NameTable::default(),
            transition_names: NameTable::default(),
        }
    }

    pub fn tag(&self) -> NetTag {
        self.tag
    }

    pub fn places(&self) -> &IndexVec<PlaceId, Place> {
        &self.places
    }

    pub fn transitions(&self) -> &IndexVec<TransitionId, Transition> {
        &self.transitions
    }

    pub fn edges(&self) -> &IndexVec<EdgeId, Edge> {
        &self.edges
    }

    pub fn place(&self, place: PlaceId) -> Option<&Place> {
        self.places.get(place)
    }

    pub fn transition(&self, transition: TransitionId) -> Option<&Transition> {
        self.transitions.get(transition)
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(edge)
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn edges_len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty() && self.transitions.is_empty()
    }

    /// Removes every node and edge and frees all display names.
    pub fn clear(&mut self) {
        self.places.clear();
        self.transitions.clear();
        self.edges.clear();
        self.place_names.clear();
        self.transition_names.clear();
    }

    pub fn add_place(
        &mut self,
        name_hint: Option<NameIndex>,
        tokens: Weight,
    ) -> Result<PlaceId, NetError> {
        check_name_hint(name_hint)?;
        let name = self.place_names.resolve(name_hint);
        self.place_names.claim(name);
        let id = self.places.next_index();
        Ok(self.places.push(Place::new(id, name, tokens)))
    }

    /// Adds a transition whose label is `τ` or a visible action name.
    pub fn add_transition(
        &mut self,
        name_hint: Option<NameIndex>,
        label: &str,
    ) -> Result<TransitionId, NetError> {
        let label = Label::parse(label).ok_or_else(|| {
            NetError::InvalidArgument(format!(
                "transition label {label:?} is neither τ nor a lowercase-starting alphanumeric action"
            ))
        })?;
        self.add_labelled_transition(name_hint, label)
    }

    pub fn add_labelled_transition(
        &mut self,
        name_hint: Option<NameIndex>,
        label: Label,
    ) -> Result<TransitionId, NetError> {
        check_name_hint(name_hint)?;
        let name = self.transition_names.resolve(name_hint);
        self.transition_names.claim(name);
        let id = self.transitions.next_index();
        Ok(self.transitions.push(Transition::new(id, name, label)))
    }

    pub fn add_edge(&mut self, from: Node, to: Node, weight: Weight) -> Result<EdgeId, NetError> {
        self.check_node(from)?;
        self.check_node(to)?;
        match (from, to) {
            (Node::Place(_), Node::Transition(_)) => {
                if weight != 1 {
                    return Err(NetError::InvalidArgument(format!(
                        "place -> transition edges carry weight 1, got {weight}"
                    )));
                }
            }
            (Node::Transition(_), Node::Place(_)) => {
                if weight == 0 {
                    return Err(NetError::InvalidArgument(
                        "transition -> place edges carry a positive weight".to_owned(),
                    ));
                }
            }
            _ => {
                return Err(NetError::InvalidArgument(format!(
                    "edge {from} -> {to} does not join a place and a transition"
                )));
            }
        }
        if self.find_edge(from, to).is_some() {
            return Err(NetError::DuplicateEdge { from, to });
        }

        let id = self.edges.next_index();
        self.edges.push(Edge {
            id,
            from,
            to,
            weight,
        });
        self.outgoing_mut(from).push(id);
        self.incoming_mut(to).push(id);
        Ok(id)
    }

    /// Edge going from `from` to `to`, if any.
    pub fn find_edge(&self, from: Node, to: Node) -> Option<EdgeId> {
        self.outgoing(from)?
            .iter()
            .copied()
            .find(|edge| self.edges[*edge].to == to)
    }

    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<Edge, NetError> {
        let removed = *self.edges.get(edge).ok_or_else(|| unrelated(edge))?;
        self.outgoing_mut(removed.from).retain(|e| *e != edge);
        self.incoming_mut(removed.to).retain(|e| *e != edge);

        if let Some(SwapRemoved {
            moved_from: Some(old),
            ..
        }) = self.edges.swap_remove(edge)
        {
            self.edges[edge].id = edge;
            let moved = self.edges[edge];
            replace_handle(self.outgoing_mut(moved.from), old, edge);
            replace_handle(self.incoming_mut(moved.to), old, edge);
        }
        Ok(removed)
    }

    /// Removes the place and every edge touching it. The last place takes over
    /// the freed handle.
    pub fn remove_place(&mut self, place: PlaceId) -> Result<Place, NetError> {
        if !self.places.contains(place) {
            return Err(unrelated(place));
        }
        self.detach_all(Node::Place(place))?;

        let SwapRemoved { value, moved_from } =
            self.places.swap_remove(place).ok_or_else(|| unrelated(place))?;
        self.place_names.release(value.name);
        if let Some(old) = moved_from {
            log::trace!("place {old} renumbered to {place}");
            self.places[place].id = place;
            self.renumber(Node::Place(place));
        }
        Ok(value)
    }

    /// Removes the transition and every edge touching it. The last transition
    /// takes over the freed handle.
    pub fn remove_transition(&mut self, transition: TransitionId) -> Result<Transition, NetError> {
        if !self.transitions.contains(transition) {
            return Err(unrelated(transition));
        }
        self.detach_all(Node::Transition(transition))?;

        let SwapRemoved { value, moved_from } = self
            .transitions
            .swap_remove(transition)
            .ok_or_else(|| unrelated(transition))?;
        self.transition_names.release(value.name);
        if let Some(old) = moved_from {
            log::trace!("transition {old} renumbered to {transition}");
            self.transitions[transition].id = transition;
            self.renumber(Node::Transition(transition));
        }
        Ok(value)
    }

    pub fn set_tokens(&mut self, place: PlaceId, tokens: Weight) -> Result<(), NetError> {
        let place = self.places.get_mut(place).ok_or_else(|| unrelated(place))?;
        place.tokens = tokens;
        Ok(())
    }

    pub fn set_label(&mut self, transition: TransitionId, label: &str) -> Result<(), NetError> {
        let parsed = Label::parse(label)
            .ok_or_else(|| NetError::InvalidArgument(format!("invalid transition label {label:?}")))?;
        let transition = self
            .transitions
            .get_mut(transition)
            .ok_or_else(|| unrelated(transition))?;
        transition.label = parsed;
        Ok(())
    }

    /// Places feeding `transition`, in edge order. Empty for foreign handles.
    pub fn preset(&self, transition: TransitionId) -> impl Iterator<Item = PlaceId> + '_ {
        self.transitions
            .get(transition)
            .into_iter()
            .flat_map(|transition| transition.incoming.iter())
            .filter_map(|edge| self.edges[*edge].from.as_place())
    }

    /// Places produced by `transition` together with the edge weight.
    pub fn postset(
        &self,
        transition: TransitionId,
    ) -> impl Iterator<Item = (PlaceId, Weight)> + '_ {
        self.transitions
            .get(transition)
            .into_iter()
            .flat_map(|transition| transition.outgoing.iter())
            .filter_map(|edge| {
                let edge = &self.edges[*edge];
                edge.to.as_place().map(|place| (place, edge.weight))
            })
    }

    /// Transitions consuming from `place`, in edge order.
    pub fn consumers(&self, place: PlaceId) -> impl Iterator<Item = TransitionId> + '_ {
        self.places
            .get(place)
            .into_iter()
            .flat_map(|place| place.outgoing.iter())
            .filter_map(|edge| self.edges[*edge].to.as_transition())
    }

    /// Checks every structural invariant listed on [`Net`].
    pub fn check_consistency(&self) -> Result<(), String> {
        for (id, place) in self.places.iter_enumerated() {
            if place.id != id {
                return Err(format!("place stored at {id} claims id {}", place.id));
            }
        }
        for (id, transition) in self.transitions.iter_enumerated() {
            if transition.id != id {
                return Err(format!(
                    "transition stored at {id} claims id {}",
                    transition.id
                ));
            }
        }
        for (id, edge) in self.edges.iter_enumerated() {
            if edge.id != id {
                return Err(format!("edge stored at {id} claims id {}", edge.id));
            }
            let listed_out = self
                .outgoing(edge.from)
                .is_some_and(|adj| adj.iter().filter(|e| **e == id).count() == 1);
            let listed_in = self
                .incoming(edge.to)
                .is_some_and(|adj| adj.iter().filter(|e| **e == id).count() == 1);
            if !listed_out || !listed_in {
                return Err(format!("{id} is missing from its endpoints' adjacency"));
            }
        }
        let nodes = self
            .places
            .indices()
            .map(Node::Place)
            .chain(self.transitions.indices().map(Node::Transition));
        for node in nodes {
            let outgoing = self.outgoing(node).into_iter().flatten();
            let incoming = self.incoming(node).into_iter().flatten();
            for edge in outgoing {
                if self.edges.get(*edge).is_none_or(|e| e.from != node) {
                    return Err(format!("{node} lists foreign outgoing {edge}"));
                }
            }
            for edge in incoming {
                if self.edges.get(*edge).is_none_or(|e| e.to != node) {
                    return Err(format!("{node} lists foreign incoming {edge}"));
                }
            }
        }
        Ok(())
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph PetriNet {{");
        let _ = writeln!(&mut dot, "    rankdir=LR;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for (place_id, place) in self.places.iter_enumerated() {
            let _ = writeln!(
                &mut dot,
                "    place_{} [label=\"{}\\n{}\", shape=circle, style=filled, fillcolor=\"#e3f2fd\"];",
                place_id.index(),
                place.display_name(),
                place.tokens
            );
        }

        for (transition_id, transition) in self.transitions.iter_enumerated() {
            let _ = writeln!(
                &mut dot,
                "    trans_{} [label=\"{}\\n{}\", shape=box, style=filled, fillcolor=\"#ffe0b2\"];",
                transition_id.index(),
                transition.display_name(),
                escape_label(transition.label.as_str())
            );
        }

        for edge in self.edges.iter() {
            let (from, to) = (dot_node(edge.from), dot_node(edge.to));
            if edge.weight == 1 {
                let _ = writeln!(&mut dot, "    {} -> {};", from, to);
            } else {
                let _ = writeln!(
                    &mut dot,
                    "    {} -> {} [label=\"{}\"];",
                    from, to, edge.weight
                );
            }
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }

    fn check_node(&self, node: Node) -> Result<(), NetError> {
        let known = match node {
            Node::Place(place) => self.places.contains(place),
            Node::Transition(transition) => self.transitions.contains(transition),
        };
        if known { Ok(()) } else { Err(unrelated(node)) }
    }

    fn outgoing(&self, node: Node) -> Option<&Adjacency> {
        match node {
            Node::Place(place) => self.places.get(place).map(|p| &p.outgoing),
            Node::Transition(transition) => self.transitions.get(transition).map(|t| &t.outgoing),
        }
    }

    fn incoming(&self, node: Node) -> Option<&Adjacency> {
        match node {
            Node::Place(place) => self.places.get(place).map(|p| &p.incoming),
            Node::Transition(transition) => self.transitions.get(transition).map(|t| &t.incoming),
        }
    }

    // Callers validate `node` first.
    fn outgoing_mut(&mut self, node: Node) -> &mut Adjacency {
        match node {
            Node::Place(place) => &mut self.places[place].outgoing,
            Node::Transition(transition) => &mut self.transitions[transition].outgoing,
        }
    }

    fn incoming_mut(&mut self, node: Node) -> &mut Adjacency {
        match node {
            Node::Place(place) => &mut self.places[place].incoming,
            Node::Transition(transition) => &mut self.transitions[transition].incoming,
        }
    }

    fn detach_all(&mut self, node: Node) -> Result<(), NetError> {
        while let Some(&edge) = self.incoming_mut(node).last() {
            self.remove_edge(edge)?;
        }
        while let Some(&edge) = self.outgoing_mut(node).last() {
            self.remove_edge(edge)?;
        }
        Ok(())
    }

    fn retag(&mut self, tag: NetTag) {
        self.tag = tag;
        self.places.retag(tag);
        self.transitions.retag(tag);
        self.edges.retag(tag);
        for place in self.places.iter_mut() {
            place.id = PlaceId::from_parts(tag, place.id.index());
            retag_adjacency(&mut place.incoming, tag);
            retag_adjacency(&mut place.outgoing, tag);
        }
        for transition in self.transitions.iter_mut() {
            transition.id = TransitionId::from_parts(tag, transition.id.index());
            retag_adjacency(&mut transition.incoming, tag);
            retag_adjacency(&mut transition.outgoing, tag);
        }
        for edge in self.edges.iter_mut() {
            edge.id = EdgeId::from_parts(tag, edge.id.index());
            edge.from = retag_node(edge.from, tag);
            edge.to = retag_node(edge.to, tag);
        }
    }

    /// Points every edge of the node now stored under `node` back at it.
    fn renumber(&mut self, node: Node) {
        let incoming = self.incoming_mut(node).clone();
        let outgoing = self.outgoing_mut(node).clone();
        for edge in incoming {
            self.edges[edge].to = node;
        }
        for edge in outgoing {
            self.edges[edge].from = node;
        }
    }
}

fn check_name_hint(name_hint: Option<NameIndex>) -> Result<(), NetError> {
    match name_hint {
        Some(0) => Err(NetError::InvalidArgument(
            "display-name indices start at 1".to_owned(),
        )),
        _ => Ok(()),
    }
}

fn retag_adjacency(adjacency: &mut Adjacency, tag: NetTag) {
    for edge in adjacency.iter_mut() {
        *edge = EdgeId::from_parts(tag, edge.index());
    }
}

fn retag_node(node: Node, tag: NetTag) -> Node {
    match node {
        Node::Place(place) => Node::Place(PlaceId::from_parts(tag, place.index())),
        Node::Transition(transition) => {
            Node::Transition(TransitionId::from_parts(tag, transition.index()))
        }
    }
}

fn replace_handle(adjacency: &mut Adjacency, old: EdgeId, new: EdgeId) {
    for edge in adjacency.iter_mut() {
        if *edge == old {
            *edge = new;
        }
    }
}

fn dot_node(node: Node) -> String {
    match node {
        Node::Place(place) => format!("place_{}", place.index()),
        Node::Transition(transition) => format!("trans_{}", transition.index()),
    }
}

fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
