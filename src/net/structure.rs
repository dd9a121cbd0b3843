//! Static structure of a P/T net: places, transitions, arcs and labels.
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

use crate::net::ids::{EdgeId, PlaceId, TransitionId};

pub type Weight = u64;

/// Display-name index, `p1`, `t3`, ... Always positive.
pub type NameIndex = u32;

pub type Adjacency = SmallVec<[EdgeId; 4]>;

/// Symbol of the internal action.
pub const TAU: &str = "τ";

static VISIBLE_ACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Label {
    #[default]
    Tau,
    Visible(String),
}

impl Label {
    /// Parses `τ` or a visible action name starting with a lowercase letter.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == TAU {
            Some(Label::Tau)
        } else if VISIBLE_ACTION.is_match(raw) {
            Some(Label::Visible(raw.to_owned()))
        } else {
            None
        }
    }

    pub fn is_tau(&self) -> bool {
        matches!(self, Label::Tau)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Tau => TAU,
            Label::Visible(name) => name,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Place {
    pub id: PlaceId,
    pub name: NameIndex,
    pub tokens: Weight,
    /// Transition -> place edges.
    pub incoming: Adjacency,
    /// Place -> transition edges.
    pub outgoing: Adjacency,
}

impl Place {
    pub(crate) fn new(id: PlaceId, name: NameIndex, tokens: Weight) -> Self {
        Self {
            id,
            name,
            tokens,
            incoming: Adjacency::new(),
            outgoing: Adjacency::new(),
        }
    }

    /// `pN` display reference.
    pub fn display_name(&self) -> String {
        format!("p{}", self.name)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: TransitionId,
    pub name: NameIndex,
    pub label: Label,
    /// Place -> transition edges.
    pub incoming: Adjacency,
    /// Transition -> place edges.
    pub outgoing: Adjacency,
}

impl Transition {
    pub(crate) fn new(id: TransitionId, name: NameIndex, label: Label) -> Self {
        Self {
            id,
            name,
            label,
            incoming: Adjacency::new(),
            outgoing: Adjacency::new(),
        }
    }

    /// `tN` display reference.
    pub fn display_name(&self) -> String {
        format!("t{}", self.name)
    }

    pub fn is_tau(&self) -> bool {
        self.label.is_tau()
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition")
            .field(&self.display_name())
            .field(&self.label.as_str())
            .finish()
    }
}

/// Endpoint of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Place(PlaceId),
    Transition(TransitionId),
}

impl Node {
    pub fn as_place(self) -> Option<PlaceId> {
        match self {
            Node::Place(place) => Some(place),
            Node::Transition(_) => None,
        }
    }

    pub fn as_transition(self) -> Option<TransitionId> {
        match self {
            Node::Transition(transition) => Some(transition),
            Node::Place(_) => None,
        }
    }
}

impl From<PlaceId> for Node {
    fn from(value: PlaceId) -> Self {
        Node::Place(value)
    }
}

impl From<TransitionId> for Node {
    fn from(value: TransitionId) -> Self {
        Node::Transition(value)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Place(place) => fmt::Display::fmt(place, f),
            Node::Transition(transition) => fmt::Display::fmt(transition, f),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub id: EdgeId,
    pub from: Node,
    pub to: Node,
    pub weight: Weight,
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("id", &self.id)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("weight", &self.weight)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_accepts_tau_and_visible_actions() {
        assert_eq!(Label::parse("τ"), Some(Label::Tau));
        assert_eq!(Label::parse("send2"), Some(Label::Visible("send2".into())));
        assert_eq!(Label::parse("Send"), None);
        assert_eq!(Label::parse("a_b"), None);
        assert_eq!(Label::parse(""), None);
    }
}
