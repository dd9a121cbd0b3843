//! Net documents: a serde model of a net, JSON and RON readers/writers and an
//! importer that builds through the public [`Net`] mutation API.
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::core::{Net, NetError};
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::structure::{NameIndex, Node, TAU, Weight};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("net rejected document: {0}")]
    Net(#[from] NetError),
    #[error("malformed node reference {0:?}, expected pN or tN")]
    BadReference(String),
    #[error("node {0:?} is declared twice")]
    DuplicateReference(String),
    #[error("arc references undeclared node {0:?}")]
    UnknownNode(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDocument {
    #[serde(default)]
    pub places: Vec<PlaceEntry>,
    #[serde(default)]
    pub transitions: Vec<TransitionEntry>,
    #[serde(default)]
    pub arcs: Vec<ArcEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceEntry {
    /// `pN`
    pub id: String,
    #[serde(default)]
    pub tokens: Weight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEntry {
    /// `tN`
    pub id: String,
    #[serde(default = "default_label")]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcEntry {
    pub from: String,
    pub to: String,
    #[serde(default = "default_weight")]
    pub weight: Weight,
}

fn default_label() -> String {
    TAU.to_owned()
}

fn default_weight() -> Weight {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Ron,
}

impl DocumentFormat {
    /// `.ron` files are RON, everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => DocumentFormat::Ron,
            _ => DocumentFormat::Json,
        }
    }
}

impl NetDocument {
    pub fn from_net(net: &Net) -> Self {
        let places = net
            .places()
            .iter()
            .map(|place| PlaceEntry {
                id: place.display_name(),
                tokens: place.tokens,
            })
            .collect();
        let transitions = net
            .transitions()
            .iter()
            .map(|transition| TransitionEntry {
                id: transition.display_name(),
                label: transition.label.as_str().to_owned(),
            })
            .collect();
        let arcs = net
            .edges()
            .iter()
            .map(|edge| ArcEntry {
                from: display_reference(net, edge.from),
                to: display_reference(net, edge.to),
                weight: edge.weight,
            })
            .collect();
        Self {
            places,
            transitions,
            arcs,
        }
    }

    pub fn to_net(&self) -> Result<Net, IoError> {
        let mut net = Net::empty();
        import_document(&mut net, self)?;
        Ok(net)
    }
}

fn display_reference(net: &Net, node: Node) -> String {
    match node {
        Node::Place(place) => net.places()[place].display_name(),
        Node::Transition(transition) => net.transitions()[transition].display_name(),
    }
}

/// Replaces the contents of `net` with `document`. On any failure the net is
/// left empty.
pub fn import_document(net: &mut Net, document: &NetDocument) -> Result<(), IoError> {
    net.clear();
    let result = populate(net, document);
    if let Err(err) = &result {
        log::warn!("discarding partially imported net: {err}");
        net.clear();
    }
    result
}

fn populate(net: &mut Net, document: &NetDocument) -> Result<(), IoError> {
    let mut places: HashMap<&str, PlaceId> = HashMap::new();
    let mut transitions: HashMap<&str, TransitionId> = HashMap::new();

    for entry in &document.places {
        let name = parse_reference(&entry.id, 'p')?;
        if places.contains_key(entry.id.as_str()) {
            return Err(IoError::DuplicateReference(entry.id.clone()));
        }
        let place = net.add_place(Some(name), entry.tokens)?;
        places.insert(&entry.id, place);
    }

    for entry in &document.transitions {
        let name = parse_reference(&entry.id, 't')?;
        if transitions.contains_key(entry.id.as_str()) {
            return Err(IoError::DuplicateReference(entry.id.clone()));
        }
        let transition = net.add_transition(Some(name), &entry.label)?;
        transitions.insert(&entry.id, transition);
    }

    let resolve = |reference: &str| -> Result<Node, IoError> {
        places
            .get(reference)
            .map(|place| Node::Place(*place))
            .or_else(|| transitions.get(reference).map(|t| Node::Transition(*t)))
            .ok_or_else(|| IoError::UnknownNode(reference.to_owned()))
    };
    for arc in &document.arcs {
        let from = resolve(&arc.from)?;
        let to = resolve(&arc.to)?;
        net.add_edge(from, to, arc.weight)?;
    }

    log::debug!(
        "imported {} places, {} transitions, {} arcs",
        net.places_len(),
        net.transitions_len(),
        net.edges_len()
    );
    Ok(())
}

/// Parses the canonical `pN`/`tN` form; `p01` or `p+1` would alias `p1`.
fn parse_reference(reference: &str, prefix: char) -> Result<NameIndex, IoError> {
    reference
        .strip_prefix(prefix)
        .and_then(|digits| digits.parse::<NameIndex>().ok())
        .filter(|name| *name > 0 && format!("{prefix}{name}") == reference)
        .ok_or_else(|| IoError::BadReference(reference.to_owned()))
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let pretty = PrettyConfig::default().new_line("\n".to_owned());
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn read_document<P: AsRef<Path>>(path: P) -> Result<NetDocument, IoError> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    match DocumentFormat::from_path(path) {
        DocumentFormat::Json => from_json_str(&content),
        DocumentFormat::Ron => from_ron_str(&content),
    }
}

pub fn write_document<P: AsRef<Path>>(path: P, document: &NetDocument) -> Result<(), IoError> {
    let path = path.as_ref();
    let content = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => to_json_string(document)?,
        DocumentFormat::Ron => to_ron_string(document)?,
    };
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = r#"{
        "places": [{ "id": "p1", "tokens": 1 }, { "id": "p2" }],
        "transitions": [{ "id": "t1", "label": "a" }, { "id": "t2" }],
        "arcs": [
            { "from": "p1", "to": "t1" },
            { "from": "t1", "to": "p2", "weight": 3 },
            { "from": "p2", "to": "t2" }
        ]
    }"#;

    #[test]
    fn imports_json_with_defaults() {
        let document: NetDocument = from_json_str(CHAIN).unwrap();
        let net = document.to_net().unwrap();

        assert_eq!(net.places_len(), 2);
        let p2 = net.places().handle(1).unwrap();
        let t1 = net.transitions().handle(0).unwrap();
        let t2 = net.transitions().handle(1).unwrap();
        assert_eq!(net.places()[p2].tokens, 0);
        assert!(net.transitions()[t2].is_tau());
        assert_eq!(net.edges_len(), 3);
        let produced = net.postset(t1).collect::<Vec<_>>();
        assert_eq!(produced, vec![(p2, 3)]);
    }

    #[test]
    fn failed_import_leaves_net_empty() {
        let mut document: NetDocument = from_json_str(CHAIN).unwrap();
        document.arcs.push(ArcEntry {
            from: "p1".into(),
            to: "t1".into(),
            weight: 1,
        });

        let mut net = Net::empty();
        net.add_place(None, 4).unwrap();
        let err = import_document(&mut net, &document).unwrap_err();
        assert!(matches!(err, IoError::Net(NetError::DuplicateEdge { .. })));
        assert!(net.is_empty());
        assert_eq!(net.edges_len(), 0);
    }

    #[test]
    fn rejects_undeclared_and_malformed_references() {
        let mut document: NetDocument = from_json_str(CHAIN).unwrap();
        document.arcs.push(ArcEntry {
            from: "p9".into(),
            to: "t1".into(),
            weight: 1,
        });
        assert!(matches!(document.to_net(), Err(IoError::UnknownNode(_))));

        document.places.push(PlaceEntry {
            id: "x1".into(),
            tokens: 0,
        });
        assert!(matches!(document.to_net(), Err(IoError::BadReference(_))));
    }

    #[test]
    fn rejects_non_canonical_references() {
        for reference in ["p01", "p+1", "p0", "p", "t1"] {
            assert!(
                matches!(parse_reference(reference, 'p'), Err(IoError::BadReference(_))),
                "{reference} accepted"
            );
        }
        assert_eq!(parse_reference("p10", 'p').unwrap(), 10);

        let mut document: NetDocument = from_json_str(CHAIN).unwrap();
        document.places.push(PlaceEntry {
            id: "p01".into(),
            tokens: 2,
        });
        assert!(matches!(document.to_net(), Err(IoError::BadReference(_))));
    }

    #[test]
    fn documents_round_trip_through_files() {
        let dir = std::env::temp_dir().join(format!("pn2ccs-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let document: NetDocument = from_json_str(CHAIN).unwrap();

        for file in ["chain.json", "chain.ron"] {
            let path = dir.join(file);
            write_document(&path, &document).unwrap();
            assert_eq!(read_document(&path).unwrap(), document);
        }
        let ron = std::fs::read_to_string(dir.join("chain.ron")).unwrap();
        assert!(ron.contains("places"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn export_then_ron_reimport_preserves_structure() {
        let document: NetDocument = from_json_str(CHAIN).unwrap();
        let net = document.to_net().unwrap();

        let ron = to_ron_string(&NetDocument::from_net(&net)).unwrap();
        let reloaded: NetDocument = from_ron_str(&ron).unwrap();
        assert_eq!(reloaded, document);
        assert_eq!(reloaded.transitions[1].label, TAU);
    }
}
