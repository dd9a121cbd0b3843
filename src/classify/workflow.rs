use itertools::Itertools;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, GraphRef, IntoNeighbors, Reversed, Visitable};

use crate::net::{Net, Node, Weight};

/// One source place, one sink place, and every node lies on a path from the
/// source and on a path to the sink.
pub fn is_workflow_net(net: &Net) -> bool {
    let source = net
        .places()
        .iter()
        .filter(|place| place.incoming.is_empty())
        .exactly_one();
    let sink = net
        .places()
        .iter()
        .filter(|place| place.outgoing.is_empty())
        .exactly_one();
    let (Ok(source), Ok(sink)) = (source, sink) else {
        return false;
    };

    let graph = flow_graph(net);
    let total = graph.node_count();
    let forward = visited(&graph, graph_node(net, Node::Place(source.id)));
    if forward != total {
        log::trace!("only {forward} of {total} nodes reachable from the source");
        return false;
    }
    let backward = visited(Reversed(&graph), graph_node(net, Node::Place(sink.id)));
    if backward != total {
        log::trace!("only {backward} of {total} nodes reach the sink");
        return false;
    }
    true
}

/// Places occupy graph indices `0..|P|`, transitions follow.
fn flow_graph(net: &Net) -> DiGraph<Node, Weight> {
    let mut graph = DiGraph::with_capacity(
        net.places_len() + net.transitions_len(),
        net.edges_len(),
    );
    for place in net.places().indices() {
        graph.add_node(Node::Place(place));
    }
    for transition in net.transitions().indices() {
        graph.add_node(Node::Transition(transition));
    }
    for edge in net.edges().iter() {
        graph.add_edge(
            graph_node(net, edge.from),
            graph_node(net, edge.to),
            edge.weight,
        );
    }
    graph
}

fn graph_node(net: &Net, node: Node) -> NodeIndex {
    match node {
        Node::Place(place) => NodeIndex::new(place.index()),
        Node::Transition(transition) => NodeIndex::new(net.places_len() + transition.index()),
    }
}

fn visited<G>(graph: G, start: G::NodeId) -> usize
where
    G: GraphRef + IntoNeighbors + Visitable,
{
    let mut bfs = Bfs::new(graph, start);
    let mut count = 0;
    while bfs.next(graph).is_some() {
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    /// p1 -> t1 -> p2 -> t2 -> p3
    fn sequence() -> Net {
        let mut net = Net::empty();
        let p1 = net.add_place(None, 1).unwrap();
        let p2 = net.add_place(None, 0).unwrap();
        let p3 = net.add_place(None, 0).unwrap();
        let t1 = net.add_transition(None, "a").unwrap();
        let t2 = net.add_transition(None, "b").unwrap();
        net.add_edge(p1.into(), t1.into(), 1).unwrap();
        net.add_edge(t1.into(), p2.into(), 1).unwrap();
        net.add_edge(p2.into(), t2.into(), 1).unwrap();
        net.add_edge(t2.into(), p3.into(), 1).unwrap();
        net
    }

    #[test]
    fn sequence_is_workflow() {
        assert!(is_workflow_net(&sequence()));
    }

    #[test]
    fn dangling_transition_breaks_backward_reachability() {
        let mut net = sequence();
        // consumes from p2 but produces nothing, so it never reaches the sink
        let t3 = net.add_transition(None, "c").unwrap();
        let p2 = net.places().handle(1).unwrap();
        net.add_edge(p2.into(), t3.into(), 1).unwrap();
        assert!(!is_workflow_net(&net));
    }

    #[test]
    fn unreachable_transition_breaks_forward_reachability() {
        let mut net = sequence();
        let t3 = net.add_transition(None, "c").unwrap();
        let p3 = net.places().handle(2).unwrap();
        net.add_edge(t3.into(), p3.into(), 1).unwrap();
        assert!(!is_workflow_net(&net));
    }

    #[test]
    fn needs_exactly_one_source_and_sink() {
        let mut net = sequence();
        net.add_place(None, 0).unwrap();
        assert!(!is_workflow_net(&net));
        assert!(!is_workflow_net(&Net::empty()));
    }
}
