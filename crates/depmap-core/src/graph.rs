//! Graph wrapper using petgraph::StableDiGraph with custom NodeId

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::error::EngineError;
use crate::model::*;

/// The dependency graph. Nodes are unique by identity; parallel references
/// between the same pair collapse into one edge carrying all provenance.
///
/// Only the builder mutates a graph. Everything downstream sees `&DependencyGraph`.
pub struct DependencyGraph {
    inner: StableDiGraph<Node, Edge>,
    index: HashMap<String, NodeId>,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        DependencyGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Return the node for `identity`, adding it with `origin` if absent.
    pub(crate) fn ensure_node(
        &mut self,
        identity: &str,
        language: Option<String>,
        origin: NodeOrigin,
    ) -> NodeId {
        if let Some(&id) = self.index.get(identity) {
            return id;
        }
        let idx = self.inner.add_node(Node {
            id: NodeId::default(),
            identity: identity.to_string(),
            language,
            origin,
        });
        let id = NodeId(idx.index() as u32);
        if let Some(node) = self.inner.node_weight_mut(idx) {
            node.id = id;
        }
        self.index.insert(identity.to_string(), id);
        id
    }

    /// Record one raw reference from `source` to `target`, merging into an
    /// existing edge between the same pair.
    pub(crate) fn link(&mut self, source: NodeId, target: NodeId, raw: String) {
        let (a, b) = (to_index(source), to_index(target));
        if let Some(edge) = self
            .inner
            .find_edge(a, b)
            .and_then(|idx| self.inner.edge_weight_mut(idx))
        {
            edge.provenance.push(raw);
            return;
        }
        self.inner.add_edge(
            a,
            b,
            Edge {
                source,
                target,
                provenance: vec![raw],
            },
        );
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.inner.node_weight(to_index(id))
    }

    /// Find a node by identity.
    pub fn node_by_identity(&self, identity: &str) -> Option<&Node> {
        self.index.get(identity).and_then(|&id| self.node(id))
    }

    /// Get the edge between two nodes, if any.
    pub fn edge_between(&self, source: NodeId, target: NodeId) -> Option<&Edge> {
        self.inner
            .find_edge(to_index(source), to_index(target))
            .and_then(|idx| self.inner.edge_weight(idx))
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of deduplicated edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over all nodes in first-appearance order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Edges ordered by (source identity, target identity).
    pub fn sorted_edges(&self) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges().collect();
        edges.sort_by(|x, y| {
            let key = |e: &Edge| {
                (
                    self.node(e.source).map(|n| n.identity.as_str()),
                    self.node(e.target).map(|n| n.identity.as_str()),
                )
            };
            key(x).cmp(&key(y))
        });
        edges
    }

    /// Direct dependencies of a node.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inner
            .edges_directed(to_index(id), Direction::Outgoing)
            .map(|edge_ref| edge_ref.weight().target)
    }

    /// Number of distinct nodes this node depends on.
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.inner
            .edges_directed(to_index(id), Direction::Outgoing)
            .count()
    }

    /// Number of distinct nodes depending on this node.
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.inner
            .edges_directed(to_index(id), Direction::Incoming)
            .count()
    }

    pub fn internal_count(&self) -> usize {
        self.nodes().filter(|n| n.is_internal()).count()
    }

    pub fn external_count(&self) -> usize {
        self.nodes().filter(|n| n.is_external()).count()
    }

    /// Check that every edge's endpoints are in the node set and the
    /// identity index agrees with the stored nodes.
    pub fn verify(&self) -> Result<(), EngineError> {
        for edge_ref in self.inner.edge_references() {
            let edge = edge_ref.weight();
            for (end, stored) in [(edge_ref.source(), edge.source), (edge_ref.target(), edge.target)] {
                if to_index(stored) != end || self.inner.node_weight(end).is_none() {
                    return Err(EngineError::inconsistent(format!(
                        "edge {:?} -> {:?} references a node outside the graph",
                        edge.source, edge.target
                    )));
                }
            }
        }
        if self.index.len() != self.inner.node_count() {
            return Err(EngineError::inconsistent(format!(
                "identity index holds {} entries for {} nodes",
                self.index.len(),
                self.inner.node_count()
            )));
        }
        for (identity, &id) in &self.index {
            match self.node(id) {
                Some(node) if node.identity == *identity && node.id == id => {}
                _ => {
                    return Err(EngineError::inconsistent(format!(
                        "identity {:?} is indexed to a mismatched node {:?}",
                        identity, id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn to_index(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.0 as usize)
}
