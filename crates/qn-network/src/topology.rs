//! The network's directed graph, in Compressed Sparse Row (CSR) form.
//!
//! # Data layout
//!
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_ids[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! `edge_to` and `edge_type` are indexed by `EdgeId` directly (an edge's
//! `EdgeId` is its position in the sorted-by-source array, not its
//! insertion order — see [`TopologyBuilder::build`]). A station is attached
//! to every edge, one-to-one, so an edge's `EdgeId` doubles as its
//! station's `StationId`.

use qn_core::{EdgeId, NodeId};

/// A directed graph in CSR format: fast to walk a vertex's out-edges, not
/// meant to be mutated after [`TopologyBuilder::build`].
#[derive(Clone)]
pub struct Topology {
    /// CSR row pointer. Outgoing edges of node `n` are at indices
    /// `node_out_start[n] .. node_out_start[n+1]` into `edge_ids`/`edge_to`.
    node_out_start: Vec<u32>,
    /// `edge_ids[i] == EdgeId(i)` for all `i` — kept as a materialized array
    /// so [`Topology::out_edges`] can hand back a plain slice, matching the
    /// shape [`qn_agent::Router::choose`] expects.
    edge_ids: Vec<EdgeId>,
    edge_from: Vec<NodeId>,
    edge_to: Vec<NodeId>,
    edge_type: Vec<String>,
    node_count: usize,
}

impl Topology {
    pub fn empty() -> Self {
        TopologyBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    #[inline]
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        &self.edge_ids[start..end]
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    #[inline]
    pub fn edge_target(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    #[inline]
    pub fn edge_source(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    pub fn edge_type(&self, edge: EdgeId) -> &str {
        &self.edge_type[edge.index()]
    }
}

struct RawEdge {
    from: NodeId,
    to: NodeId,
    edge_type: String,
}

/// Builds a [`Topology`] incrementally; accepts edges in any order and
/// sorts them by source node at [`build`](Self::build) time to produce the
/// CSR row pointer.
pub struct TopologyBuilder {
    node_count: usize,
    raw_edges: Vec<RawEdge>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self {
            node_count: 0,
            raw_edges: Vec::new(),
        }
    }

    /// Adds a vertex and returns its `NodeId` (sequential from 0).
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.node_count as u32);
        self.node_count += 1;
        id
    }

    /// Adds `count` vertices at once, returning the first one allocated.
    pub fn add_nodes(&mut self, count: usize) -> NodeId {
        let first = NodeId(self.node_count as u32);
        self.node_count += count;
        first
    }

    /// Adds a directed edge; its final `EdgeId` is assigned at `build()`
    /// time, once every edge is sorted by source node.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, edge_type: impl Into<String>) {
        self.raw_edges.push(RawEdge {
            from,
            to,
            edge_type: edge_type.into(),
        });
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Consumes the builder and produces a [`Topology`].
    ///
    /// Edges are grouped by source node with a stable sort, so two edges
    /// sharing a source keep their insertion order in the resulting
    /// `out_edges` slice — routing tables built against that order stay
    /// deterministic run to run.
    pub fn build(self) -> Topology {
        let node_count = self.node_count;
        let edge_count = self.raw_edges.len();

        let mut raw: Vec<(usize, RawEdge)> = self.raw_edges.into_iter().enumerate().collect();
        raw.sort_by_key(|(insertion_order, e)| (e.from.0, *insertion_order));

        let edge_from: Vec<NodeId> = raw.iter().map(|(_, e)| e.from).collect();
        let edge_to: Vec<NodeId> = raw.iter().map(|(_, e)| e.to).collect();
        let edge_type: Vec<String> = raw.iter().map(|(_, e)| e.edge_type.clone()).collect();
        let edge_ids: Vec<EdgeId> = (0..edge_count as u32).map(EdgeId).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for (_, e) in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        Topology {
            node_out_start,
            edge_ids,
            edge_from,
            edge_to,
            edge_type,
            node_count,
        }
    }
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_edges_grouped_by_source_in_insertion_order() {
        let mut b = TopologyBuilder::new();
        let n0 = b.add_node();
        let n1 = b.add_node();
        let n2 = b.add_node();
        b.add_edge(n1, n2, "a");
        b.add_edge(n0, n1, "b");
        b.add_edge(n0, n2, "c");
        let topo = b.build();

        assert_eq!(topo.node_count(), 3);
        assert_eq!(topo.edge_count(), 3);

        let out0 = topo.out_edges(n0);
        assert_eq!(out0.len(), 2);
        assert_eq!(topo.edge_type(out0[0]), "b");
        assert_eq!(topo.edge_type(out0[1]), "c");
        assert_eq!(topo.edge_target(out0[0]), n1);
        assert_eq!(topo.edge_source(out0[0]), n0);

        let out1 = topo.out_edges(n1);
        assert_eq!(out1.len(), 1);
        assert_eq!(topo.edge_type(out1[0]), "a");

        assert_eq!(topo.out_degree(n2), 0);
    }

    #[test]
    fn empty_topology_has_no_nodes_or_edges() {
        let topo = Topology::empty();
        assert_eq!(topo.node_count(), 0);
        assert_eq!(topo.edge_count(), 0);
    }
}
