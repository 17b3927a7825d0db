//! Routing policy — how an agent entering a vertex picks its next edge.
//!
//! # Message passing, not back-references
//!
//! The original model has `Agent::desired_destination` reach back into the
//! network it lives in. Here the scheduler instead calls `Router::choose`
//! directly, handing it the out-edges of the vertex the agent is entering —
//! neither the agent nor the router holds a reference to the network.

use qn_core::{EdgeId, NodeId, SimRng};

use crate::error::{AgentError, AgentResult};

/// Pluggable routing engine, queried once per transfer.
pub trait Router: Send + Sync {
    /// Pick an out-edge at `vertex` given its full list of out-edges (in
    /// insertion order).
    ///
    /// `out_edges` is never empty when called correctly — the scheduler is
    /// responsible for resolving dead ends (no out-edges) to a null-sink
    /// station before this is reached; a `Router` that is handed an empty
    /// slice anyway should return `AgentError::NoOutEdges`.
    fn choose(
        &self,
        vertex: NodeId,
        out_edges: &[EdgeId],
        rng: &mut SimRng,
    ) -> AgentResult<EdgeId>;
}

// ── UniformRouter ─────────────────────────────────────────────────────────────

/// Default policy: uniform pick among the vertex's out-edges.
#[derive(Default)]
pub struct UniformRouter;

impl Router for UniformRouter {
    fn choose(
        &self,
        vertex: NodeId,
        out_edges: &[EdgeId],
        rng: &mut SimRng,
    ) -> AgentResult<EdgeId> {
        if out_edges.is_empty() {
            return Err(AgentError::NoOutEdges { vertex });
        }
        Ok(out_edges[rng.gen_index(out_edges.len())])
    }
}

// ── RoutingTable ──────────────────────────────────────────────────────────────

/// Explicit per-vertex routing probabilities, overriding the uniform default
/// for whichever vertices have an entry.
///
/// Entries are stored sparsely (`Vec<Option<Vec<f64>>>` indexed by
/// `NodeId`); a vertex with no entry falls back to uniform. The k-th
/// probability in a vertex's vector corresponds to the k-th out-edge in
/// `out_edges` order — callers must keep the vector's length in sync with
/// that vertex's out-degree, enforced at `set_vertex`/`set_matrix` time.
#[derive(Default, Clone)]
pub struct RoutingTable {
    rows: Vec<Option<Vec<f64>>>,
}

const PROB_TOLERANCE: f64 = 1e-9;

impl RoutingTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    fn ensure_len(&mut self, vertex: NodeId) {
        let idx = vertex.index();
        if self.rows.len() <= idx {
            self.rows.resize(idx + 1, None);
        }
    }

    /// Checks that `probs` is a legal routing vector for `vertex` without
    /// mutating anything: `probs.len()` must equal `out_degree` and entries
    /// must sum to 1 within `1e-9` absolute tolerance.
    fn validate_vertex(vertex: NodeId, out_degree: usize, probs: &[f64]) -> AgentResult<()> {
        if probs.len() != out_degree {
            return Err(AgentError::RoutingLengthMismatch {
                vertex,
                expected: out_degree,
                got: probs.len(),
            });
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > PROB_TOLERANCE {
            return Err(AgentError::RoutingSumMismatch { vertex, sum });
        }
        Ok(())
    }

    /// Set the routing vector for a single vertex. `probs.len()` must equal
    /// `out_degree`; entries must sum to 1 within `1e-9` absolute tolerance.
    /// On error the previous vector (if any) is left untouched.
    pub fn set_vertex(
        &mut self,
        vertex: NodeId,
        out_degree: usize,
        probs: Vec<f64>,
    ) -> AgentResult<()> {
        Self::validate_vertex(vertex, out_degree, &probs)?;
        self.ensure_len(vertex);
        self.rows[vertex.index()] = Some(probs);
        Ok(())
    }

    /// Set a full `V x V` matrix at once: row = origin vertex, column =
    /// destination vertex. Each row is projected onto the origin vertex's
    /// out-edges (in order, by destination vertex of each out-edge) before
    /// being validated the same way `set_vertex` validates a single row.
    ///
    /// `out_edges_of` maps a vertex to its out-edges in order; `edge_to` maps
    /// an edge to its destination vertex. Every row is projected and
    /// validated *before* any of them is written into `self.rows`, so a
    /// matrix that fails partway through leaves every vertex's previous
    /// routing vector untouched — no partial update.
    pub fn set_matrix(
        &mut self,
        num_vertices: usize,
        matrix: &[Vec<f64>],
        out_edges_of: impl Fn(NodeId) -> Vec<EdgeId>,
        edge_to: impl Fn(EdgeId) -> NodeId,
    ) -> AgentResult<()> {
        if matrix.len() != num_vertices {
            return Err(AgentError::RoutingMatrixShape {
                expected: num_vertices,
                got: matrix.len(),
            });
        }

        let mut projected_rows = Vec::with_capacity(num_vertices);
        for (src, row) in matrix.iter().enumerate() {
            if row.len() != num_vertices {
                return Err(AgentError::RoutingMatrixShape {
                    expected: num_vertices,
                    got: row.len(),
                });
            }
            let src_id = NodeId(src as u32);
            let out_edges = out_edges_of(src_id);
            let projected: Vec<f64> = out_edges
                .iter()
                .map(|&e| row[edge_to(e).index()])
                .collect();
            Self::validate_vertex(src_id, out_edges.len(), &projected)?;
            projected_rows.push((src_id, projected));
        }

        for (src_id, projected) in projected_rows {
            self.ensure_len(src_id);
            self.rows[src_id.index()] = Some(projected);
        }
        Ok(())
    }

    /// The stored routing vector for `vertex`, or `None` if it falls back to
    /// uniform.
    pub fn get(&self, vertex: NodeId) -> Option<&[f64]> {
        self.rows
            .get(vertex.index())
            .and_then(|row| row.as_ref())
            .map(|v| v.as_slice())
    }
}

impl Router for RoutingTable {
    fn choose(
        &self,
        vertex: NodeId,
        out_edges: &[EdgeId],
        rng: &mut SimRng,
    ) -> AgentResult<EdgeId> {
        if out_edges.is_empty() {
            return Err(AgentError::NoOutEdges { vertex });
        }
        match self.get(vertex) {
            None => Ok(out_edges[rng.gen_index(out_edges.len())]),
            Some(probs) => {
                let mut roll: f64 = rng.gen_range(0.0..1.0);
                for (i, &p) in probs.iter().enumerate() {
                    if roll < p {
                        return Ok(out_edges[i]);
                    }
                    roll -= p;
                }
                // Floating-point slop: fall back to the last edge.
                Ok(*out_edges.last().unwrap())
            }
        }
    }
}
