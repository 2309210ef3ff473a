//! All-pairs shortest-path precomputation, driven by edges rather than by
//! triple-pivot scanning, over a generic [`AdditiveWeight`].

use crate::graph::{AdditiveWeight, DirectedWeightedGraph, EdgeId, VertexId};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct TableEntry<W> {
    pub weight: W,
    pub prev_edge: Option<EdgeId>,
}

/// A dense `V x V` table of optional [`TableEntry`] values, and the edge list
/// used to reconstruct an itinerary between any two vertices.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct AllPairsRouter<W> {
    vertex_count: usize,
    table: Vec<Option<TableEntry<W>>>,
}

pub struct Route<W> {
    pub total_weight: W,
    pub edges: Vec<EdgeId>,
}

impl<W: AdditiveWeight> AllPairsRouter<W> {
    fn index(vertex_count: usize, from: VertexId, to: VertexId) -> usize {
        from * vertex_count + to
    }

    /// Builds the table by initializing the diagonal to the identity weight,
    /// relaxing over every edge, then relaxing over every intermediate vertex.
    pub fn build(graph: &DirectedWeightedGraph<W>) -> Self {
        let v = graph.vertex_count();
        let mut table: Vec<Option<TableEntry<W>>> = vec![None; v * v];

        for vertex in 0..v {
            table[Self::index(v, vertex, vertex)] =
                Some(TableEntry { weight: W::identity(), prev_edge: None });
        }

        for (edge_id, edge) in graph.edges().iter().enumerate() {
            let idx = Self::index(v, edge.from, edge.to);
            let better = match &table[idx] {
                None => true,
                Some(existing) => edge.weight < existing.weight,
            };
            if better {
                table[idx] = Some(TableEntry { weight: edge.weight.clone(), prev_edge: Some(edge_id) });
            }
        }

        for k in 0..v {
            for u in 0..v {
                let Some(uk) = table[Self::index(v, u, k)].clone() else { continue };
                for w in 0..v {
                    let Some(kw) = table[Self::index(v, k, w)].clone() else { continue };
                    let candidate_weight = uk.weight.clone() + kw.weight.clone();
                    let idx = Self::index(v, u, w);
                    let better = match &table[idx] {
                        None => true,
                        Some(existing) => candidate_weight < existing.weight,
                    };
                    if better {
                        table[idx] = Some(TableEntry { weight: candidate_weight, prev_edge: kw.prev_edge });
                    }
                }
            }
        }

        Self { vertex_count: v, table }
    }

    fn entry(&self, from: VertexId, to: VertexId) -> Option<&TableEntry<W>> {
        self.table[Self::index(self.vertex_count, from, to)].as_ref()
    }

    /// Reconstructs the minimum-weight path from `from` to `to`, walking
    /// predecessor edges backwards. Returns `None` if no path exists.
    pub fn build_route(&self, graph: &DirectedWeightedGraph<W>, from: VertexId, to: VertexId) -> Option<Route<W>> {
        let total = self.entry(from, to)?;
        let total_weight = total.weight.clone();

        let mut edges = Vec::new();
        let mut current = to;
        loop {
            let entry = self.entry(from, current)?;
            match entry.prev_edge {
                None => break,
                Some(edge_id) => {
                    edges.push(edge_id);
                    current = graph.edge(edge_id).from;
                }
            }
        }
        edges.reverse();

        Some(Route { total_weight, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Add;

    #[derive(Debug, Clone, PartialEq, PartialOrd)]
    struct Scalar(f64);

    impl Add for Scalar {
        type Output = Scalar;
        fn add(self, rhs: Scalar) -> Scalar {
            Scalar(self.0 + rhs.0)
        }
    }

    impl AdditiveWeight for Scalar {
        fn identity() -> Self {
            Scalar(0.0)
        }
    }

    #[test]
    fn finds_shortest_two_hop_path() {
        let mut g: DirectedWeightedGraph<Scalar> = DirectedWeightedGraph::new(3);
        g.add_edge(0, 1, Scalar(1.0));
        g.add_edge(1, 2, Scalar(1.0));
        g.add_edge(0, 2, Scalar(5.0));
        let router = AllPairsRouter::build(&g);
        let route = router.build_route(&g, 0, 2).expect("route exists");
        assert_eq!(route.total_weight, Scalar(2.0));
        assert_eq!(route.edges, vec![0, 1]);
    }

    #[test]
    fn no_route_when_unreachable() {
        let mut g: DirectedWeightedGraph<Scalar> = DirectedWeightedGraph::new(2);
        g.add_edge(0, 0, Scalar(0.0));
        let router = AllPairsRouter::build(&g);
        assert!(router.build_route(&g, 0, 1).is_none());
    }

    #[test]
    fn same_vertex_route_is_empty_and_zero_weight() {
        let g: DirectedWeightedGraph<Scalar> = DirectedWeightedGraph::new(2);
        let router = AllPairsRouter::build(&g);
        let route = router.build_route(&g, 1, 1).expect("route exists");
        assert_eq!(route.total_weight, Scalar(0.0));
        assert!(route.edges.is_empty());
    }

    #[test]
    fn incumbent_wins_on_tie() {
        let mut g: DirectedWeightedGraph<Scalar> = DirectedWeightedGraph::new(2);
        let first = g.add_edge(0, 1, Scalar(1.0));
        let _second = g.add_edge(0, 1, Scalar(1.0));
        let router = AllPairsRouter::build(&g);
        let route = router.build_route(&g, 0, 1).expect("route exists");
        assert_eq!(route.edges, vec![first]);
    }
}
