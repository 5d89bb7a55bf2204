//! Component-level binding graph.
//!
//! Nodes are components; each binding adds an edge from the component
//! owning the output to the component owning the input. A component
//! bound to itself is a cycle of length one.

use std::collections::BTreeSet;

use super::types::ComponentIdx;

/// Directed graph of component dependencies.
#[derive(Debug, Clone, Default)]
pub struct BindingGraph {
    edges: Vec<BTreeSet<usize>>,
}

impl BindingGraph {
    pub fn new(components: usize) -> Self {
        Self {
            edges: vec![BTreeSet::new(); components],
        }
    }

    pub fn add_edge(&mut self, from: ComponentIdx, to: ComponentIdx) {
        let needed = from.0.max(to.0) + 1;
        if self.edges.len() < needed {
            self.edges.resize(needed, BTreeSet::new());
        }
        self.edges[from.0].insert(to.0);
    }

    /// First cycle found by depth-first search from the lowest index,
    /// returned as a closed path (`[p, q, p]`).
    pub fn find_cycle(&self) -> Option<Vec<ComponentIdx>> {
        fn dfs(
            node: usize,
            edges: &[BTreeSet<usize>],
            visited: &mut [bool],
            path: &mut Vec<usize>,
        ) -> Option<Vec<usize>> {
            if let Some(start) = path.iter().position(|&n| n == node) {
                let mut cycle = path[start..].to_vec();
                cycle.push(node);
                return Some(cycle);
            }
            if visited[node] {
                return None; // already explored
            }
            visited[node] = true;
            path.push(node);
            for &next in &edges[node] {
                if let Some(cycle) = dfs(next, edges, visited, path) {
                    return Some(cycle);
                }
            }
            path.pop();
            None
        }

        let mut visited = vec![false; self.edges.len()];
        let mut path = Vec::new();
        (0..self.edges.len()).find_map(|start| {
            dfs(start, &self.edges, &mut visited, &mut path)
                .map(|cycle| cycle.into_iter().map(ComponentIdx).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(usize, usize)]) -> BindingGraph {
        let mut g = BindingGraph::new(n);
        for &(a, b) in edges {
            g.add_edge(ComponentIdx(a), ComponentIdx(b));
        }
        g
    }

    fn ids(v: &[usize]) -> Vec<ComponentIdx> {
        v.iter().map(|&i| ComponentIdx(i)).collect()
    }

    #[test]
    fn test_chain_is_acyclic() {
        let g = graph(3, &[(0, 1), (1, 2)]);
        assert_eq!(g.find_cycle(), None);
    }

    #[test]
    fn test_two_cycle() {
        let g = graph(2, &[(0, 1), (1, 0)]);
        assert_eq!(g.find_cycle(), Some(ids(&[0, 1, 0])));
    }

    #[test]
    fn test_self_loop_and_diamond() {
        assert_eq!(graph(1, &[(0, 0)]).find_cycle(), Some(ids(&[0, 0])));
        let diamond = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(diamond.find_cycle(), None);
    }

    #[test]
    fn test_cycle_found_behind_prefix() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3), (3, 1)]);
        assert_eq!(g.find_cycle(), Some(ids(&[1, 2, 3, 1])));
    }
}
