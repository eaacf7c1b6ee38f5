use crate::grid::{GridGraph, NodeId};
use std::collections::VecDeque;

/// BFS wave plus DFS backtrack over a [`GridGraph`]. Reuses one
/// generation counter across calls instead of clearing `visited`/`step`
/// on every node between runs: a node is "visited this generation" iff
/// its stamped generation equals the solver's current one.
pub struct MazeSolver {
    generation: u32,
    stamped: Vec<u32>,
    step: Vec<Option<u32>>,
    from: Vec<Option<NodeId>>,
}

impl MazeSolver {
    pub fn new(graph: &GridGraph) -> Self {
        let n = graph.num_nodes();
        Self {
            generation: 0,
            stamped: vec![0; n],
            step: vec![None; n],
            from: vec![None; n],
        }
    }

    fn visited(&self, id: NodeId) -> bool {
        self.stamped[id.0 as usize] == self.generation
    }

    fn mark(&mut self, id: NodeId, step: u32, from: Option<NodeId>) {
        let i = id.0 as usize;
        self.stamped[i] = self.generation;
        self.step[i] = Some(step);
        self.from[i] = from;
    }

    /// Breadth-first wave from `sources` outward, returning the first
    /// node in `targets` reached. A target is accepted as soon as it is
    /// dequeued from the frontier even if it is itself flagged
    /// `obstacle` (pins sit on nodes the blockage pass may have
    /// stamped); only non-target neighbors are filtered by `obstacle`.
    pub fn bfs_multi_target(
        &mut self,
        graph: &GridGraph,
        sources: &[NodeId],
        targets: &[NodeId],
    ) -> Option<NodeId> {
        self.generation += 1;
        let mut queue = VecDeque::new();
        for &s in sources {
            if !self.visited(s) {
                self.mark(s, 0, None);
                queue.push_back(s);
            }
        }

        while let Some(id) = queue.pop_front() {
            let step = self.step[id.0 as usize].unwrap_or(0) + 1;
            for next in graph.get_neighbors(id) {
                if self.visited(next) {
                    continue;
                }
                if targets.contains(&next) {
                    self.mark(next, step, Some(id));
                    return Some(next);
                }
                if graph.node(next).obstacle {
                    continue;
                }
                self.mark(next, step, Some(id));
                queue.push_back(next);
            }
        }
        None
    }

    /// Reconstructs the shortest path to `target` by walking `from`
    /// links backward from the last `bfs_multi_target` wave. Returns
    /// `None` if `target` was never reached in the current generation.
    pub fn dfs_backtrack(&self, target: NodeId) -> Option<Vec<NodeId>> {
        if !self.visited(target) {
            return None;
        }
        let mut path = vec![target];
        let mut cur = target;
        while let Some(prev) = self.from[cur.0 as usize] {
            path.push(prev);
            cur = prev;
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleView;
    use icroute_common::db::tech::Tech;

    fn sample_tech() -> Tech {
        let mut t = Tech::new(10.0, 1.0);
        t.set_width("poly", 20.0).set_spacing("poly", "poly", 20.0);
        t.set_width("metal1", 20.0).set_spacing("metal1", "metal1", 20.0);
        t
    }

    #[test]
    fn finds_shortest_path_on_open_grid() {
        let tech = sample_tech();
        let rules = RuleView::new(&tech, 1).unwrap();
        let endpoints = [(0, 0, 0), (40, 0, 0)];
        let mut graph = GridGraph::build(&rules, &endpoints, 1, 5.0);
        graph.grid_connections();

        let src = graph.find_node(0, 0, 0).unwrap();
        let dst = graph.find_node(0, 40, 0).unwrap();

        let mut solver = MazeSolver::new(&graph);
        let reached = solver.bfs_multi_target(&graph, &[src], &[dst]);
        assert_eq!(reached, Some(dst));

        let path = solver.dfs_backtrack(dst).unwrap();
        assert_eq!(*path.first().unwrap(), src);
        assert_eq!(*path.last().unwrap(), dst);
    }

    #[test]
    fn obstacle_blocks_path() {
        let tech = sample_tech();
        let rules = RuleView::new(&tech, 1).unwrap();
        let endpoints = [(0, 0, 0), (40, 0, 0)];
        let mut graph = GridGraph::build(&rules, &endpoints, 1, 5.0);

        // Block the whole column at x=20, not just one row, so there is
        // no detour around it in the single-layer grid.
        for blocker in graph.nodes_in_rect(0, 20, 20, -1000, 1000) {
            graph.node_mut(blocker).obstacle = true;
        }
        graph.grid_connections();

        let src = graph.find_node(0, 0, 0).unwrap();
        let dst = graph.find_node(0, 40, 0).unwrap();

        let mut solver = MazeSolver::new(&graph);
        let reached = solver.bfs_multi_target(&graph, &[src], &[dst]);
        assert!(reached.is_none());
    }
}
