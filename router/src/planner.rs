use crate::grid::{GridGraph, NodeId};
use crate::maze::MazeSolver;

type Path = Vec<NodeId>;

fn manhattan(graph: &GridGraph, a: NodeId, b: NodeId) -> i64 {
    let na = graph.node(a);
    let nb = graph.node(b);
    (na.x - nb.x).abs() + (na.y - nb.y).abs() + (na.z as i64 - nb.z as i64).abs()
}

/// Single source, multiple candidate targets: wave from `source`,
/// backtrack to whichever target the wave reaches first.
fn route_two_pins(
    solver: &mut MazeSolver,
    graph: &GridGraph,
    source: NodeId,
    targets: &[NodeId],
) -> Option<Path> {
    let hit = solver.bfs_multi_target(graph, &[source], targets)?;
    solver.dfs_backtrack(hit)
}

/// Picks the closest (source, target) pair by Manhattan distance.
/// Preserved quirk: ties do not keep the first-seen best pair, they
/// keep the last pair whose distance equals the running best — an
/// artifact of updating the index on `==` rather than only on
/// strict improvement.
fn nearest_pair(graph: &GridGraph, sources: &[NodeId], targets: &[NodeId]) -> (usize, usize) {
    let mut best_len = i64::MAX;
    let mut best = (0, 0);
    for (i, &s) in sources.iter().enumerate() {
        for (j, &t) in targets.iter().enumerate() {
            let len = manhattan(graph, s, t);
            if len < best_len {
                best_len = len;
            }
            if len == best_len {
                best = (i, j);
            }
        }
    }
    best
}

/// Strategy 1: route pin 0 to the nearest of the rest, then fold in
/// each remaining pin against the accumulated path-as-target set.
/// Implemented for completeness but not invoked by the driver, which
/// uses the sub-net/group strategy below.
#[allow(dead_code)]
pub fn route_multi_pins(solver: &mut MazeSolver, graph: &GridGraph, pins: &[NodeId]) -> Option<Vec<Path>> {
    if pins.is_empty() {
        return Some(Vec::new());
    }
    let mut targets = pins.to_vec();
    let source = targets.remove(0);

    let first = route_two_pins(solver, graph, source, &targets)?;
    let mut paths = vec![first.clone()];
    if let Some(pos) = targets.iter().position(|&n| n == *first.last().unwrap()) {
        targets.remove(pos);
    }

    let mut sources = targets;
    let mut wave_targets = first;

    while !sources.is_empty() {
        let source = sources.remove(0);
        let path = route_two_pins(solver, graph, source, &wave_targets)?;
        paths.push(path.clone());
        wave_targets.extend(path);
    }

    Some(paths)
}

/// Strategy 2: greedily connects the closest (source, target) pair by
/// Manhattan distance each round, growing `sources` with the newly
/// routed path and shrinking `targets` by one pin at a time.
fn route_multi_pins_2(solver: &mut MazeSolver, graph: &GridGraph, pins: &[NodeId]) -> Option<Vec<Path>> {
    if pins.is_empty() {
        return Some(Vec::new());
    }
    let mut targets = pins.to_vec();
    let source = targets.remove(0);

    let first = route_two_pins(solver, graph, source, &targets[..1])?;
    let mut paths = vec![first.clone()];
    if let Some(pos) = targets.iter().position(|&n| n == *first.last().unwrap()) {
        targets.remove(pos);
    }
    let mut sources = first;

    while !targets.is_empty() {
        let (si, ti) = nearest_pair(graph, &sources, &targets);
        if sources[si] == targets[ti] {
            targets.remove(ti);
            continue;
        }
        let path = route_two_pins(solver, graph, sources[si], &targets[ti..ti + 1])?;
        if let Some(pos) = targets.iter().position(|&n| n == *path.last().unwrap()) {
            targets.remove(pos);
        }
        sources.extend(path.clone());
        paths.push(path);
    }

    Some(paths)
}

/// Strategy 3, the driver's entry point: each sub-net's own pins are
/// first internally connected (via strategy 2 when it has more than
/// one candidate node), collapsing to one representative node set per
/// sub-net; the sub-nets are then stitched together the same way,
/// nearest-pair first.
pub fn route_multi_pins_group(
    solver: &mut MazeSolver,
    graph: &GridGraph,
    subnets: &[Vec<NodeId>],
) -> Option<Vec<Path>> {
    let mut paths = Vec::new();
    let mut groups: Vec<Vec<NodeId>> = Vec::new();

    for pin_list in subnets {
        if pin_list.len() == 1 {
            groups.push(pin_list.clone());
            continue;
        }
        let sub_paths = route_multi_pins_2(solver, graph, pin_list)?;
        let mut nodes: Vec<NodeId> = sub_paths.iter().flatten().copied().collect();
        nodes.sort_by_key(|n| n.0);
        nodes.dedup();
        paths.extend(sub_paths);
        groups.push(nodes);
    }

    if groups.is_empty() {
        return Some(paths);
    }
    let mut sources = groups.remove(0);

    while !groups.is_empty() {
        let mut targets = groups.remove(0);

        let (si, ti) = nearest_pair(graph, &sources, &targets);
        if sources[si] == targets[ti] {
            targets.remove(ti);
            continue;
        }

        let path = route_two_pins(solver, graph, sources[si], &targets[ti..ti + 1])?;
        paths.push(path.clone());
        sources.extend(path);
    }

    Some(paths)
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
    fn connects_three_collinear_pins() {
        let tech = sample_tech();
        let rules = RuleView::new(&tech, 1).unwrap();
        let endpoints = [(0, 0, 0), (20, 0, 0), (40, 0, 0)];
        let mut graph = GridGraph::build(&rules, &endpoints, 1, 5.0);
        graph.grid_connections();

        let a = graph.find_node(0, 0, 0).unwrap();
        let b = graph.find_node(0, 20, 0).unwrap();
        let c = graph.find_node(0, 40, 0).unwrap();

        let mut solver = MazeSolver::new(&graph);
        let subnets = vec![vec![a], vec![b], vec![c]];
        let paths = route_multi_pins_group(&mut solver, &graph, &subnets).unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn nearest_pair_tie_keeps_last_seen() {
        let tech = sample_tech();
        let rules = RuleView::new(&tech, 1).unwrap();
        let endpoints = [(0, 0, 0), (10, 0, 0), (0, 10, 0)];
        let graph = GridGraph::build(&rules, &endpoints, 1, 5.0);

        let origin = graph.find_node(0, 0, 0).unwrap();
        let right = graph.find_node(0, 10, 0).unwrap();
        let up = graph.find_node(0, 0, 10).unwrap();

        let (si, ti) = nearest_pair(&graph, &[origin], &[right, up]);
        assert_eq!(si, 0);
        assert_eq!(ti, 1);
    }
}
