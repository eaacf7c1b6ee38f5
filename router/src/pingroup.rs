use crate::rules::RuleView;
use icroute_common::db::circuit::{Circuit, Pin};
use icroute_common::geom::point::Point;
use icroute_common::geom::rect::Rect;
use icroute_common::geom::rtree::SpatialIndex;
use icroute_common::util::errors::RouteError;
use std::collections::HashMap;

/// Path-compressing union-find over pin indices. No rank heuristic:
/// not required at the sizes a device-level net reaches.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Assembles the input pin list for `net_name`: a synthetic metal1 pin
/// from a matching port (if the port has a metal1 shape), followed by
/// every pin of every group whose `net` matches.
pub fn assemble_net(circuit: &Circuit, net_name: &str) -> Vec<Pin> {
    let mut pins = Vec::new();

    for port in circuit.ports.values() {
        if port.name != net_name {
            continue;
        }
        if let Some(shapes) = port.shapes.get("metal1") {
            if let Some(shape) = shapes.first() {
                pins.push(Pin::new(
                    port.name.clone(),
                    "metal1",
                    (shape.x.0, shape.y.0),
                    (shape.x.1, shape.y.1),
                ));
            }
        }
    }

    for group in circuit.groups.values() {
        for pin in &group.pins {
            if pin.net == net_name {
                pins.push(pin.clone());
            }
        }
    }

    pins
}

fn pin_rect(pin: &Pin) -> Rect<i64> {
    let (x0, x1) = (pin.pt1.0.min(pin.pt2.0), pin.pt1.0.max(pin.pt2.0));
    let (y0, y1) = (pin.pt1.1.min(pin.pt2.1), pin.pt1.1.max(pin.pt2.1));
    Rect::new(Point::new(x0, y0), Point::new(x1, y1))
}

/// Clusters pins of one net into maximal sub-nets of pins that
/// pairwise touch or overlap on the same layer. Candidate pairs are
/// narrowed per layer through a spatial index before the exact
/// closed-interval test, rather than testing all pairs.
pub fn cluster_subnets(pins: &[Pin]) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(pins.len());

    let mut by_layer: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, pin) in pins.iter().enumerate() {
        by_layer.entry(pin.layer.as_str()).or_default().push(i);
    }

    for indices in by_layer.values() {
        let mut index = SpatialIndex::new();
        for &i in indices {
            index.insert(pin_rect(&pins[i]), i);
        }
        for &i in indices {
            let rect = pin_rect(&pins[i]);
            for j in index.query(rect) {
                if j > i && pin_rect(&pins[j]).overlaps_or_touches(&rect) {
                    uf.union(i, j);
                }
            }
        }
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..pins.len() {
        let root = uf.find(i);
        groups.entry(root).or_default().push(i);
    }

    let mut result: Vec<Vec<usize>> = groups.into_values().collect();
    result.sort_by_key(|g| g[0]);
    result
}

/// Shrinks `pin`'s rectangle by half its layer's routing width and
/// populates `pin.grid` with the resulting candidate routing points in
/// user-unit grid coordinates.
pub fn extract_endpoints(rules: &RuleView, pin: &mut Pin) -> Result<(), RouteError> {
    let z = rules.layer_index(&pin.layer).unwrap_or(0);
    let rhw = rules.half_width(&pin.layer)?;
    let rhw_user = (rhw / rules.unit_user()) as i64;

    let ux0 = (pin.pt1.0.min(pin.pt2.0) as f64 / rules.unit_user()).round() as i64 + rhw_user;
    let ux1 = (pin.pt1.0.max(pin.pt2.0) as f64 / rules.unit_user()).round() as i64 - rhw_user;
    let uy0 = (pin.pt1.1.min(pin.pt2.1) as f64 / rules.unit_user()).round() as i64 + rhw_user;
    let uy1 = (pin.pt1.1.max(pin.pt2.1) as f64 / rules.unit_user()).round() as i64 - rhw_user;

    pin.grid.clear();
    if ux0 == ux1 && uy0 == uy1 {
        pin.grid.push((ux0, uy0, z));
    } else if ux0 == ux1 {
        pin.grid.push((ux0, uy0, z));
        pin.grid.push((ux0, uy1, z));
    } else if uy0 == uy1 {
        pin.grid.push((ux0, uy0, z));
        pin.grid.push((ux1, uy0, z));
    } else {
        pin.grid.push((ux0, uy0, z));
        pin.grid.push((ux1, uy1, z));
        pin.grid.push((ux0, uy1, z));
        pin.grid.push((ux1, uy0, z));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(net: &str, layer: &str, pt1: (i64, i64), pt2: (i64, i64)) -> Pin {
        Pin::new(net, layer, pt1, pt2)
    }

    #[test]
    fn touching_pins_cluster_together() {
        let pins = vec![
            pin("A", "metal1", (0, 0), (10, 10)),
            pin("A", "metal1", (10, 0), (20, 10)),
            pin("A", "metal2", (100, 100), (110, 110)),
        ];
        let groups = cluster_subnets(&pins);
        assert_eq!(groups.len(), 2);
        let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert!(sizes.contains(&2));
        assert!(sizes.contains(&1));
    }

    #[test]
    fn different_layers_do_not_cluster() {
        let pins = vec![
            pin("A", "metal1", (0, 0), (10, 10)),
            pin("A", "metal2", (0, 0), (10, 10)),
        ];
        let groups = cluster_subnets(&pins);
        assert_eq!(groups.len(), 2);
    }
}
