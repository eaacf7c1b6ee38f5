use crate::rules::RuleView;
use icroute_common::db::circuit::BoxShape;
use icroute_common::util::errors::RouteError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Direction {
    LeftToRight,
    RightToLeft,
    DownToUp,
    UpToDown,
}

fn direction_between(from: (i64, i64), to: (i64, i64)) -> Direction {
    if from.0 < to.0 {
        Direction::LeftToRight
    } else if from.0 > to.0 {
        Direction::RightToLeft
    } else if from.1 < to.1 {
        Direction::DownToUp
    } else {
        Direction::UpToDown
    }
}

fn layer_of(rules: &RuleView, z: u8) -> String {
    rules.layer_name(z).to_string()
}

/// Via adjacent to layer `z`, oriented towards `neighbor_z`.
fn via_towards(rules: &RuleView, z: u8, neighbor_z: u8) -> String {
    rules.via_name(z.min(neighbor_z))
}

fn rect(layer: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> BoxShape {
    BoxShape::new(
        layer,
        (x0.round() as i64, x1.round() as i64),
        (y0.round() as i64, y1.round() as i64),
    )
}

/// Converts a routed, RDP-simplified path into the wire and via-stack
/// rectangles that implement it, in database units.
pub struct GeometryEmitter<'a> {
    rules: &'a RuleView<'a>,
}

impl<'a> GeometryEmitter<'a> {
    pub fn new(rules: &'a RuleView<'a>) -> Self {
        Self { rules }
    }

    pub fn layout_path(&self, path: &[(i64, i64, u8)]) -> Result<Vec<BoxShape>, RouteError> {
        let mut shapes = Vec::new();
        shapes.extend(self.wire_segments(path)?);
        shapes.extend(self.via_stacks(path)?);
        Ok(shapes)
    }

    /// In-plane wire rectangles for every pair of consecutive same-layer
    /// vertices.
    fn wire_segments(&self, path: &[(i64, i64, u8)]) -> Result<Vec<BoxShape>, RouteError> {
        let u = self.rules.unit_user();
        let mut shapes = Vec::new();

        for w in path.windows(2) {
            let (x0, y0, z0) = w[0];
            let (x1, y1, z1) = w[1];
            if z0 != z1 {
                continue;
            }
            let layer = layer_of(self.rules, z0);
            let hw = self.rules.half_width(&layer)?;

            let (lo_x, hi_x) = if x0 == x1 {
                (x0 as f64 * u - hw, x0 as f64 * u + hw)
            } else {
                (
                    x0.min(x1) as f64 * u - hw,
                    x0.max(x1) as f64 * u + hw,
                )
            };
            let (lo_y, hi_y) = if y0 == y1 {
                (y0 as f64 * u - hw, y0 as f64 * u + hw)
            } else {
                (
                    y0.min(y1) as f64 * u - hw,
                    y0.max(y1) as f64 * u + hw,
                )
            };

            shapes.push(rect(&layer, lo_x, lo_y, hi_x, hi_y));
        }
        Ok(shapes)
    }

    /// For every layer change, emits: a landing rectangle on the layer
    /// being left (end-of-line enclosure unless a neighboring wire
    /// segment already covers that side), a via-sized square at the
    /// transition point, a wide bar plus via square for every layer
    /// passed through in between, and a landing rectangle on the layer
    /// being entered.
    fn via_stacks(&self, path: &[(i64, i64, u8)]) -> Result<Vec<BoxShape>, RouteError> {
        let u = self.rules.unit_user();
        let g = self.rules.unit_grid();
        let mut shapes = Vec::new();

        for i in 0..path.len().saturating_sub(1) {
            let (x, y, z) = path[i];
            let (nx, ny, nz) = path[i + 1];
            if z == nz {
                continue;
            }

            let prev_dir = if i > 0 {
                direction_between((path[i - 1].0, path[i - 1].1), (x, y))
            } else {
                Direction::LeftToRight
            };
            let prev_distance = if i > 0 {
                let (px, py, _) = path[i - 1];
                ((x - px).abs() + (y - py).abs()) as f64
            } else {
                0.0
            };

            let prev_layer = layer_of(self.rules, z);
            let prev_via = via_towards(self.rules, z, if z < nz { z + 1 } else { z - 1 });
            let (prev_w, prev_w_eol) = self.route_widths(&prev_layer, &prev_via)?;

            let anchor = if i > 0 { Some(path[i - 1]) } else { None };
            shapes.push(self.landing_rect(
                &prev_layer,
                (x, y),
                anchor,
                prev_dir,
                prev_distance,
                prev_w,
                prev_w_eol,
                u,
            )?);

            shapes.push(self.via_square(&prev_via, (x, y), u)?);

            let (start, end, step): (i64, i64, i64) = if z < nz {
                (z as i64 + 1, nz as i64, 1)
            } else {
                (z as i64 - 1, nz as i64, -1)
            };

            let mut mid = start;
            while (step > 0 && mid < end) || (step < 0 && mid > end) {
                let mid_z = mid as u8;
                let mid_layer = layer_of(self.rules, mid_z);
                let mid_via = if step > 0 {
                    via_towards(self.rules, mid_z, mid_z + 1)
                } else {
                    via_towards(self.rules, mid_z, mid_z - 1)
                };
                let mid_w = self.rules.size(&mid_via)? + 2.0 * self.rules.enclosure(&mid_layer, &mid_via, true)?;
                let area = self.rules.area(&mid_layer)?;
                let wide_raw = area / mid_w;
                let wide = (wide_raw / 2.0 / g).ceil() * 2.0 * g;

                let (lx, ly, hx, hy) = match prev_dir {
                    Direction::LeftToRight | Direction::RightToLeft => (
                        x as f64 * u - wide / 2.0,
                        y as f64 * u - mid_w / 2.0,
                        x as f64 * u + wide / 2.0,
                        y as f64 * u + mid_w / 2.0,
                    ),
                    Direction::DownToUp | Direction::UpToDown => (
                        x as f64 * u - mid_w / 2.0,
                        y as f64 * u - wide / 2.0,
                        x as f64 * u + mid_w / 2.0,
                        y as f64 * u + wide / 2.0,
                    ),
                };
                shapes.push(rect(&mid_layer, lx, ly, hx, hy));
                shapes.push(self.via_square(&mid_via, (x, y), u)?);

                mid += step;
            }

            let next_dir = if i + 2 < path.len() {
                direction_between((nx, ny), (path[i + 2].0, path[i + 2].1))
            } else {
                Direction::LeftToRight
            };
            let next_distance = if i + 2 < path.len() {
                let (ex, ey, _) = path[i + 2];
                ((ex - nx).abs() + (ey - ny).abs()) as f64
            } else {
                0.0
            };

            let next_layer = layer_of(self.rules, nz);
            let next_via = via_towards(self.rules, nz, if nz < z { nz + 1 } else { nz - 1 });
            let (next_w, next_w_eol) = self.route_widths(&next_layer, &next_via)?;

            let next_anchor = if i + 2 < path.len() { Some(path[i + 2]) } else { None };
            shapes.push(self.landing_rect(
                &next_layer,
                (nx, ny),
                next_anchor,
                next_dir,
                next_distance,
                next_w,
                next_w_eol,
                u,
            )?);
        }
        Ok(shapes)
    }

    fn route_widths(&self, layer: &str, via: &str) -> Result<(f64, f64), RouteError> {
        let size = self.rules.size(via)?;
        let w = size + 2.0 * self.rules.enclosure(layer, via, false)?;
        let w_eol = size + 2.0 * self.rules.enclosure(layer, via, true)?;
        Ok((w, w_eol))
    }

    fn via_square(&self, via: &str, at: (i64, i64), u: f64) -> Result<BoxShape, RouteError> {
        let w = self.rules.size(via)?;
        let cx = at.0 as f64 * u;
        let cy = at.1 as f64 * u;
        Ok(rect(via, cx - w / 2.0, cy - w / 2.0, cx + w / 2.0, cy + w / 2.0))
    }

    /// The rectangle landing on one end of a via stack: extended by
    /// the end-of-line enclosure on the free side unless an adjacent
    /// wire segment is closer than that enclosure plus spacing, in
    /// which case the rectangle instead reaches exactly to that
    /// neighbor's own half-width.
    #[allow(clippy::too_many_arguments)]
    fn landing_rect(
        &self,
        layer: &str,
        at: (i64, i64),
        neighbor: Option<(i64, i64, u8)>,
        dir: Direction,
        distance: f64,
        w: f64,
        w_eol: f64,
        u: f64,
    ) -> Result<BoxShape, RouteError> {
        let spacing = self.rules.spacing(layer, layer)?;
        let hw = self.rules.half_width(layer)?;
        let cx = at.0 as f64 * u;
        let cy = at.1 as f64 * u;
        let close = distance * u > w_eol + spacing;

        Ok(match dir {
            Direction::LeftToRight => {
                let x0 = if close || neighbor.is_none() {
                    cx - w_eol / 2.0
                } else {
                    neighbor.unwrap().0 as f64 * u - hw
                };
                rect(layer, x0, cy - w / 2.0, cx + w_eol / 2.0, cy + w / 2.0)
            }
            Direction::RightToLeft => {
                let x1 = if close || neighbor.is_none() {
                    cx + w_eol / 2.0
                } else {
                    neighbor.unwrap().0 as f64 * u + hw
                };
                rect(layer, cx - w_eol / 2.0, cy - w / 2.0, x1, cy + w / 2.0)
            }
            Direction::DownToUp => {
                let y0 = if close || neighbor.is_none() {
                    cy - w_eol / 2.0
                } else {
                    neighbor.unwrap().1 as f64 * u - hw
                };
                rect(layer, cx - w / 2.0, y0, cx + w / 2.0, cy + w_eol / 2.0)
            }
            Direction::UpToDown => {
                let y1 = if close || neighbor.is_none() {
                    cy + w_eol / 2.0
                } else {
                    neighbor.unwrap().1 as f64 * u + hw
                };
                rect(layer, cx - w / 2.0, cy - w_eol / 2.0, cx + w / 2.0, y1)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icroute_common::db::tech::Tech;

    fn sample_tech() -> Tech {
        let mut t = Tech::new(10.0, 1.0);
        t.set_width("poly", 20.0).set_spacing("poly", "poly", 20.0);
        t.set_width("metal1", 20.0).set_spacing("metal1", "metal1", 20.0);
        t.set_width("metal2", 20.0).set_spacing("metal2", "metal2", 20.0);
        t.set_size("contact", 14.0)
            .set_enclosure("poly", "contact", false, 3.0)
            .set_enclosure("poly", "contact", true, 3.0)
            .set_enclosure("metal1", "contact", false, 3.0)
            .set_enclosure("metal1", "contact", true, 3.0);
        t.set_size("via12", 14.0)
            .set_enclosure("metal1", "via12", false, 3.0)
            .set_enclosure("metal1", "via12", true, 3.0)
            .set_enclosure("metal2", "via12", false, 3.0)
            .set_enclosure("metal2", "via12", true, 3.0);
        t.set_area("metal1", 400.0).set_area("metal2", 400.0);
        t
    }

    #[test]
    fn straight_wire_emits_one_rectangle() {
        let tech = sample_tech();
        let rules = RuleView::new(&tech, 2).unwrap();
        let emitter = GeometryEmitter::new(&rules);
        let path = [(0, 0, 1), (10, 0, 1)];
        let shapes = emitter.layout_path(&path).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].layer, "metal1");
    }

    #[test]
    fn layer_change_emits_via_and_landing_pads() {
        let tech = sample_tech();
        let rules = RuleView::new(&tech, 2).unwrap();
        let emitter = GeometryEmitter::new(&rules);
        let path = [(0, 0, 0), (0, 0, 1)];
        let shapes = emitter.layout_path(&path).unwrap();
        assert!(shapes.iter().any(|s| s.layer == "contact"));
        assert!(shapes.iter().any(|s| s.layer == "poly"));
        assert!(shapes.iter().any(|s| s.layer == "metal1"));
    }
}
