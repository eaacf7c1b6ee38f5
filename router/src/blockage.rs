use crate::grid::GridGraph;
use crate::rules::RuleView;
use icroute_common::db::circuit::{BoxShape, Circuit, ROUTING_GROUP};
use icroute_common::util::errors::RouteError;

fn to_user(rules: &RuleView, v: i64) -> i64 {
    (v as f64 / rules.unit_user()).round() as i64
}

fn shape_user_rect(rules: &RuleView, shape: &BoxShape) -> (i64, i64, i64, i64) {
    (
        to_user(rules, shape.x.0.min(shape.x.1)),
        to_user(rules, shape.x.0.max(shape.x.1)),
        to_user(rules, shape.y.0.min(shape.y.1)),
        to_user(rules, shape.y.0.max(shape.y.1)),
    )
}

fn stamp_obstacle(graph: &mut GridGraph, layer: u8, x0: i64, x1: i64, y0: i64, y1: i64) {
    for id in graph.nodes_in_rect(layer, x0, x1, y0, y1) {
        graph.node_mut(id).obstacle = true;
    }
}

fn stamp_vertical_block(graph: &mut GridGraph, layer: u8, x0: i64, x1: i64, y0: i64, y1: i64) {
    for id in graph.nodes_in_rect(layer, x0, x1, y0, y1) {
        graph.node_mut(id).vertical_block = true;
    }
}

/// The via layer adjacent to metal/poly layer index `idx`, biased
/// toward the via above (`via(idx, idx+1)`) except at the topmost
/// layer, which has no via above.
fn via_adjacent(rules: &RuleView, idx: u8) -> String {
    if idx + 1 < rules.num_layers {
        rules.via_name(idx)
    } else {
        rules.via_name(idx - 1)
    }
}

/// Diffusion keep-out: a single combined rectangle (not two
/// independent ones) stamps both `obstacle` and `vertical_block` on
/// layer 0, expanded by `diff<->poly` spacing plus poly-contact
/// half-width.
pub fn diffusion_blockage(
    rules: &RuleView,
    circuit: &Circuit,
    graph: &mut GridGraph,
) -> Result<(), RouteError> {
    let po_hw = (rules.size("contact")? + rules.enclosure("poly", "contact", false)?) / 2.0;

    for diff_layer in ["ndiffusion", "pdiffusion"] {
        let spacing = match rules.spacing(diff_layer, "poly") {
            Ok(s) => s,
            Err(_) => continue,
        };
        let margin = ((spacing + po_hw) / rules.unit_user()).round() as i64;

        for group in circuit.groups.values() {
            let Some(shapes) = group.shapes.get(diff_layer) else {
                continue;
            };
            for shape in shapes {
                let (x0, x1, y0, y1) = shape_user_rect(rules, shape);
                stamp_obstacle(graph, 0, x0 - margin, x1 + margin, y0 - margin, y1 + margin);
                stamp_vertical_block(graph, 0, x0 - margin, x1 + margin, y0 - margin, y1 + margin);
            }
        }
    }
    Ok(())
}

/// Previously-routed shapes in `circuit.group["routing"]` always
/// block: no current-net exemption.
pub fn route_path_blockage(
    rules: &RuleView,
    circuit: &Circuit,
    graph: &mut GridGraph,
) -> Result<(), RouteError> {
    let Some(routing_id) = circuit.routing_group_id() else {
        return Ok(());
    };
    let Some(routing) = circuit.groups.get(&routing_id) else {
        return Ok(());
    };

    for layer_idx in 0..rules.num_layers {
        let layer_name = rules.layer_name(layer_idx).to_string();
        let Some(shapes) = routing.shapes.get(&layer_name) else {
            continue;
        };
        let spacing = rules.spacing(&layer_name, &layer_name)?;
        let hw = rules.half_width(&layer_name)?;
        let via = via_adjacent(rules, layer_idx);
        let enc = rules.enclosure(&layer_name, &via, false)?;
        let via_hs = rules.size(&via)? / 2.0;

        let in_plane_margin = ((spacing + hw) / rules.unit_user()).round() as i64;
        let vertical_margin = ((spacing + enc + via_hs) / rules.unit_user()).round() as i64;

        for shape in shapes {
            let (x0, x1, y0, y1) = shape_user_rect(rules, shape);
            stamp_obstacle(
                graph,
                layer_idx,
                x0 - in_plane_margin,
                x1 + in_plane_margin,
                y0 - in_plane_margin,
                y1 + in_plane_margin,
            );
            stamp_vertical_block(
                graph,
                layer_idx,
                x0 - vertical_margin,
                x1 + vertical_margin,
                y0 - vertical_margin,
                y1 + vertical_margin,
            );
        }
    }
    Ok(())
}

/// Poly pins: independent in-plane and vertical rectangles, with a
/// current-net re-open of `obstacle` at nodes aligned with the pin's
/// own grid points (asymmetric on purpose: the x-bound comes from the
/// raw pin rectangle, the y-bound from the vertical rectangle).
pub fn poly_pin_blockage(
    rules: &RuleView,
    circuit: &Circuit,
    graph: &mut GridGraph,
    net_name: &str,
) -> Result<(), RouteError> {
    let spacing = rules.spacing("poly", "poly")?;
    let hw = rules.half_width("poly")?;
    let enc = rules.enclosure("poly", "contact", false)?;
    let via_hs = rules.size("contact")? / 2.0;

    let in_plane_margin = ((spacing + hw) / rules.unit_user()).round() as i64;
    let vertical_margin = ((spacing + enc + via_hs) / rules.unit_user()).round() as i64;

    for group in circuit.groups.values() {
        for pin in &group.pins {
            if pin.layer != "poly" {
                continue;
            }
            let raw_x0 = to_user(rules, pin.pt1.0.min(pin.pt2.0));
            let raw_x1 = to_user(rules, pin.pt1.0.max(pin.pt2.0));
            let raw_y0 = to_user(rules, pin.pt1.1.min(pin.pt2.1));
            let raw_y1 = to_user(rules, pin.pt1.1.max(pin.pt2.1));

            stamp_obstacle(
                graph,
                0,
                raw_x0 - in_plane_margin,
                raw_x1 + in_plane_margin,
                raw_y0 - in_plane_margin,
                raw_y1 + in_plane_margin,
            );
            let vy0 = raw_y0 - vertical_margin;
            let vy1 = raw_y1 + vertical_margin;
            stamp_vertical_block(graph, 0, raw_x0 - vertical_margin, raw_x1 + vertical_margin, vy0, vy1);

            if pin.net == net_name {
                for id in graph.nodes_in_rect(0, raw_x0, raw_x1, vy0, vy1) {
                    let node = *graph.node(id);
                    if pin.grid.iter().any(|&(gx, gy, _)| node.x == gx || node.y == gy) {
                        graph.node_mut(id).obstacle = false;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Metal pins (and metal1 ports): for the current net, blockage is
/// skipped entirely and `obstacle` is cleared across the raw pin
/// rectangle; for other nets, both rectangles are stamped as usual.
pub fn metal_pin_blockage(
    rules: &RuleView,
    circuit: &Circuit,
    graph: &mut GridGraph,
    net_name: &str,
) -> Result<(), RouteError> {
    for group in circuit.groups.values() {
        for pin in &group.pins {
            let Some(layer_idx) = rules.layer_index(&pin.layer) else {
                continue;
            };
            if layer_idx == 0 {
                continue;
            }
            stamp_metal_pin(rules, graph, layer_idx, pin.pt1, pin.pt2, &pin.net == net_name)?;
        }
    }

    for port in circuit.ports.values() {
        if port.name != net_name {
            continue;
        }
        let Some(shapes) = port.shapes.get("metal1") else {
            continue;
        };
        for shape in shapes {
            stamp_metal_pin(rules, graph, 1, (shape.x.0, shape.y.0), (shape.x.1, shape.y.1), true)?;
        }
    }
    Ok(())
}

fn stamp_metal_pin(
    rules: &RuleView,
    graph: &mut GridGraph,
    layer_idx: u8,
    pt1: (i64, i64),
    pt2: (i64, i64),
    is_current_net: bool,
) -> Result<(), RouteError> {
    let raw_x0 = to_user(rules, pt1.0.min(pt2.0));
    let raw_x1 = to_user(rules, pt1.0.max(pt2.0));
    let raw_y0 = to_user(rules, pt1.1.min(pt2.1));
    let raw_y1 = to_user(rules, pt1.1.max(pt2.1));

    if is_current_net {
        for id in graph.nodes_in_rect(layer_idx, raw_x0, raw_x1, raw_y0, raw_y1) {
            graph.node_mut(id).obstacle = false;
        }
        return Ok(());
    }

    let layer_name = rules.layer_name(layer_idx).to_string();
    let spacing = rules.spacing(&layer_name, &layer_name)?;
    let hw = rules.half_width(&layer_name)?;
    let via = via_adjacent(rules, layer_idx);
    let enc = rules.enclosure(&layer_name, &via, false)?;
    let via_hs = rules.size(&via)? / 2.0;

    let in_plane_margin = ((spacing + hw) / rules.unit_user()).round() as i64;
    let vertical_margin = ((spacing + enc + via_hs) / rules.unit_user()).round() as i64;

    stamp_obstacle(
        graph,
        layer_idx,
        raw_x0 - in_plane_margin,
        raw_x1 + in_plane_margin,
        raw_y0 - in_plane_margin,
        raw_y1 + in_plane_margin,
    );
    stamp_vertical_block(
        graph,
        layer_idx,
        raw_x0 - vertical_margin,
        raw_x1 + vertical_margin,
        raw_y0 - vertical_margin,
        raw_y1 + vertical_margin,
    );
    Ok(())
}

pub const ROUTING_GROUP_NAME: &str = ROUTING_GROUP;
