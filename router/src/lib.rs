pub mod blockage;
pub mod emit;
pub mod grid;
pub mod maze;
pub mod pingroup;
pub mod planner;
pub mod rules;
pub mod simplify;
pub mod verify;

use grid::{GridGraph, NodeId};
use icroute_common::db::circuit::{BoxShape, Circuit};
use icroute_common::db::tech::Tech;
use icroute_common::util::errors::RouteError;
use icroute_common::util::profiler::ScopedTimer;
use maze::MazeSolver;
use rules::RuleView;
use std::collections::HashMap;

/// Summary of the connectivity checker's findings across a
/// `maze_routing` pass. Returned rather than merely logged so that a
/// caller such as the CLI's `--verify` flag can decide whether any of
/// these findings should be fatal.
#[derive(Debug, Default)]
pub struct RoutingReport {
    pub unrouted_nets: Vec<String>,
    pub open_nets: Vec<String>,
    pub shorts: Vec<String>,
}

impl RoutingReport {
    pub fn is_clean(&self) -> bool {
        self.unrouted_nets.is_empty() && self.open_nets.is_empty() && self.shorts.is_empty()
    }
}

/// Core of the engine: groups each net's pins into touching sub-nets,
/// builds a fresh per-net grid graph (retrying at a finer pitch
/// division up to `pitch_adjust_max` times if no path is found),
/// stamps blockage, routes, simplifies, and emits wire/via geometry
/// into `circuit.group["routing"]`. Afterwards runs the connectivity
/// checker as a diagnostic pass: findings are logged at `warn`/`error`
/// and collected into the returned [`RoutingReport`] rather than
/// aborting, since an unrouted or shorted net is something worth
/// investigating rather than something the driver itself can recover
/// from mid-pass; a net failing `route_one_net` with anything other
/// than `MissingRule` does not stop the other nets from being routed.
pub fn maze_routing(
    tech: &Tech,
    circuit: &mut Circuit,
    routing_layers: u8,
    pitch_adjust_max: u32,
    extension_pitches: f64,
    rdp_epsilon: f64,
) -> Result<RoutingReport, RouteError> {
    circuit.init_routing_group();
    let rules = RuleView::new(tech, routing_layers)?;

    let net_names = circuit.all_net_names();
    let mut net_shapes: HashMap<String, Vec<BoxShape>> = HashMap::new();
    let mut report = RoutingReport::default();

    for net_name in &net_names {
        let _timer = ScopedTimer::new(format!("route net {net_name}"));
        let shapes = match route_one_net(&rules, circuit, net_name, pitch_adjust_max, extension_pitches, rdp_epsilon) {
            Ok(shapes) => shapes,
            Err(e @ RouteError::MissingRule { .. }) => return Err(e),
            Err(e) => {
                log::error!("net '{net_name}' could not be routed: {e}");
                report.unrouted_nets.push(net_name.clone());
                continue;
            }
        };

        let pin_centers: Vec<(i64, i64)> = circuit
            .pins_for_net(net_name)
            .map(|p| ((p.pt1.0 + p.pt2.0) / 2, (p.pt1.1 + p.pt2.1) / 2))
            .collect();
        if let Err(e) = verify::check_opens(&shapes, &pin_centers) {
            log::warn!("net '{net_name}' failed the connectivity check: {e}");
            report.open_nets.push(net_name.clone());
        }
        net_shapes.insert(net_name.clone(), shapes);
    }

    if let Err(e) = verify::check_shorts(&net_shapes) {
        log::warn!("{e}");
        report.shorts.push(e);
    }
    Ok(report)
}

fn route_one_net(
    rules: &RuleView,
    circuit: &mut Circuit,
    net_name: &str,
    pitch_adjust_max: u32,
    extension_pitches: f64,
    rdp_epsilon: f64,
) -> Result<Vec<BoxShape>, RouteError> {
    let mut pins = pingroup::assemble_net(circuit, net_name);
    if pins.is_empty() {
        return Ok(Vec::new());
    }
    for pin in &mut pins {
        pingroup::extract_endpoints(rules, pin)?;
    }
    let subnet_indices = pingroup::cluster_subnets(&pins);

    let endpoints: Vec<(i64, i64, u8)> = pins.iter().flat_map(|p| p.grid.iter().copied()).collect();

    for pitch_adjust in 1..=pitch_adjust_max {
        let mut graph = GridGraph::build(rules, &endpoints, pitch_adjust, extension_pitches);

        blockage::diffusion_blockage(rules, circuit, &mut graph)?;
        blockage::route_path_blockage(rules, circuit, &mut graph)?;
        blockage::poly_pin_blockage(rules, circuit, &mut graph, net_name)?;
        blockage::metal_pin_blockage(rules, circuit, &mut graph, net_name)?;

        graph.grid_connections();

        let mut subnets: Vec<Vec<NodeId>> = Vec::with_capacity(subnet_indices.len());
        for cluster in &subnet_indices {
            let mut nodes = Vec::new();
            for &pin_idx in cluster {
                for &(x, y, z) in &pins[pin_idx].grid {
                    if let Some(id) = graph.find_node(z, x, y) {
                        graph.node_mut(id).vertical_block = true;
                        nodes.push(id);
                    }
                }
            }
            if !nodes.is_empty() {
                subnets.push(nodes);
            }
        }

        let mut solver = MazeSolver::new(&graph);
        let Some(paths) = planner::route_multi_pins_group(&mut solver, &graph, &subnets) else {
            continue;
        };

        let shapes = layout_paths(rules, &graph, &paths, rdp_epsilon)?;
        let routing_id = circuit.routing_group_id().expect("routing group initialized");
        let group = circuit.groups.get_mut(&routing_id).expect("routing group initialized");
        for shape in &shapes {
            group.add_shape(shape.clone());
        }
        return Ok(shapes);
    }

    Err(RouteError::UnroutedNet {
        net: net_name.to_string(),
    })
}

fn layout_paths(
    rules: &RuleView,
    graph: &GridGraph,
    paths: &[Vec<NodeId>],
    rdp_epsilon: f64,
) -> Result<Vec<BoxShape>, RouteError> {
    let emitter = emit::GeometryEmitter::new(rules);
    let mut shapes = Vec::new();

    for path in paths {
        let points: Vec<(f64, f64, f64)> = path
            .iter()
            .map(|&id| {
                let n = graph.node(id);
                (n.x as f64, n.y as f64, n.z as f64)
            })
            .collect();
        let simplified = simplify::simplify(&points, rdp_epsilon);
        let int_path: Vec<(i64, i64, u8)> = simplified
            .iter()
            .map(|&(x, y, z)| (x.round() as i64, y.round() as i64, z.round() as u8))
            .collect();
        shapes.extend(emitter.layout_path(&int_path)?);
    }
    Ok(shapes)
}

/// Fills in a missing port label (a text marker on the port's own
/// routing layer) by copying it from one of the port's pins, when the
/// port shape itself carries no such label. Independent of
/// `maze_routing` — not part of the core path-finding/geometry
/// pipeline, so it is never invoked from it.
pub fn port_placement(circuit: &mut Circuit, routing_layers: u8) {
    let port_ids: Vec<_> = circuit.ports.keys().copied().collect();
    for port_id in port_ids {
        let port_name = circuit.ports[&port_id].name.clone();

        let mut has_label = false;
        for layer in 1..=routing_layers {
            if circuit.ports[&port_id].shapes.contains_key(&format!("m{layer}_text")) {
                has_label = true;
                break;
            }
        }
        if has_label {
            continue;
        }

        for group in circuit.groups.values() {
            for pin in &group.pins {
                if pin.net != port_name || pin.layer == "poly" {
                    continue;
                }
                let label = format!("{}_text", pin.layer.replace("metal", "m"));
                let x = (pin.pt1.0 + pin.pt2.0) / 2;
                let y = (pin.pt1.1 + pin.pt2.1) / 2;
                circuit
                    .ports
                    .get_mut(&port_id)
                    .unwrap()
                    .shapes
                    .insert(label, vec![BoxShape::new(pin.layer.clone(), (x, x), (y, y))]);
            }
        }
    }
}
