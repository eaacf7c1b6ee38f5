use icroute_common::db::circuit::{Circuit, Pin};
use icroute_common::db::tech::Tech;

fn test_tech() -> Tech {
    let mut t = Tech::new(1.0, 1.0);
    t.set_width("poly", 4.0).set_spacing("poly", "poly", 4.0);
    t.set_width("metal1", 10.0).set_spacing("metal1", "metal1", 10.0);
    t.set_width("metal2", 10.0).set_spacing("metal2", "metal2", 10.0);
    t.set_size("contact", 6.0)
        .set_enclosure("poly", "contact", false, 2.0)
        .set_enclosure("poly", "contact", true, 2.0)
        .set_enclosure("metal1", "contact", false, 2.0)
        .set_enclosure("metal1", "contact", true, 2.0);
    t.set_size("via12", 6.0)
        .set_enclosure("metal1", "via12", false, 2.0)
        .set_enclosure("metal1", "via12", true, 2.0)
        .set_enclosure("metal2", "via12", false, 2.0)
        .set_enclosure("metal2", "via12", true, 2.0);
    t.set_area("metal1", 200.0).set_area("metal2", 200.0);
    t.set_spacing("ndiffusion", "poly", 6.0);
    t.set_spacing("pdiffusion", "poly", 6.0);
    t
}

/// Two-point metal1 route: one metal1 rectangle spanning both pins at
/// the rule width, no vias, no connectivity-checker findings.
#[test]
fn two_point_metal1_route_emits_one_wire() {
    let tech = test_tech();
    let mut circuit = Circuit::new();
    let group = circuit.add_group("core");
    {
        let g = circuit.groups.get_mut(&group).unwrap();
        g.add_pin(Pin::new("A", "metal1", (0, 0), (10, 10)));
        g.add_pin(Pin::new("A", "metal1", (100, 0), (110, 10)));
    }

    let report = icroute_router::maze_routing(&tech, &mut circuit, 2, 3, 5.0, 0.2).unwrap();
    assert!(report.is_clean(), "{report:?}");

    let routing_id = circuit.routing_group_id().unwrap();
    let group = &circuit.groups[&routing_id];
    let metal1 = group.shapes.get("metal1").expect("metal1 shapes emitted");
    assert_eq!(metal1.len(), 1);
    let shape = &metal1[0];
    assert_eq!(shape.x, (0, 110));
    assert_eq!(shape.y, (0, 10));
}

/// Layer change between a metal1 pin and a metal2 pin: the route must
/// cross a via12, landing on both metal1 and metal2 near the cut.
#[test]
fn layer_change_routes_through_via() {
    let tech = test_tech();
    let mut circuit = Circuit::new();
    let group = circuit.add_group("core");
    {
        let g = circuit.groups.get_mut(&group).unwrap();
        g.add_pin(Pin::new("B", "metal1", (0, 0), (10, 10)));
        g.add_pin(Pin::new("B", "metal2", (0, 100), (10, 110)));
    }

    let report = icroute_router::maze_routing(&tech, &mut circuit, 3, 3, 5.0, 0.2).unwrap();
    assert!(report.unrouted_nets.is_empty(), "{report:?}");

    let routing_id = circuit.routing_group_id().unwrap();
    let group = &circuit.groups[&routing_id];
    assert!(group.shapes.contains_key("via12"));
    assert!(group.shapes.contains_key("metal1"));
    assert!(group.shapes.contains_key("metal2"));
}

/// Three pins of one net where two touch on metal1 and the third sits
/// apart on metal2: clustering must keep the touching pair together
/// and the distant pin separate, and the net must still route as a
/// whole (the clusters get stitched by the group-routing strategy).
#[test]
fn clustered_subnets_route_as_one_net() {
    let tech = test_tech();
    let mut circuit = Circuit::new();
    let group = circuit.add_group("core");
    {
        let g = circuit.groups.get_mut(&group).unwrap();
        g.add_pin(Pin::new("C", "metal1", (0, 0), (10, 10)));
        g.add_pin(Pin::new("C", "metal1", (10, 0), (20, 10)));
        g.add_pin(Pin::new("C", "metal2", (200, 200), (210, 210)));
    }

    let report = icroute_router::maze_routing(&tech, &mut circuit, 3, 3, 5.0, 0.2).unwrap();
    assert!(report.unrouted_nets.is_empty(), "{report:?}");
    assert!(report.open_nets.is_empty(), "{report:?}");
}

/// A pin fully boxed in by same-layer metal pins of other nets on all
/// four sides cannot be reached: the net is reported unrouted and no
/// shapes are emitted for it, while routing continues (no propagated
/// error) so a later net in the same pass is unaffected.
#[test]
fn surrounded_pin_is_reported_unrouted_but_does_not_abort_the_pass() {
    let tech = test_tech();
    let mut circuit = Circuit::new();
    let group = circuit.add_group("core");
    {
        let g = circuit.groups.get_mut(&group).unwrap();
        // Target net: a single small metal1 pin at the origin.
        g.add_pin(Pin::new("TRAPPED", "metal1", (0, 0), (10, 10)));
        // Boxing it in on all four sides, close enough that spacing
        // keeps the grid from ever threading between them.
        g.add_pin(Pin::new("OTHER", "metal1", (-14, -14), (24, -4)));
        g.add_pin(Pin::new("OTHER", "metal1", (-14, 14), (24, 24)));
        g.add_pin(Pin::new("OTHER", "metal1", (-14, -14), (-4, 24)));
        g.add_pin(Pin::new("OTHER", "metal1", (14, -14), (24, 24)));
        // A normal, unrelated net elsewhere that should route cleanly.
        g.add_pin(Pin::new("CLEAR", "metal1", (500, 500), (510, 510)));
        g.add_pin(Pin::new("CLEAR", "metal1", (600, 500), (610, 510)));
    }

    let report = icroute_router::maze_routing(&tech, &mut circuit, 2, 1, 5.0, 0.2).unwrap();
    assert!(report.unrouted_nets.contains(&"TRAPPED".to_string()), "{report:?}");

    let routing_id = circuit.routing_group_id().unwrap();
    let group = &circuit.groups[&routing_id];
    let clear_shapes = group
        .shapes
        .get("metal1")
        .map(|shapes| shapes.iter().any(|s| s.x.0 >= 500))
        .unwrap_or(false);
    assert!(clear_shapes, "unrelated net should still have routed");
}
