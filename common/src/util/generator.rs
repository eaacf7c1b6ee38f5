use crate::db::circuit::{Circuit, Pin};
use crate::db::tech::Tech;
use rand::Rng;

/// A minimal, internally-consistent 7-layer technology table (poly +
/// metal1..metal6) with plausible relative rule magnitudes, used by the
/// CLI's `generate` subcommand and by tests that need a `Tech` without
/// a foundry deck.
pub fn sample_tech() -> Tech {
    let mut tech = Tech::new(10.0, 1.0);

    tech.set_width("poly", 20.0).set_spacing("poly", "poly", 20.0);
    tech.set_size("contact", 20.0);
    tech.set_enclosure("poly", "contact", false, 10.0);
    tech.set_enclosure("poly", "contact", true, 5.0);
    tech.set_spacing("ndiffusion", "poly", 30.0);
    tech.set_spacing("pdiffusion", "poly", 30.0);

    for i in 1..=6 {
        let layer = format!("metal{i}");
        tech.set_width(&layer, 20.0 + i as f64 * 2.0);
        tech.set_spacing(&layer, &layer, 20.0 + i as f64 * 2.0);
        tech.set_area(&layer, 4000.0);
        if i < 6 {
            let via = if i == 1 {
                "via12".to_string()
            } else {
                format!("via{i}{}", i + 1)
            };
            tech.set_size(&via, 20.0);
            tech.set_enclosure(&layer, &via, false, 10.0);
            tech.set_enclosure(&layer, &via, true, 5.0);
        }
    }

    tech
}

/// Builds a random chain-shaped circuit: `num_nets` nets, each
/// connecting two pins on alternating metal1/metal2 layers, walking
/// left to right across a synthetic die, in the spirit of the
/// teacher's `generate_random_def` chain benchmark.
pub fn generate_random_circuit(num_nets: usize, pitch: i64) -> Circuit {
    let mut rng = rand::thread_rng();
    let mut circuit = Circuit::new();
    let group = circuit.add_group("core");

    log::info!("Generating synthetic benchmark: {num_nets} nets, pitch {pitch}");

    for i in 0..num_nets {
        let net_name = format!("net{i}");
        let x0 = (i as i64) * pitch * 10;
        let y0 = rng.gen_range(0..pitch * 4);
        let layer = if i % 2 == 0 { "metal1" } else { "metal2" };

        let pin_a = Pin::new(&net_name, layer, (x0, y0), (x0 + pitch, y0 + pitch));
        let pin_b = Pin::new(
            &net_name,
            layer,
            (x0 + pitch * 6, y0),
            (x0 + pitch * 7, y0 + pitch),
        );

        let g = circuit.groups.get_mut(&group).unwrap();
        g.add_pin(pin_a);
        g.add_pin(pin_b);
    }

    circuit
}
