//! TOML-loadable fixture formats for [`Tech`] and [`Circuit`], used by
//! the CLI to load a routing job without a foundry deck. Deliberately
//! flat (a list of rule/pin entries rather than nested maps), since
//! TOML has no native non-string map key and the real `Tech`/`Circuit`
//! types key their tables on layer-name tuples.

use super::circuit::{Circuit, Pin};
use super::tech::Tech;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct TechFixture {
    pub unit_user: f64,
    pub unit_grid: f64,
    #[serde(default)]
    pub width: Vec<WidthRule>,
    #[serde(default)]
    pub spacing: Vec<SpacingRule>,
    #[serde(default)]
    pub enclosure: Vec<EnclosureRule>,
    #[serde(default)]
    pub size: Vec<SizeRule>,
    #[serde(default)]
    pub area: Vec<AreaRule>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WidthRule {
    pub layer: String,
    pub value: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SpacingRule {
    pub a: String,
    pub b: String,
    pub value: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EnclosureRule {
    pub layer: String,
    pub via: String,
    pub eol: bool,
    pub value: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SizeRule {
    pub layer: String,
    pub value: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AreaRule {
    pub layer: String,
    pub value: f64,
}

impl From<TechFixture> for Tech {
    fn from(f: TechFixture) -> Self {
        let mut tech = Tech::new(f.unit_user, f.unit_grid);
        for w in f.width {
            tech.set_width(w.layer, w.value);
        }
        for s in f.spacing {
            tech.set_spacing(s.a, s.b, s.value);
        }
        for e in f.enclosure {
            tech.set_enclosure(e.layer, e.via, e.eol, e.value);
        }
        for s in f.size {
            tech.set_size(s.layer, s.value);
        }
        for a in f.area {
            tech.set_area(a.layer, a.value);
        }
        tech
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CircuitFixture {
    #[serde(default)]
    pub group: Vec<GroupFixture>,
    #[serde(default)]
    pub pin: Vec<PinFixture>,
    #[serde(default)]
    pub port: Vec<PortFixture>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GroupFixture {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PinFixture {
    pub group: String,
    pub net: String,
    pub layer: String,
    pub pt1: (i64, i64),
    pub pt2: (i64, i64),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PortFixture {
    pub name: String,
}

impl From<CircuitFixture> for Circuit {
    fn from(f: CircuitFixture) -> Self {
        let mut circuit = Circuit::new();
        for g in &f.group {
            circuit.add_group(g.name.as_str());
        }
        for p in &f.pin {
            let group_id = circuit.add_group(p.group.as_str());
            let group = circuit.groups.get_mut(&group_id).unwrap();
            group.add_pin(Pin::new(p.net.as_str(), p.layer.as_str(), p.pt1, p.pt2));
        }
        for p in &f.port {
            circuit.add_port(p.name.as_str());
        }
        circuit
    }
}

impl From<&Tech> for TechFixture {
    fn from(t: &Tech) -> Self {
        Self {
            unit_user: t.unit_user,
            unit_grid: t.unit_grid,
            width: t
                .min_width_rule
                .iter()
                .map(|(layer, &value)| WidthRule { layer: layer.clone(), value })
                .collect(),
            spacing: t
                .min_spacing_rule
                .iter()
                .map(|((a, b), &value)| SpacingRule { a: a.clone(), b: b.clone(), value })
                .collect(),
            enclosure: t
                .min_enclosure_rule
                .iter()
                .map(|((layer, via, eol), &value)| EnclosureRule {
                    layer: layer.clone(),
                    via: via.clone(),
                    eol: *eol,
                    value,
                })
                .collect(),
            size: t
                .min_size_rule
                .iter()
                .map(|(layer, &value)| SizeRule { layer: layer.clone(), value })
                .collect(),
            area: t
                .min_area_rule
                .iter()
                .map(|(layer, &value)| AreaRule { layer: layer.clone(), value })
                .collect(),
        }
    }
}

impl From<&Circuit> for CircuitFixture {
    fn from(c: &Circuit) -> Self {
        let group = c
            .group_names()
            .map(|(name, _)| GroupFixture { name: name.to_string() })
            .collect();
        let mut pin = Vec::new();
        for (name, id) in c.group_names() {
            for p in &c.groups[&id].pins {
                pin.push(PinFixture {
                    group: name.to_string(),
                    net: p.net.clone(),
                    layer: p.layer.clone(),
                    pt1: p.pt1,
                    pt2: p.pt2,
                });
            }
        }
        let port = c
            .ports
            .values()
            .map(|p| PortFixture { name: p.name.clone() })
            .collect();
        Self { group, pin, port }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tech_fixture_builds_lookup_tables() {
        let toml = r#"
            unit_user = 10.0
            unit_grid = 1.0

            [[width]]
            layer = "metal1"
            value = 20.0

            [[spacing]]
            a = "metal1"
            b = "metal1"
            value = 20.0
        "#;
        let fixture: TechFixture = toml::from_str(toml).unwrap();
        let tech: Tech = fixture.into();
        assert_eq!(tech.min_width_rule["metal1"], 20.0);
        assert_eq!(tech.min_spacing_rule[&("metal1".to_string(), "metal1".to_string())], 20.0);
    }

    #[test]
    fn circuit_fixture_builds_pins_in_named_group() {
        let toml = r#"
            [[group]]
            name = "core"

            [[pin]]
            group = "core"
            net = "net0"
            layer = "metal1"
            pt1 = [0, 0]
            pt2 = [20, 20]
        "#;
        let fixture: CircuitFixture = toml::from_str(toml).unwrap();
        let circuit: Circuit = fixture.into();
        let group_id = circuit.group_id("core").unwrap();
        assert_eq!(circuit.groups[&group_id].pins.len(), 1);
    }
}
