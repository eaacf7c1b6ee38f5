use super::indices::{GroupId, PortId};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxShape {
    pub layer: String,
    pub x: (i64, i64),
    pub y: (i64, i64),
}

impl BoxShape {
    pub fn new(layer: impl Into<String>, x: (i64, i64), y: (i64, i64)) -> Self {
        Self {
            layer: layer.into(),
            x,
            y,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pin {
    pub net: String,
    pub layer: String,
    pub pt1: (i64, i64),
    pub pt2: (i64, i64),
    /// (x, y, z) user-unit grid points populated by endpoint extraction.
    pub grid: Vec<(i64, i64, u8)>,
}

impl Pin {
    pub fn new(net: impl Into<String>, layer: impl Into<String>, pt1: (i64, i64), pt2: (i64, i64)) -> Self {
        Self {
            net: net.into(),
            layer: layer.into(),
            pt1,
            pt2,
            grid: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub shapes: HashMap<String, Vec<BoxShape>>,
    pub pins: Vec<Pin>,
}

impl Group {
    pub fn add_shape(&mut self, shape: BoxShape) {
        self.shapes.entry(shape.layer.clone()).or_default().push(shape);
    }

    pub fn add_pin(&mut self, pin: Pin) {
        self.pins.push(pin);
    }
}

#[derive(Debug, Clone)]
pub struct Port {
    pub name: String,
    pub shapes: HashMap<String, Vec<BoxShape>>,
}

impl Port {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shapes: HashMap::new(),
        }
    }

    pub fn add_shape(&mut self, shape: BoxShape) {
        self.shapes.entry(shape.layer.clone()).or_default().push(shape);
    }
}

pub const ROUTING_GROUP: &str = "routing";

#[derive(Debug, Clone, Default)]
pub struct Circuit {
    pub groups: HashMap<GroupId, Group>,
    pub ports: HashMap<PortId, Port>,
    group_names: HashMap<String, GroupId>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: impl Into<String>) -> GroupId {
        let name = name.into();
        if let Some(&id) = self.group_names.get(&name) {
            return id;
        }
        let id = GroupId::new(self.groups.len());
        self.groups.insert(id, Group::default());
        self.group_names.insert(name, id);
        id
    }

    pub fn add_port(&mut self, name: impl Into<String>) -> PortId {
        let name = name.into();
        let id = PortId::new(self.ports.len());
        self.ports.insert(id, Port::new(name));
        id
    }

    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.group_names.get(name).copied()
    }

    pub fn group_names(&self) -> impl Iterator<Item = (&str, GroupId)> {
        self.group_names.iter().map(|(n, &id)| (n.as_str(), id))
    }

    /// Ensures `circuit.group["routing"]` exists and returns its id,
    /// matching the source behavior of (re)initializing it fresh at
    /// the start of a routing pass.
    pub fn init_routing_group(&mut self) -> GroupId {
        let id = self.add_group(ROUTING_GROUP);
        self.groups.insert(id, Group::default());
        id
    }

    pub fn routing_group_id(&self) -> Option<GroupId> {
        self.group_id(ROUTING_GROUP)
    }

    /// All pins across all groups whose net matches `net_name`.
    pub fn pins_for_net<'a>(&'a self, net_name: &'a str) -> impl Iterator<Item = &'a Pin> + 'a {
        self.groups
            .values()
            .flat_map(|g| g.pins.iter())
            .filter(move |p| p.net == net_name)
    }

    /// Every distinct net name referenced by a pin, plus (if present)
    /// a matching port contributing a metal1 shape.
    pub fn all_net_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .values()
            .flat_map(|g| g.pins.iter())
            .map(|p| p.net.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
