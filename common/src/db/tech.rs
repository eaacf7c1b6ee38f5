use std::collections::HashMap;

/// Technology rule table. Database units throughout except `unit_user`
/// and `unit_grid`, which are the scale factors relating database
/// units to user units and to the emission snap quantum.
#[derive(Debug, Clone, Default)]
pub struct Tech {
    pub unit_user: f64,
    pub unit_grid: f64,
    pub min_width_rule: HashMap<String, f64>,
    pub min_spacing_rule: HashMap<(String, String), f64>,
    pub min_enclosure_rule: HashMap<(String, String, bool), f64>,
    pub min_size_rule: HashMap<String, f64>,
    pub min_area_rule: HashMap<String, f64>,
}

impl Tech {
    pub fn new(unit_user: f64, unit_grid: f64) -> Self {
        Self {
            unit_user,
            unit_grid,
            ..Default::default()
        }
    }

    pub fn set_width(&mut self, layer: impl Into<String>, value: f64) -> &mut Self {
        self.min_width_rule.insert(layer.into(), value);
        self
    }

    pub fn set_spacing(&mut self, a: impl Into<String>, b: impl Into<String>, value: f64) -> &mut Self {
        self.min_spacing_rule.insert((a.into(), b.into()), value);
        self
    }

    pub fn set_enclosure(
        &mut self,
        layer: impl Into<String>,
        via: impl Into<String>,
        eol: bool,
        value: f64,
    ) -> &mut Self {
        self.min_enclosure_rule
            .insert((layer.into(), via.into(), eol), value);
        self
    }

    pub fn set_size(&mut self, layer: impl Into<String>, value: f64) -> &mut Self {
        self.min_size_rule.insert(layer.into(), value);
        self
    }

    pub fn set_area(&mut self, layer: impl Into<String>, value: f64) -> &mut Self {
        self.min_area_rule.insert(layer.into(), value);
        self
    }
}
