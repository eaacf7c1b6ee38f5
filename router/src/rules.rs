use icroute_common::db::tech::Tech;
use icroute_common::util::errors::RouteError;

/// Resolves per-layer pitch, half-width, spacing, enclosure, via-size
/// and area rules from a [`Tech`] table into the derived quantities the
/// rest of the engine consumes. Layer index `0` is `poly`, index `k>=1`
/// is `metal{k}`. Via index `k` is the cut between layer `k` and layer
/// `k+1` (via `0` is `contact`).
pub struct RuleView<'a> {
    tech: &'a Tech,
    pub num_layers: u8,
    layer_names: Vec<String>,
    pitch: Vec<f64>,
}

impl<'a> RuleView<'a> {
    pub fn new(tech: &'a Tech, num_layers: u8) -> Result<Self, RouteError> {
        let mut layer_names = vec!["poly".to_string()];
        for k in 1..num_layers {
            layer_names.push(format!("metal{k}"));
        }

        let mut view = Self {
            tech,
            num_layers,
            layer_names,
            pitch: Vec::new(),
        };

        let mut pitch = Vec::with_capacity(num_layers as usize);
        for k in 0..num_layers {
            let layer = view.layer_name(k).to_string();
            let w = view.width(&layer)?;
            let s = view.spacing(&layer, &layer)?;
            pitch.push(view.to_user(w + s));
        }
        view.pitch = pitch;
        Ok(view)
    }

    pub fn layer_name(&self, index: u8) -> &str {
        &self.layer_names[index as usize]
    }

    pub fn layer_index(&self, name: &str) -> Option<u8> {
        self.layer_names.iter().position(|n| n == name).map(|i| i as u8)
    }

    pub fn via_name(&self, via_index: u8) -> String {
        if via_index == 0 {
            "contact".to_string()
        } else {
            format!("via{}{}", via_index, via_index + 1)
        }
    }

    pub fn pitch(&self, layer_index: u8) -> f64 {
        self.pitch[layer_index as usize]
    }

    pub fn unit_user(&self) -> f64 {
        self.tech.unit_user
    }

    pub fn unit_grid(&self) -> f64 {
        self.tech.unit_grid
    }

    pub fn to_user(&self, dbu: f64) -> f64 {
        dbu / self.tech.unit_user
    }

    pub fn width(&self, layer: &str) -> Result<f64, RouteError> {
        self.tech
            .min_width_rule
            .get(layer)
            .copied()
            .ok_or_else(|| RouteError::MissingRule {
                layer: layer.to_string(),
                rule: "min_width",
            })
    }

    pub fn half_width(&self, layer: &str) -> Result<f64, RouteError> {
        Ok(self.width(layer)? / 2.0)
    }

    pub fn spacing(&self, a: &str, b: &str) -> Result<f64, RouteError> {
        self.tech
            .min_spacing_rule
            .get(&(a.to_string(), b.to_string()))
            .or_else(|| self.tech.min_spacing_rule.get(&(b.to_string(), a.to_string())))
            .copied()
            .ok_or_else(|| RouteError::MissingRule {
                layer: format!("{a},{b}"),
                rule: "min_spacing",
            })
    }

    pub fn enclosure(&self, layer: &str, via: &str, eol: bool) -> Result<f64, RouteError> {
        self.tech
            .min_enclosure_rule
            .get(&(layer.to_string(), via.to_string(), eol))
            .copied()
            .ok_or_else(|| RouteError::MissingRule {
                layer: format!("{layer},{via}"),
                rule: if eol { "min_enclosure(end)" } else { "min_enclosure" },
            })
    }

    pub fn size(&self, layer: &str) -> Result<f64, RouteError> {
        self.tech
            .min_size_rule
            .get(layer)
            .copied()
            .ok_or_else(|| RouteError::MissingRule {
                layer: layer.to_string(),
                rule: "min_size",
            })
    }

    pub fn area(&self, layer: &str) -> Result<f64, RouteError> {
        self.tech
            .min_area_rule
            .get(layer)
            .copied()
            .ok_or_else(|| RouteError::MissingRule {
                layer: layer.to_string(),
                rule: "min_area",
            })
    }

    /// The via layer name between `a` and `b` adjacent metal/poly
    /// layer indices, oriented from `a` towards `b`.
    pub fn via_between(&self, a: u8, b: u8) -> String {
        self.via_name(a.min(b))
    }
}
