use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routing: RoutingConfig::default(),
            input: InputConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    #[serde(default = "default_routing_layers")]
    pub routing_layers: u8,
    #[serde(default = "default_grid_extension_pitches")]
    pub grid_extension_pitches: f64,
    #[serde(default = "default_pitch_adjust_max")]
    pub pitch_adjust_max: u32,
    #[serde(default = "default_rdp_epsilon")]
    pub rdp_epsilon: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            routing_layers: default_routing_layers(),
            grid_extension_pitches: default_grid_extension_pitches(),
            pitch_adjust_max: default_pitch_adjust_max(),
            rdp_epsilon: default_rdp_epsilon(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_tech_file")]
    pub tech_file: String,
    #[serde(default = "default_circuit_file")]
    pub circuit_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tech_file: default_tech_file(),
            circuit_file: default_circuit_file(),
        }
    }
}

fn default_routing_layers() -> u8 {
    7
}

fn default_grid_extension_pitches() -> f64 {
    5.0
}

fn default_pitch_adjust_max() -> u32 {
    3
}

fn default_rdp_epsilon() -> f64 {
    0.2
}

fn default_tech_file() -> String {
    "inputs/tech.toml".to_string()
}

fn default_circuit_file() -> String {
    "inputs/circuit.toml".to_string()
}
