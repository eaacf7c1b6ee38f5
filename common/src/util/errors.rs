use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("layer '{layer}' is missing required rule '{rule}'")]
    MissingRule { layer: String, rule: &'static str },

    #[error("no path found")]
    NoPath,

    #[error("net '{net}' could not be routed")]
    UnroutedNet { net: String },
}
