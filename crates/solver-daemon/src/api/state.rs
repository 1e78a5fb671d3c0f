//! Application state for API handlers

/// Shared application state
///
/// Built once at startup and never mutated afterwards; handlers only
/// read from it.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service name shown on the info endpoint
    pub name: String,

    /// Service description shown on the info endpoint
    pub description: String,

    /// Daemon version
    pub version: String,
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        Self {
            name: "Symbolic Math Server".to_string(),
            description: "Solves symbolic mathematical expressions".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
