use garde::Validate;
use serde::{Deserialize, Serialize};

/// Instrumentation options, loadable from file and environment.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct WrapConfig {
    /// Namespace prefix for every emitted bucket; empty means unscoped.
    #[garde(pattern(r"^[A-Za-z0-9_.-]*$"))]
    #[serde(default)]
    pub prefix: String,

    /// Status bucket used when a handler dies before producing a response.
    #[garde(range(min = 100, max = 599))]
    #[serde(default = "default_fallback_status")]
    pub fallback_status: u16,
}

fn default_fallback_status() -> u16 {
    500
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            fallback_status: 500,
        }
    }
}
