use serde::{Deserialize, Serialize};

/// GitHub label
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubLabel {
    pub name: String,
    /// Color hex string WITHOUT `#` prefix (e.g., "fc2929")
    #[serde(default)]
    pub color: String,
}
