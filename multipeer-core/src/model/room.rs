use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the signaling service's `GET <url>/rooms` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDescriptor {
    pub app_name: String,
    #[serde(default)]
    pub name: String,
    /// Fields the mesh does not interpret (member count, password flag...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoomDescriptor {
    pub fn new(app_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }
}
