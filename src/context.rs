//! The data templates are evaluated against.

use std::path::Path;

use anyhow::{Result, Context, anyhow};
use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};


/// The static part of every `RenderContext`, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default, rename = "authData")]
    pub auth_data: Map<String, Value>,
}

impl ContextData {
    pub fn new(portal_gui_url: &str, auth_type: &str) -> Self {
        let mut config = Map::new();
        config.insert("PORTAL_GUI_URL".into(), Value::from(portal_gui_url));
        let mut auth_data = Map::new();
        auth_data.insert("authType".into(), Value::from(auth_type));
        ContextData { config, auth_data }
    }

    /// Entries in `other` replace entries with the same key in self
    /// (shallow, per top-level key of `config` and `authData`).
    pub fn merge(&mut self, other: ContextData) {
        self.config.extend(other.config);
        self.auth_data.extend(other.auth_data);
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(
            || anyhow!("opening path for reading: {:?}", path))?;
        Self::from_json_str(&s).with_context(
            || anyhow!("parsing context file {:?}", path))
    }
}


/// Per-request, immutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub config: Map<String, Value>,
    pub auth_data: Map<String, Value>,
    pub is_authenticated: bool,
}

impl RenderContext {
    pub fn new(data: &ContextData, is_authenticated: bool) -> Self {
        RenderContext {
            config: data.config.clone(),
            auth_data: data.auth_data.clone(),
            is_authenticated,
        }
    }
}
