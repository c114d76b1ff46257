use std::collections::HashMap;

use anyhow::{Result, anyhow};
use serde::Deserialize;

use crate::dsl::Literal;

const DEFAULT_NODE_SCHEME_JSON: &str = include_str!("../assets/node-scheme.json");

/// Host defaults per node type, used to complete sparse snapshots.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeScheme {
    pub version: String,
    pub nodes: HashMap<String, NodeTypeScheme>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeTypeScheme {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub default_inputs: HashMap<String, Literal>,
    #[serde(default)]
    pub default_params: HashMap<String, serde_json::Value>,
}

pub fn load_default_scheme() -> Result<NodeScheme> {
    serde_json::from_str(DEFAULT_NODE_SCHEME_JSON)
        .map_err(|e| anyhow!("failed to parse assets/node-scheme.json: {e}"))
}
