use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::exporter::settings::ExportSettings;
use crate::schema;

/// Host scene snapshot handed to the exporter.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SceneDSL {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub settings: Option<ExportSettings>,
    #[serde(default)]
    pub materials: Vec<MaterialDSL>,
    #[serde(default)]
    pub objects: Vec<ObjectDSL>,
    #[serde(default)]
    pub world: Option<WorldDSL>,
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    pub created: Option<String>,
    pub modified: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MaterialDSL {
    pub name: String,
    /// Number of host datablocks referencing this material.
    #[serde(default = "default_users")]
    pub users: u32,
    #[serde(default = "default_true", rename = "useNodes")]
    pub use_nodes: bool,
    #[serde(default = "default_diffuse_color", rename = "diffuseColor")]
    pub diffuse_color: Literal,
    #[serde(default, rename = "nodeTree")]
    pub node_tree: Option<NodeTreeDSL>,
}

fn default_users() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_diffuse_color() -> Literal {
    Literal::Vec4([0.8, 0.8, 0.8, 1.0])
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ObjectDSL {
    pub name: String,
    #[serde(default)]
    pub materials: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorldDSL {
    #[serde(default = "default_true", rename = "useNodes")]
    pub use_nodes: bool,
    #[serde(default = "default_world_color")]
    pub color: Literal,
    #[serde(default, rename = "nodeTree")]
    pub node_tree: Option<NodeTreeDSL>,
}

fn default_world_color() -> Literal {
    Literal::Vec3([0.050876, 0.050876, 0.050876])
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct NodeTreeDSL {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    /// Literal values of the input sockets, keyed by socket name.
    #[serde(default)]
    pub inputs: HashMap<String, Literal>,
    /// Kind-specific attributes (distribution, space, color, ...).
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub image: Option<ImageDSL>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ImageDSL {
    pub name: String,
    #[serde(default)]
    pub filepath: String,
    #[serde(default = "default_colorspace")]
    pub colorspace: String,
}

fn default_colorspace() -> String {
    "sRGB".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Connection {
    #[serde(default)]
    pub id: String,
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Endpoint {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    #[serde(rename = "portId")]
    pub port_id: String,
}

/// Literal socket value as the host stores it.
///
/// Variant order matters for untagged decoding: a 3-element array is a
/// `Vec3`, a 4-element array a `Vec4`, a 4x4 nested array a `Matrix`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Literal {
    Scalar(f64),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
    Matrix([[f64; 4]; 4]),
}

impl Literal {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Literal::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

pub fn load_scene_from_path(path: impl AsRef<std::path::Path>) -> Result<SceneDSL> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scene json at {}", path.display()))?;
    load_scene_from_str(&text)
}

pub fn load_scene_from_str(text: &str) -> Result<SceneDSL> {
    let mut scene: SceneDSL = serde_json::from_str(text).context("failed to parse scene json")?;

    // Hand-written snapshots often omit sockets left at their host default.
    normalize_scene_defaults(&mut scene)?;

    Ok(scene)
}

pub fn normalize_scene_defaults(scene: &mut SceneDSL) -> Result<()> {
    let scheme = schema::load_default_scheme()?;
    for material in &mut scene.materials {
        if let Some(tree) = material.node_tree.as_mut() {
            apply_node_defaults(tree, &scheme);
        }
    }
    if let Some(tree) = scene.world.as_mut().and_then(|w| w.node_tree.as_mut()) {
        apply_node_defaults(tree, &scheme);
    }
    Ok(())
}

fn apply_node_defaults(tree: &mut NodeTreeDSL, scheme: &schema::NodeScheme) {
    for node in &mut tree.nodes {
        let Some(node_scheme) = scheme.nodes.get(&node.node_type) else {
            continue;
        };
        for (k, v) in &node_scheme.default_inputs {
            node.inputs.entry(k.clone()).or_insert(*v);
        }
        for (k, v) in &node_scheme.default_params {
            node.params.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

pub fn find_material<'a>(scene: &'a SceneDSL, name: &str) -> Option<&'a MaterialDSL> {
    scene.materials.iter().find(|m| m.name == name)
}

pub fn parse_str<'a>(params: &'a HashMap<String, serde_json::Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub fn parse_bool(params: &HashMap<String, serde_json::Value>, key: &str) -> Option<bool> {
    params.get(key).and_then(|v| v.as_bool())
}
