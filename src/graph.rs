//! Read-only shading graph.
//!
//! A `ShaderGraph` is built once from a host node tree at the system boundary:
//! node table plus socket-to-node edges. Translation only ever reads it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::dsl::{ImageDSL, Literal, NodeTreeDSL, parse_bool, parse_str};
use crate::exporter::error::{ExportError, ExportResult};

pub type NodeId = usize;

/// Closed set of node kinds the exporter understands.
///
/// Host node types outside the whitelist are kept as `Unsupported` so that
/// translation can report them by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Diffuse,
    Glossy,
    Glass,
    Emission,
    Mix,
    TexImage,
    NormalMap,
    Fresnel,
    Rgb,
    TexEnvironment,
    Mapping,
    TexCoord,
    Background,
    Output,
    Unsupported(String),
}

impl NodeKind {
    pub fn from_idname(idname: &str) -> NodeKind {
        match idname {
            "ShaderNodeBsdfDiffuse" => NodeKind::Diffuse,
            "ShaderNodeBsdfGlossy" => NodeKind::Glossy,
            "ShaderNodeBsdfGlass" => NodeKind::Glass,
            "ShaderNodeEmission" => NodeKind::Emission,
            "ShaderNodeMixShader" => NodeKind::Mix,
            "ShaderNodeTexImage" => NodeKind::TexImage,
            "ShaderNodeNormalMap" => NodeKind::NormalMap,
            "ShaderNodeFresnel" => NodeKind::Fresnel,
            "ShaderNodeRGB" => NodeKind::Rgb,
            "ShaderNodeTexEnvironment" => NodeKind::TexEnvironment,
            "ShaderNodeMapping" => NodeKind::Mapping,
            "ShaderNodeTexCoord" => NodeKind::TexCoord,
            "ShaderNodeBackground" => NodeKind::Background,
            "ShaderNodeOutputMaterial" | "ShaderNodeOutputWorld" => NodeKind::Output,
            other => NodeKind::Unsupported(other.to_string()),
        }
    }

    pub fn idname(&self) -> &str {
        match self {
            NodeKind::Diffuse => "ShaderNodeBsdfDiffuse",
            NodeKind::Glossy => "ShaderNodeBsdfGlossy",
            NodeKind::Glass => "ShaderNodeBsdfGlass",
            NodeKind::Emission => "ShaderNodeEmission",
            NodeKind::Mix => "ShaderNodeMixShader",
            NodeKind::TexImage => "ShaderNodeTexImage",
            NodeKind::NormalMap => "ShaderNodeNormalMap",
            NodeKind::Fresnel => "ShaderNodeFresnel",
            NodeKind::Rgb => "ShaderNodeRGB",
            NodeKind::TexEnvironment => "ShaderNodeTexEnvironment",
            NodeKind::Mapping => "ShaderNodeMapping",
            NodeKind::TexCoord => "ShaderNodeTexCoord",
            NodeKind::Background => "ShaderNodeBackground",
            NodeKind::Output => "ShaderNodeOutputMaterial",
            NodeKind::Unsupported(idname) => idname,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.idname())
    }
}

/// Upstream end of a linked input socket.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub node: NodeId,
    pub output: String,
}

/// Named input socket.
///
/// The host keeps a default value on linked sockets too, so both may be set.
#[derive(Debug, Clone, PartialEq)]
pub struct Socket {
    pub name: String,
    pub default_value: Option<Literal>,
    pub link: Option<Link>,
}

impl Socket {
    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    pub fn require_default(&self) -> ExportResult<Literal> {
        self.default_value.ok_or_else(|| {
            ExportError::unsupported(format!("input '{}' has no literal value", self.name))
        })
    }

    /// Literal scalar value, regardless of whether the socket is linked.
    pub fn default_scalar(&self) -> ExportResult<f64> {
        self.require_default()?
            .as_scalar()
            .ok_or_else(|| ExportError::InvalidLiteral {
                socket: self.name.clone(),
                expected: "scalar",
            })
    }
}

/// Microfacet distribution attribute of glossy and glass nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    Sharp,
    Ggx,
    Beckmann,
    AshikhminShirley,
    MultiGgx,
}

impl FromStr for Distribution {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHARP" => Ok(Distribution::Sharp),
            "GGX" => Ok(Distribution::Ggx),
            "BECKMANN" => Ok(Distribution::Beckmann),
            "ASHIKHMIN_SHIRLEY" => Ok(Distribution::AshikhminShirley),
            "MULTI_GGX" => Ok(Distribution::MultiGgx),
            other => Err(ExportError::unsupported(format!(
                "microfacet distribution {other} is not supported"
            ))),
        }
    }
}

/// Opaque handle to an image datablock referenced by a texture node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub name: String,
    pub filepath: String,
    pub colorspace: String,
}

impl From<&ImageDSL> for ImageRef {
    fn from(image: &ImageDSL) -> Self {
        ImageRef {
            name: image.name.clone(),
            filepath: image.filepath.clone(),
            colorspace: image.colorspace.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShaderNode {
    pub id: String,
    pub kind: NodeKind,
    inputs: HashMap<String, Socket>,
    params: HashMap<String, serde_json::Value>,
    image: Option<ImageRef>,
}

impl ShaderNode {
    pub fn input(&self, name: &str) -> Option<&Socket> {
        self.inputs.get(name)
    }

    pub fn require_input(&self, name: &str) -> ExportResult<&Socket> {
        self.input(name).ok_or_else(|| ExportError::MissingInput {
            node: self.id.clone(),
            socket: name.to_string(),
        })
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        parse_str(&self.params, key)
    }

    pub fn param_literal(&self, key: &str) -> Option<Literal> {
        self.params
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Distribution attribute; host default is GGX.
    pub fn distribution(&self) -> ExportResult<Distribution> {
        self.param_str("distribution").unwrap_or("GGX").parse()
    }

    pub fn image(&self) -> ExportResult<&ImageRef> {
        self.image.as_ref().ok_or_else(|| {
            ExportError::unsupported(format!("texture node '{}' has no image assigned", self.id))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ShaderGraph {
    nodes: Vec<ShaderNode>,
    index_by_id: HashMap<String, NodeId>,
}

impl ShaderGraph {
    pub fn from_tree(tree: &NodeTreeDSL) -> ExportResult<ShaderGraph> {
        let mut nodes = Vec::with_capacity(tree.nodes.len());
        let mut index_by_id = HashMap::with_capacity(tree.nodes.len());

        for n in &tree.nodes {
            if index_by_id.insert(n.id.clone(), nodes.len()).is_some() {
                return Err(ExportError::MalformedGraph(format!("duplicate node id: {}", n.id)));
            }
            let inputs = n
                .inputs
                .iter()
                .map(|(name, value)| {
                    let socket = Socket {
                        name: name.clone(),
                        default_value: Some(*value),
                        link: None,
                    };
                    (name.clone(), socket)
                })
                .collect();
            nodes.push(ShaderNode {
                id: n.id.clone(),
                kind: NodeKind::from_idname(&n.node_type),
                inputs,
                params: n.params.clone(),
                image: n.image.as_ref().map(ImageRef::from),
            });
        }

        for c in &tree.connections {
            let (Some(&from), Some(&to)) = (
                index_by_id.get(c.from.node_id.as_str()),
                index_by_id.get(c.to.node_id.as_str()),
            ) else {
                return Err(ExportError::MalformedGraph(format!(
                    "connection references missing node: {} -> {}",
                    c.from.node_id, c.to.node_id
                )));
            };
            let socket = nodes[to]
                .inputs
                .entry(c.to.port_id.clone())
                .or_insert_with(|| Socket {
                    name: c.to.port_id.clone(),
                    default_value: None,
                    link: None,
                });
            if socket.link.is_some() {
                return Err(ExportError::MalformedGraph(format!(
                    "input {}.{} has more than one incoming link",
                    c.to.node_id, c.to.port_id
                )));
            }
            socket.link = Some(Link {
                node: from,
                output: c.from.port_id.clone(),
            });
        }

        Ok(ShaderGraph { nodes, index_by_id })
    }

    /// Node behind an id handed out by this graph.
    pub fn node(&self, id: NodeId) -> &ShaderNode {
        &self.nodes[id]
    }

    pub fn node_by_id(&self, id: &str) -> Option<&ShaderNode> {
        self.index_by_id.get(id).map(|&i| &self.nodes[i])
    }

    /// Upstream node feeding `socket`, if it is linked.
    pub fn linked_node(&self, socket: &Socket) -> Option<&ShaderNode> {
        socket.link.as_ref().map(|l| self.node(l.node))
    }

    /// The tree's output node, preferring the active one when there are several.
    pub fn output_node(&self) -> Option<&ShaderNode> {
        let mut outputs = self.nodes.iter().filter(|n| n.kind == NodeKind::Output);
        let first = outputs.next()?;
        if parse_bool(&first.params, "is_active_output").unwrap_or(true) {
            return Some(first);
        }
        outputs
            .find(|n| parse_bool(&n.params, "is_active_output").unwrap_or(false))
            .or(Some(first))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
