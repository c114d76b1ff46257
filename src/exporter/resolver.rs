//! Resolution of single input sockets to literals or nested descriptors.

use super::context::ExportContext;
use super::error::{ExportError, ExportResult};
use super::texture::translate_texture;
use super::types::{Color, ColorValue, Fresnel, ScalarValue, color};
use crate::graph::{NodeKind, ShaderGraph, ShaderNode, Socket};

/// Socket whose literal is perceptual and squared before export.
pub const ROUGHNESS: &str = "Roughness";

/// Host roughness sliders are perceptual; physically based distributions take alpha.
pub fn perceptual_to_alpha(roughness: f64) -> f64 {
    roughness * roughness
}

pub fn resolve_scalar(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    socket: &Socket,
) -> ExportResult<ScalarValue> {
    let Some(node) = graph.linked_node(socket) else {
        let value = socket.default_scalar()?;
        // Matched by socket name only: Fac and friends keep their literal.
        if socket.name == ROUGHNESS {
            return Ok(ScalarValue::Constant(perceptual_to_alpha(value)));
        }
        return Ok(ScalarValue::Constant(value));
    };

    match node.kind {
        NodeKind::TexImage => Ok(ScalarValue::Texture(translate_texture(ctx, node)?)),
        NodeKind::Fresnel => {
            let ior = node.require_input("IOR")?;
            if ior.is_linked() {
                ctx.warn("Textured IOR values are not supported. Using the default value instead.");
            }
            Ok(ScalarValue::Fresnel(Fresnel {
                ior: ior.default_scalar()?,
            }))
        }
        _ => Err(ExportError::UnsupportedNode {
            kind: node.kind.clone(),
            expected: "image texture and fresnel nodes",
        }),
    }
}

pub fn resolve_color(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    socket: &Socket,
) -> ExportResult<ColorValue> {
    let Some(node) = graph.linked_node(socket) else {
        return literal_color(socket).map(ColorValue::Constant);
    };

    match node.kind {
        NodeKind::TexImage => Ok(ColorValue::Texture(translate_texture(ctx, node)?)),
        NodeKind::NormalMap => normal_map_texture(ctx, graph, node),
        NodeKind::Rgb => node
            .param_literal("color")
            .as_ref()
            .and_then(color)
            .map(ColorValue::Constant)
            .ok_or_else(|| ExportError::InvalidLiteral {
                socket: format!("{}.color", node.id),
                expected: "color",
            }),
        _ => Err(ExportError::UnsupportedNode {
            kind: node.kind.clone(),
            expected: "image texture, normal map and RGB nodes",
        }),
    }
}

/// Literal color of a socket, linked or not.
pub(crate) fn literal_color(socket: &Socket) -> ExportResult<Color> {
    color(&socket.require_default()?).ok_or_else(|| ExportError::InvalidLiteral {
        socket: socket.name.clone(),
        expected: "color",
    })
}

fn normal_map_texture(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    node: &ShaderNode,
) -> ExportResult<ColorValue> {
    if node.param_str("space").unwrap_or("TANGENT") != "TANGENT" {
        return Err(ExportError::unsupported(
            "only tangent-space normal maps are supported",
        ));
    }

    let color_input = node.require_input("Color")?;
    match graph.linked_node(color_input) {
        Some(tex) if tex.kind == NodeKind::TexImage => {
            Ok(ColorValue::Texture(translate_texture(ctx, tex)?))
        }
        Some(other) => Err(ExportError::UnsupportedNode {
            kind: other.kind.clone(),
            expected: "image texture nodes",
        }),
        None => Err(ExportError::unsupported(format!(
            "normal map node '{}' is not fed by an image texture",
            node.id
        ))),
    }
}
