//! World shading graph to constant radiance or environment map.

use super::context::ExportContext;
use super::error::{ExportError, ExportResult};
use super::resolver::literal_color;
use super::types::{Background, Color, Envmap, color, scale_color, transform_matrix};
use crate::dsl::{Literal, WorldDSL};
use crate::graph::{NodeKind, ShaderGraph, ShaderNode};

/// Written when there is nothing to emit.
pub const NO_EMISSION: Color = [0.0; 3];
/// Written when the world graph cannot be translated.
pub const BACKGROUND_FALLBACK: Color = [5.0; 3];

/// Translate the scene's world. Never fails: translation errors are reported
/// and replaced by [`BACKGROUND_FALLBACK`].
pub fn translate_background(ctx: &mut ExportContext<'_>, world: Option<&WorldDSL>) -> Background {
    match try_translate_background(ctx, world) {
        Ok(background) => background,
        Err(err) => {
            ctx.warn(format!(
                "Error while converting background: {err}. Using default."
            ));
            Background::Constant(BACKGROUND_FALLBACK)
        }
    }
}

fn try_translate_background(
    ctx: &mut ExportContext<'_>,
    world: Option<&WorldDSL>,
) -> ExportResult<Background> {
    let Some(world) = world else {
        ctx.info("No world to export.");
        return Ok(Background::Constant(NO_EMISSION));
    };

    let Some(tree) = world.node_tree.as_ref().filter(|_| world.use_nodes) else {
        return color(&world.color)
            .map(Background::Constant)
            .ok_or_else(|| ExportError::InvalidLiteral {
                socket: "world color".to_string(),
                expected: "color",
            });
    };

    let graph = ShaderGraph::from_tree(tree)?;
    let Some(output) = graph.output_node() else {
        ctx.warn("Failed to export world: Cannot find world output node.");
        return Ok(Background::Constant(NO_EMISSION));
    };
    let Some(surface) = output.input("Surface").and_then(|s| graph.linked_node(s)) else {
        return Ok(Background::Constant(NO_EMISSION));
    };

    let strength_input = surface.require_input("Strength")?;
    if strength_input.is_linked() {
        return Err(ExportError::unsupported(
            "only literal emitter strength values are supported",
        ));
    }
    let strength = strength_input.default_scalar()?;
    if strength == 0.0 {
        ctx.info("Ignoring envmap with zero strength.");
        return Ok(Background::Constant(NO_EMISSION));
    }

    if !matches!(surface.kind, NodeKind::Background | NodeKind::Emission) {
        return Err(ExportError::UnsupportedNode {
            kind: surface.kind.clone(),
            expected: "background and emission nodes",
        });
    }

    let color_input = surface.require_input("Color")?;
    let base = match graph.linked_node(color_input) {
        None => literal_color(color_input)?,
        Some(node) if node.kind == NodeKind::TexEnvironment => {
            return envmap(ctx, &graph, node, strength).map(Background::Envmap);
        }
        Some(node) if node.kind == NodeKind::Rgb => node
            .param_literal("color")
            .as_ref()
            .and_then(color)
            .ok_or_else(|| ExportError::InvalidLiteral {
                socket: format!("{}.color", node.id),
                expected: "color",
            })?,
        Some(node) => {
            return Err(ExportError::UnsupportedNode {
                kind: node.kind.clone(),
                expected: "environment texture and RGB nodes",
            });
        }
    };

    let radiance = scale_color(base, strength);
    if radiance.iter().sum::<f64>() == 0.0 {
        ctx.info("Ignoring background emitter with zero emission.");
        return Ok(Background::Constant(NO_EMISSION));
    }
    Ok(Background::Constant(radiance))
}

fn envmap(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    node: &ShaderNode,
    strength: f64,
) -> ExportResult<Envmap> {
    let path = ctx.export_texture(node.image()?);

    let transform = match node.input("Vector").and_then(|s| graph.linked_node(s)) {
        Some(mapping) => Some(transform_matrix(&mapping_rotation(graph, mapping)?)),
        None => None,
    };

    Ok(Envmap {
        path,
        scale: strength,
        transform,
    })
}

/// Rotation of a `Mapping <- TexCoord.Generated` chain; anything else is rejected.
fn mapping_rotation(graph: &ShaderGraph, mapping: &ShaderNode) -> ExportResult<[[f64; 4]; 4]> {
    if mapping.kind != NodeKind::Mapping {
        return Err(ExportError::UnsupportedNode {
            kind: mapping.kind.clone(),
            expected: "mapping nodes",
        });
    }

    let vector = mapping.input("Vector").and_then(|s| s.link.as_ref());
    let Some(link) = vector else {
        return Err(ExportError::unsupported(
            "the mapping node should be linked to a texture coordinate node",
        ));
    };
    let coord = graph.node(link.node);
    if coord.kind != NodeKind::TexCoord {
        return Err(ExportError::UnsupportedNode {
            kind: coord.kind.clone(),
            expected: "texture coordinate nodes",
        });
    }
    if link.output != "Generated" {
        return Err(ExportError::unsupported(
            "the texture coordinate link should come from 'Generated'",
        ));
    }

    let rotation = mapping.require_input("Rotation")?;
    if rotation.is_linked() {
        return Err(ExportError::unsupported("rotation inputs should not be linked"));
    }
    match rotation.require_default()? {
        Literal::Vec3(euler) => Ok(euler_xyz_to_matrix(euler)),
        Literal::Matrix(m) => Ok(m),
        _ => Err(ExportError::InvalidLiteral {
            socket: "Rotation".to_string(),
            expected: "rotation",
        }),
    }
}

/// XYZ Euler angles (radians) to a homogeneous rotation, `Rz * Ry * Rx`.
pub fn euler_xyz_to_matrix([x, y, z]: [f64; 3]) -> [[f64; 4]; 4] {
    let (sx, cx) = x.sin_cos();
    let (sy, cy) = y.sin_cos();
    let (sz, cz) = z.sin_cos();
    [
        [cy * cz, sx * sy * cz - cx * sz, cx * sy * cz + sx * sz, 0.0],
        [cy * sz, sx * sy * sz + cx * cz, cx * sy * sz - sx * cz, 0.0],
        [-sy, sx * cy, cx * cy, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}
