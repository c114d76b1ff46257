//! Surface-shader translation: one BSDF node (and everything it pulls in)
//! to one material record.

use super::context::ExportContext;
use super::error::{ExportError, ExportResult};
use super::normal_map::wrap_normal_map;
use super::resolver::{
    ROUGHNESS, literal_color, perceptual_to_alpha, resolve_color, resolve_scalar,
};
use super::settings::GlossyMode;
use super::types::{
    ColorValue, Material, MaterialRecord, MicrofacetDistribution, ScalarValue, scale_color,
};
use crate::graph::{NodeKind, ShaderGraph, ShaderNode};

/// Albedo written in place of an emitter that emits nothing.
pub const ZERO_EMISSION_ALBEDO: [f64; 3] = [0.0; 3];

/// Translate the shading node `node` into a material record named `name`.
pub fn translate(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    node: &ShaderNode,
    name: Option<&str>,
) -> ExportResult<MaterialRecord> {
    log::debug!("translating {} node '{}'", node.kind, node.id);

    let material = match &node.kind {
        NodeKind::Diffuse => convert_diffuse(ctx, graph, node)?,
        NodeKind::Glossy => convert_glossy(ctx, graph, node)?,
        NodeKind::Glass => convert_glass(ctx, graph, node)?,
        NodeKind::Emission => convert_emission(ctx, node)?,
        NodeKind::Mix => convert_mix(ctx, graph, node)?,
        NodeKind::TexImage
        | NodeKind::NormalMap
        | NodeKind::Fresnel
        | NodeKind::Rgb
        | NodeKind::TexEnvironment
        | NodeKind::Mapping
        | NodeKind::TexCoord
        | NodeKind::Background
        | NodeKind::Output
        | NodeKind::Unsupported(_) => {
            return Err(ExportError::UnsupportedNode {
                kind: node.kind.clone(),
                expected: "diffuse, glossy, glass, emission and mix shader nodes",
            });
        }
    };

    let record = MaterialRecord::new(name.map(str::to_string), material);
    match node.input("Normal") {
        Some(normal) if normal.is_linked() => wrap_normal_map(ctx, graph, record, normal),
        _ => Ok(record),
    }
}

fn convert_diffuse(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    node: &ShaderNode,
) -> ExportResult<Material> {
    let rough = node.input(ROUGHNESS).is_some_and(|r| {
        r.is_linked() || r.default_value.and_then(|v| v.as_scalar()).is_some_and(|v| v != 0.0)
    });
    if rough {
        ctx.warn(format!(
            "Rough diffuse BSDF '{}' is not supported. Ignoring its roughness.",
            node.id
        ));
    }

    let albedo = node
        .input("Color")
        .map(|c| resolve_color(ctx, graph, c))
        .transpose()?;
    Ok(Material::Lambertian { albedo })
}

/// Blinn-Phong exponent equivalent to a microfacet alpha.
pub fn roughness_to_blinn_exponent(alpha: f64) -> f64 {
    (2.0 / (alpha * alpha) - 1.0).max(0.0)
}

fn convert_glossy(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    node: &ShaderNode,
) -> ExportResult<Material> {
    let distribution = MicrofacetDistribution::from_host(node.distribution()?);
    let color_input = node.require_input("Color")?;

    match ctx.settings.glossy_mode {
        GlossyMode::RoughConductor => match distribution {
            Some(distribution) => {
                let roughness = resolve_scalar(ctx, graph, node.require_input(ROUGHNESS)?)?;
                Ok(Material::RoughConductor {
                    roughness,
                    distribution,
                    color: resolve_color(ctx, graph, color_input)?,
                })
            }
            None => Ok(Material::Conductor {
                color: resolve_color(ctx, graph, color_input)?,
            }),
        },
        mode @ (GlossyMode::BlinnPhong | GlossyMode::Phong) => {
            let roughness = node.require_input(ROUGHNESS)?;
            if roughness.is_linked() {
                return Err(ExportError::unsupported(
                    "Phong and Blinn-Phong roughness does not support textures",
                ));
            }
            let alpha = perceptual_to_alpha(roughness.default_scalar()?);
            let exponent = roughness_to_blinn_exponent(alpha);
            let albedo = resolve_color(ctx, graph, color_input)?;

            match distribution {
                // A vanishing alpha is a perfect mirror: same as SHARP.
                Some(distribution) if exponent.is_finite() => {
                    Ok(if mode == GlossyMode::Phong {
                        Material::Phong {
                            exponent: exponent / 4.0,
                            distribution,
                            albedo,
                        }
                    } else {
                        Material::BlinnPhong {
                            exponent,
                            distribution,
                            albedo,
                        }
                    })
                }
                _ => Ok(Material::Metal {
                    roughness: ScalarValue::Constant(0.0),
                    albedo,
                }),
            }
        }
        GlossyMode::Metal => {
            let roughness = match distribution {
                Some(_) => resolve_scalar(ctx, graph, node.require_input(ROUGHNESS)?)?,
                None => ScalarValue::Constant(0.0),
            };
            Ok(Material::Metal {
                roughness,
                albedo: resolve_color(ctx, graph, color_input)?,
            })
        }
    }
}

fn convert_glass(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    node: &ShaderNode,
) -> ExportResult<Material> {
    let ior_input = node.require_input("IOR")?;
    if ior_input.is_linked() {
        ctx.warn("Textured IOR values are not supported. Using the default value instead.");
    }
    let ior = ior_input.default_scalar()?;

    let roughness = resolve_scalar(ctx, graph, node.require_input(ROUGHNESS)?)?;
    let distribution = MicrofacetDistribution::from_host(node.distribution()?);

    let specular_transmittance = node
        .input("Color")
        .map(|c| resolve_color(ctx, graph, c))
        .transpose()?;

    Ok(match distribution {
        Some(distribution) if !roughness.is_zero() => Material::RoughDielectric {
            roughness,
            distribution,
            ior,
            specular_transmittance,
        },
        _ if ior == 1.0 => Material::ThinDielectric {
            ior,
            specular_transmittance,
        },
        _ => Material::Dielectric {
            ior,
            specular_transmittance,
        },
    })
}

fn convert_emission(ctx: &mut ExportContext<'_>, node: &ShaderNode) -> ExportResult<Material> {
    let strength = node.require_input("Strength")?;
    if strength.is_linked() {
        return Err(ExportError::unsupported(
            "only literal emitter strength values are supported",
        ));
    }
    let color_input = node.require_input("Color")?;
    if color_input.is_linked() {
        return Err(ExportError::unsupported(
            "only literal emitter colors are supported",
        ));
    }

    let radiance = scale_color(literal_color(color_input)?, strength.default_scalar()?);
    if radiance.iter().sum::<f64>() == 0.0 {
        ctx.warn(format!(
            "Emitter '{}' has zero emission and would break light sampling. Exporting a black diffuse material instead.",
            node.id
        ));
        return Ok(Material::Lambertian {
            albedo: Some(ColorValue::Constant(ZERO_EMISSION_ALBEDO)),
        });
    }

    Ok(Material::DiffuseLight { emit: radiance })
}

fn convert_mix(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    node: &ShaderNode,
) -> ExportResult<Material> {
    let first = node.input("Shader").and_then(|s| graph.linked_node(s));
    let second = node.input("Shader_001").and_then(|s| graph.linked_node(s));
    let (Some(first), Some(second)) = (first, second) else {
        return Err(ExportError::unsupported(
            "mix shader is not linked to two materials",
        ));
    };

    let amount = resolve_scalar(ctx, graph, node.require_input("Fac")?)?;
    let a = translate(ctx, graph, first, None)?;
    let b = translate(ctx, graph, second, None)?;

    Ok(Material::Blend {
        amount,
        a: Box::new(a),
        b: Box::new(b),
    })
}
