//! Per-scene material export: default material, per-material recovery and
//! deduplication.

use serde::Serialize;

use super::background::translate_background;
use super::context::ExportContext;
use super::error::{ExportError, ExportResult};
use super::settings::MaterialMode;
use super::surface;
use super::types::{Background, Color, ColorValue, Material, MaterialRecord, color};
use crate::dsl::{MaterialDSL, NodeTreeDSL, SceneDSL, find_material};
use crate::graph::ShaderGraph;

pub const DEFAULT_MATERIAL_NAME: &str = "default";
pub const DEFAULT_ALBEDO: Color = [0.2, 0.2, 0.2];
/// Loud magenta so that placeholders stand out in renders.
pub const DUMMY_ALBEDO: Color = [1.0, 0.0, 0.3];
/// Stroke/annotation material the host creates on its own.
pub const IGNORED_MATERIAL: &str = "Dots Stroke";

/// Renderer-side material name.
pub fn material_name(name: &str) -> String {
    name.replace(' ', "_")
}

pub fn default_material() -> MaterialRecord {
    MaterialRecord::new(
        Some(DEFAULT_MATERIAL_NAME.to_string()),
        Material::Lambertian {
            albedo: Some(ColorValue::Constant(DEFAULT_ALBEDO)),
        },
    )
}

pub fn dummy_material(name: &str) -> MaterialRecord {
    flat_material(name, DUMMY_ALBEDO)
}

fn flat_material(name: &str, albedo: Color) -> MaterialRecord {
    MaterialRecord::new(
        Some(material_name(name)),
        Material::Lambertian {
            albedo: Some(ColorValue::Constant(albedo)),
        },
    )
}

fn is_exported(material: &MaterialDSL) -> bool {
    material.users > 0 && material.name != IGNORED_MATERIAL
}

/// Skip `material` if its exported name is taken. Returns `true` when the name
/// was free; a clash with a different host material is reported.
fn claim_name(ctx: &mut ExportContext<'_>, material: &MaterialDSL, name: &str) -> bool {
    if !ctx.registry.contains(name) {
        return true;
    }
    match ctx.registry.host_name(name).map(str::to_string) {
        Some(host) if host == material.name => {
            log::debug!("material '{name}' already exported");
        }
        Some(host) => ctx.warn(format!(
            "Material '{}' is exported as '{name}', which material '{host}' already uses. Skipping it.",
            material.name
        )),
        None => ctx.warn(format!(
            "Material '{}' is exported as '{name}', which is reserved. Skipping it.",
            material.name
        )),
    }
    false
}

/// Translate one material into the registry. Returns `false` if its exported
/// name was already registered. Translation failures are reported and
/// replaced by the dummy.
pub fn convert_material(ctx: &mut ExportContext<'_>, material: &MaterialDSL) -> bool {
    let name = material_name(&material.name);
    if !claim_name(ctx, material, &name) {
        return false;
    }

    let record = match material.node_tree.as_ref().filter(|_| material.use_nodes) {
        Some(tree) => match convert_tree(ctx, tree, &name) {
            Ok(record) => record,
            Err(err) => {
                ctx.warn(format!(
                    "Export of material '{}' failed: {err}. Exporting a dummy material instead.",
                    material.name
                ));
                dummy_material(&material.name)
            }
        },
        None => {
            let albedo = color(&material.diffuse_color).unwrap_or(DUMMY_ALBEDO);
            flat_material(&material.name, albedo)
        }
    };

    ctx.registry.register(&name, Some(&material.name), record)
}

fn convert_tree(
    ctx: &mut ExportContext<'_>,
    tree: &NodeTreeDSL,
    name: &str,
) -> ExportResult<MaterialRecord> {
    let graph = ShaderGraph::from_tree(tree)?;
    let output = graph
        .output_node()
        .ok_or_else(|| ExportError::unsupported("Cannot find material output node"))?;
    let surface_node = output
        .input("Surface")
        .and_then(|s| graph.linked_node(s))
        .ok_or_else(|| {
            ExportError::unsupported("the Surface input of the material output is unlinked")
        })?;
    surface::translate(ctx, &graph, surface_node, Some(name))
}

/// The material list of the scene, default material first. Drains the
/// context's registry.
pub fn export_materials(ctx: &mut ExportContext<'_>, scene: &SceneDSL) -> Vec<MaterialRecord> {
    ctx.info("Writing default lambertian material");
    ctx.registry.register(DEFAULT_MATERIAL_NAME, None, default_material());

    match ctx.settings.material_mode {
        MaterialMode::Flatten => {
            for material in scene.materials.iter().filter(|m| is_exported(m)) {
                let name = material_name(&material.name);
                if claim_name(ctx, material, &name) {
                    ctx.info(format!("Writing material: {}", material.name));
                    let record = dummy_material(&material.name);
                    ctx.registry.register(&name, Some(&material.name), record);
                }
            }
        }
        MaterialMode::Convert => {
            for object in &scene.objects {
                for material_ref in &object.materials {
                    let Some(material) = find_material(scene, material_ref) else {
                        ctx.warn(format!(
                            "Object '{}' uses unknown material '{material_ref}'. Skipping it.",
                            object.name
                        ));
                        continue;
                    };
                    if is_exported(material) && convert_material(ctx, material) {
                        ctx.info(format!("Writing material: {}", material.name));
                    }
                }
            }
        }
    }

    std::mem::take(&mut ctx.registry).into_records()
}

/// Everything the exporter contributes to a renderer scene file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneExport {
    pub background: Background,
    pub materials: Vec<MaterialRecord>,
}

pub fn export_scene(ctx: &mut ExportContext<'_>, scene: &SceneDSL) -> SceneExport {
    let background = translate_background(ctx, scene.world.as_ref());
    let materials = export_materials(ctx, scene);
    SceneExport {
        background,
        materials,
    }
}
