use super::context::ExportContext;
use super::error::{ExportError, ExportResult};
use super::resolver::resolve_color;
use super::types::{Material, MaterialRecord};
use crate::graph::{NodeKind, ShaderGraph, Socket};

/// Wrap `base` in a normal-mapping adaptor fed by the linked `normal` socket.
///
/// The wrapper takes over the base record's name.
pub fn wrap_normal_map(
    ctx: &mut ExportContext<'_>,
    graph: &ShaderGraph,
    mut base: MaterialRecord,
    normal: &Socket,
) -> ExportResult<MaterialRecord> {
    let normals = resolve_color(ctx, graph, normal)?;

    let strength = match graph.linked_node(normal) {
        Some(node) if node.kind == NodeKind::NormalMap => {
            let strength = node.require_input("Strength")?;
            if strength.is_linked() {
                return Err(ExportError::unsupported(
                    "only literal normal map strength values are supported",
                ));
            }
            Some(strength.default_scalar()?)
        }
        _ => None,
    };

    let name = base.name.take();
    Ok(MaterialRecord::new(
        name,
        Material::NormalMap {
            normals,
            strength,
            nested: Box::new(base),
        },
    ))
}
