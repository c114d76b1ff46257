use super::context::ExportContext;
use super::error::ExportResult;
use super::types::TextureRef;
use crate::graph::ShaderNode;

/// Color spaces holding data rather than color; the renderer must not decode them.
const RAW_COLORSPACES: [&str; 3] = ["Non-Color", "Raw", "Linear"];

/// Translate an image-sampling node into a texture descriptor.
pub fn translate_texture(
    ctx: &mut ExportContext<'_>,
    node: &ShaderNode,
) -> ExportResult<TextureRef> {
    let image = node.image()?;
    let path = ctx.export_texture(image);

    let raw = RAW_COLORSPACES.contains(&image.colorspace.as_str());
    if !raw && image.colorspace != "sRGB" {
        ctx.warn(format!(
            "Texture '{}' uses color space '{}'; only sRGB is supported for color data.",
            image.name, image.colorspace
        ));
    }

    Ok(TextureRef { path, raw })
}
