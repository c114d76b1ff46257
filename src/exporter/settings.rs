use std::str::FromStr;

use anyhow::{Error, bail};
use serde::{Deserialize, Serialize};

/// How materials are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialMode {
    /// Translate every used material's shading graph.
    #[default]
    Convert,
    /// Ignore shading graphs; write one placeholder per used material.
    Flatten,
}

/// Renderer material family used for glossy BSDF nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum GlossyMode {
    #[default]
    #[serde(rename = "rough conductor", alias = "rough-conductor")]
    RoughConductor,
    #[serde(rename = "blinn-phong")]
    BlinnPhong,
    #[serde(rename = "phong")]
    Phong,
    #[serde(rename = "metal")]
    Metal,
}

impl FromStr for MaterialMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "convert" => Ok(MaterialMode::Convert),
            "flatten" | "lambertian" => Ok(MaterialMode::Flatten),
            other => bail!("unknown material mode: {other} (supported: convert, flatten)"),
        }
    }
}

impl FromStr for GlossyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rough conductor" | "rough-conductor" => Ok(GlossyMode::RoughConductor),
            "blinn-phong" => Ok(GlossyMode::BlinnPhong),
            "phong" => Ok(GlossyMode::Phong),
            "metal" => Ok(GlossyMode::Metal),
            other => bail!(
                "unknown glossy mode: {other} (supported: rough-conductor, blinn-phong, phong, metal)"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    pub material_mode: MaterialMode,
    pub glossy_mode: GlossyMode,
    /// Directory, relative to the scene file, that textures are exported into.
    pub texture_dir: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            material_mode: MaterialMode::Convert,
            glossy_mode: GlossyMode::RoughConductor,
            texture_dir: "textures".to_string(),
        }
    }
}
