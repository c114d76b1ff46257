//! Output records consumed by the renderer.
//!
//! Field names and `type` tags are the renderer's scene-description wire
//! format and must not change.

use serde::Serialize;

use crate::dsl::Literal;
use crate::graph::Distribution;

/// Linear RGB triple.
pub type Color = [f64; 3];

/// Exported image texture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "image")]
pub struct TextureRef {
    #[serde(rename = "filename")]
    pub path: String,
    /// Skip gamma decoding in the renderer.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub raw: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "fresnel")]
pub struct Fresnel {
    pub ior: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Constant(f64),
    Texture(TextureRef),
    Fresnel(Fresnel),
}

impl ScalarValue {
    /// Only a literal zero counts; any texture is assumed to vary.
    pub fn is_zero(&self) -> bool {
        matches!(self, ScalarValue::Constant(v) if *v == 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorValue {
    Constant(Color),
    Texture(TextureRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MicrofacetDistribution {
    Ggx,
    Beckmann,
    Blinn,
}

impl MicrofacetDistribution {
    /// Renderer counterpart of a host distribution; `Sharp` has none.
    pub fn from_host(distribution: Distribution) -> Option<Self> {
        match distribution {
            Distribution::Sharp => None,
            Distribution::Ggx | Distribution::MultiGgx => Some(MicrofacetDistribution::Ggx),
            Distribution::Beckmann => Some(MicrofacetDistribution::Beckmann),
            Distribution::AshikhminShirley => Some(MicrofacetDistribution::Blinn),
        }
    }
}

/// One material entry. The name lives beside the tagged body so that
/// wrappers can take it over from the record they nest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub material: Material,
}

impl MaterialRecord {
    pub fn new(name: Option<String>, material: Material) -> Self {
        MaterialRecord { name, material }
    }

    pub fn unnamed(material: Material) -> Self {
        MaterialRecord { name: None, material }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Material {
    #[serde(rename = "lambertian")]
    Lambertian {
        #[serde(skip_serializing_if = "Option::is_none")]
        albedo: Option<ColorValue>,
    },
    #[serde(rename = "rough conductor")]
    RoughConductor {
        roughness: ScalarValue,
        distribution: MicrofacetDistribution,
        color: ColorValue,
    },
    #[serde(rename = "conductor")]
    Conductor { color: ColorValue },
    #[serde(rename = "blinn-phong")]
    BlinnPhong {
        exponent: f64,
        distribution: MicrofacetDistribution,
        albedo: ColorValue,
    },
    #[serde(rename = "phong")]
    Phong {
        exponent: f64,
        distribution: MicrofacetDistribution,
        albedo: ColorValue,
    },
    #[serde(rename = "metal")]
    Metal {
        roughness: ScalarValue,
        albedo: ColorValue,
    },
    #[serde(rename = "dielectric")]
    Dielectric {
        ior: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        specular_transmittance: Option<ColorValue>,
    },
    #[serde(rename = "thin dielectric")]
    ThinDielectric {
        ior: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        specular_transmittance: Option<ColorValue>,
    },
    #[serde(rename = "rough dielectric")]
    RoughDielectric {
        roughness: ScalarValue,
        distribution: MicrofacetDistribution,
        ior: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        specular_transmittance: Option<ColorValue>,
    },
    #[serde(rename = "diffuse_light")]
    DiffuseLight { emit: Color },
    #[serde(rename = "blend")]
    Blend {
        amount: ScalarValue,
        a: Box<MaterialRecord>,
        b: Box<MaterialRecord>,
    },
    #[serde(rename = "normal map")]
    NormalMap {
        normals: ColorValue,
        #[serde(skip_serializing_if = "Option::is_none")]
        strength: Option<f64>,
        nested: Box<MaterialRecord>,
    },
}

impl Material {
    /// The `type` tag written for this material.
    pub fn type_name(&self) -> &'static str {
        match self {
            Material::Lambertian { .. } => "lambertian",
            Material::RoughConductor { .. } => "rough conductor",
            Material::Conductor { .. } => "conductor",
            Material::BlinnPhong { .. } => "blinn-phong",
            Material::Phong { .. } => "phong",
            Material::Metal { .. } => "metal",
            Material::Dielectric { .. } => "dielectric",
            Material::ThinDielectric { .. } => "thin dielectric",
            Material::RoughDielectric { .. } => "rough dielectric",
            Material::DiffuseLight { .. } => "diffuse_light",
            Material::Blend { .. } => "blend",
            Material::NormalMap { .. } => "normal map",
        }
    }
}

/// Serialized 4x4 transform, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transform {
    pub matrix: [f64; 16],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "envmap")]
pub struct Envmap {
    #[serde(rename = "filename")]
    pub path: String,
    pub scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

/// Environment lighting of the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Background {
    Constant(Color),
    Envmap(Envmap),
}

/// Canonical color of a literal: scalars splat, alpha is dropped.
pub fn color(value: &Literal) -> Option<Color> {
    match *value {
        Literal::Scalar(v) => Some([v; 3]),
        Literal::Vec3(c) => Some(c),
        Literal::Vec4([r, g, b, _]) => Some([r, g, b]),
        Literal::Matrix(_) => None,
    }
}

pub fn scale_color(c: Color, factor: f64) -> Color {
    c.map(|x| x * factor)
}

pub fn transform_matrix(m: &[[f64; 4]; 4]) -> Transform {
    let mut matrix = [0.0; 16];
    for (row, values) in m.iter().enumerate() {
        matrix[row * 4..row * 4 + 4].copy_from_slice(values);
    }
    Transform { matrix }
}
