//! Shading-graph to renderer-material translation.
//!
//! [`driver`] walks the scene's materials, [`surface`] dispatches on the BSDF
//! node feeding each material output, and [`background`] handles the world.
//! Everything below those entry points returns [`ExportError`], which the
//! entry points turn into warnings plus a placeholder.

pub mod background;
pub mod context;
pub mod driver;
pub mod error;
pub mod normal_map;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod surface;
pub mod texture;
pub mod types;

pub use background::translate_background;
pub use context::{ExportContext, TextureDirectory, TextureExporter};
pub use driver::{SceneExport, convert_material, export_materials, export_scene};
pub use error::{ExportError, ExportResult};
pub use settings::{ExportSettings, GlossyMode, MaterialMode};
pub use types::{Background, Material, MaterialRecord};
