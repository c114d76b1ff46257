//! Resolution context threaded through every translator.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::registry::MaterialRegistry;
use super::settings::ExportSettings;
use crate::graph::ImageRef;
use crate::report::{Reporter, Severity};

/// Locates (and schedules the copy of) image files for the renderer.
pub trait TextureExporter {
    /// Stable path of `image` relative to the exported scene.
    /// Calling it again for the same image returns the same path.
    fn export_texture(&mut self, image: &ImageRef) -> String;
}

/// A copy the host still has to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureCopy {
    pub source: String,
    pub destination: String,
}

/// Places every image in one flat directory next to the scene.
#[derive(Debug, Default)]
pub struct TextureDirectory {
    dir: String,
    exported: HashMap<ImageRef, String>,
    taken: HashSet<String>,
    copies: Vec<TextureCopy>,
}

impl TextureDirectory {
    pub fn new(dir: impl Into<String>) -> Self {
        TextureDirectory {
            dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn copies(&self) -> &[TextureCopy] {
        &self.copies
    }

    fn file_name(image: &ImageRef) -> String {
        // Host paths may be blend-relative ("//textures/wood.png").
        let path = image.filepath.trim_start_matches("//");
        Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.png", image.name))
    }

    fn join(&self, file: &str) -> String {
        if self.dir.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.dir.trim_end_matches('/'), file)
        }
    }
}

impl TextureExporter for TextureDirectory {
    fn export_texture(&mut self, image: &ImageRef) -> String {
        if let Some(path) = self.exported.get(image) {
            return path.clone();
        }

        let file = Self::file_name(image);
        let mut destination = self.join(&file);
        let mut n = 1;
        while self.taken.contains(&destination) {
            destination = self.join(&format!("{n}_{file}"));
            n += 1;
        }

        self.taken.insert(destination.clone());
        self.exported.insert(image.clone(), destination.clone());
        self.copies.push(TextureCopy {
            source: image.filepath.clone(),
            destination: destination.clone(),
        });
        destination
    }
}

pub struct ExportContext<'a> {
    pub settings: ExportSettings,
    pub registry: MaterialRegistry,
    textures: &'a mut dyn TextureExporter,
    reporter: &'a mut dyn Reporter,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        settings: ExportSettings,
        textures: &'a mut dyn TextureExporter,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        ExportContext {
            settings,
            registry: MaterialRegistry::new(),
            textures,
            reporter,
        }
    }

    pub fn export_texture(&mut self, image: &ImageRef) -> String {
        self.textures.export_texture(image)
    }

    pub fn report(&mut self, severity: Severity, message: &str) {
        self.reporter.report(severity, message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.report(Severity::Warning, message.as_ref());
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.report(Severity::Info, message.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, filepath: &str) -> ImageRef {
        ImageRef {
            name: name.to_string(),
            filepath: filepath.to_string(),
            colorspace: "sRGB".to_string(),
        }
    }

    #[test]
    fn same_image_gets_same_path() {
        let mut dir = TextureDirectory::new("textures");
        let wood = image("wood.png", "//tex/wood.png");
        assert_eq!(dir.export_texture(&wood), "textures/wood.png");
        assert_eq!(dir.export_texture(&wood), "textures/wood.png");
        assert_eq!(dir.copies().len(), 1);
        assert_eq!(dir.copies()[0].source, "//tex/wood.png");
    }

    #[test]
    fn file_name_clash_is_disambiguated() {
        let mut dir = TextureDirectory::new("textures/");
        let a = image("a", "/one/albedo.png");
        let b = image("b", "/two/albedo.png");
        assert_eq!(dir.export_texture(&a), "textures/albedo.png");
        assert_eq!(dir.export_texture(&b), "textures/1_albedo.png");
    }

    #[test]
    fn packed_image_uses_its_name() {
        let mut dir = TextureDirectory::new("");
        assert_eq!(dir.export_texture(&image("Packed", "")), "Packed.png");
    }
}
