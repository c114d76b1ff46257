use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use darts_material_export::{
    dsl,
    exporter::{self, ExportContext, ExportSettings, GlossyMode, MaterialMode, TextureDirectory},
    report::LogReporter,
};

#[derive(Debug, Default, Clone)]
struct Cli {
    scene_json: Option<PathBuf>,
    output: Option<PathBuf>,
    material_mode: Option<MaterialMode>,
    glossy_mode: Option<GlossyMode>,
    texture_dir: Option<String>,
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--scene-json" => {
                cli.scene_json = Some(PathBuf::from(flag_value(args, i, "--scene-json")?));
            }
            "--output" | "-o" => {
                cli.output = Some(PathBuf::from(flag_value(args, i, "--output")?));
            }
            "--material-mode" => {
                cli.material_mode = Some(flag_value(args, i, "--material-mode")?.parse()?);
            }
            "--glossy-mode" => {
                cli.glossy_mode = Some(flag_value(args, i, "--glossy-mode")?.parse()?);
            }
            "--texture-dir" => {
                cli.texture_dir = Some(flag_value(args, i, "--texture-dir")?.to_string());
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: --scene-json <scene.json>, --output <file>, \
                     --material-mode <convert|flatten>, --glossy-mode <rough-conductor|blinn-phong|phong|metal>, \
                     --texture-dir <dir>)"
                ));
            }
        }
        i += 2;
    }
    Ok(cli)
}

/// Defaults, then the snapshot's own settings, then command-line flags.
fn resolve_settings(cli: &Cli, scene: &dsl::SceneDSL) -> ExportSettings {
    let mut settings = scene.settings.clone().unwrap_or_default();
    if let Some(mode) = cli.material_mode {
        settings.material_mode = mode;
    }
    if let Some(mode) = cli.glossy_mode {
        settings.glossy_mode = mode;
    }
    if let Some(dir) = &cli.texture_dir {
        settings.texture_dir = dir.clone();
    }
    settings
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&argv)?;
    let scene_path = cli
        .scene_json
        .as_deref()
        .ok_or_else(|| anyhow!("--scene-json <scene.json> is required"))?;

    let scene = dsl::load_scene_from_path(scene_path)?;
    let settings = resolve_settings(&cli, &scene);
    log::debug!("export settings: {settings:?}");

    let mut textures = TextureDirectory::new(settings.texture_dir.clone());
    let mut reporter = LogReporter;
    let export = {
        let mut ctx = ExportContext::new(settings, &mut textures, &mut reporter);
        exporter::export_scene(&mut ctx, &scene)
    };

    for copy in textures.copies() {
        log::info!("texture: {} -> {}", copy.source, copy.destination);
    }

    let text = serde_json::to_string_pretty(&export).context("failed to serialize export")?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {} materials to {}", export.materials.len(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
