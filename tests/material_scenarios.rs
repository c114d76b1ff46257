use darts_material_export::{
    dsl::{SceneDSL, load_scene_from_str},
    exporter::{ExportContext, ExportSettings, GlossyMode, SceneExport, TextureDirectory, export_scene},
    report::CollectingReporter,
};
use serde_json::{Value, json};

struct Exported {
    doc: Value,
    reporter: CollectingReporter,
    textures: TextureDirectory,
}

fn export(scene: Value, settings: ExportSettings) -> Exported {
    let scene: SceneDSL = load_scene_from_str(&scene.to_string()).expect("load scene");
    let mut textures = TextureDirectory::new(settings.texture_dir.clone());
    let mut reporter = CollectingReporter::default();
    let out: SceneExport = {
        let mut ctx = ExportContext::new(settings, &mut textures, &mut reporter);
        export_scene(&mut ctx, &scene)
    };
    Exported {
        doc: serde_json::to_value(&out).expect("serialize export"),
        reporter,
        textures,
    }
}

/// A scene with one object using one material whose output is fed by `surface`.
fn single_material(name: &str, nodes: Vec<Value>, mut connections: Vec<Value>) -> Value {
    let mut all_nodes = nodes;
    all_nodes.push(json!({ "id": "out", "type": "ShaderNodeOutputMaterial" }));
    connections.push(link("surface", "BSDF", "out", "Surface"));
    json!({
        "version": "1.0",
        "metadata": { "name": "scenario" },
        "materials": [ { "name": name, "nodeTree": { "nodes": all_nodes, "connections": connections } } ],
        "objects": [ { "name": "Mesh", "materials": [name] } ],
        "world": null
    })
}

fn link(from: &str, out: &str, to: &str, input: &str) -> Value {
    json!({ "from": { "nodeId": from, "portId": out }, "to": { "nodeId": to, "portId": input } })
}

fn material<'a>(doc: &'a Value, name: &str) -> &'a Value {
    doc["materials"]
        .as_array()
        .expect("materials array")
        .iter()
        .find(|m| m["name"] == name)
        .unwrap_or_else(|| panic!("material {name} not exported: {doc}"))
}

fn assert_close(v: &Value, expected: f64) {
    let x = v.as_f64().unwrap_or_else(|| panic!("not a number: {v}"));
    assert!((x - expected).abs() < 1e-9, "{x} != {expected}");
}

#[test]
fn diffuse_scenario() {
    let scene = single_material(
        "Red",
        vec![json!({ "id": "surface", "type": "ShaderNodeBsdfDiffuse",
                     "inputs": { "Color": [0.8, 0.2, 0.2, 1.0], "Roughness": 0.0 } })],
        vec![],
    );
    let out = export(scene, ExportSettings::default());
    assert_eq!(
        material(&out.doc, "Red"),
        &json!({ "name": "Red", "type": "lambertian", "albedo": [0.8, 0.2, 0.2] })
    );
    assert!(out.reporter.warnings().is_empty());
}

#[test]
fn rough_conductor_scenario() {
    let scene = single_material(
        "Gold",
        vec![json!({ "id": "surface", "type": "ShaderNodeBsdfGlossy",
                     "inputs": { "Color": [1.0, 0.8, 0.3, 1.0], "Roughness": 0.3 },
                     "params": { "distribution": "GGX" } })],
        vec![],
    );
    let out = export(scene, ExportSettings::default());
    let gold = material(&out.doc, "Gold");
    assert_eq!(gold["type"], "rough conductor");
    assert_close(&gold["roughness"], 0.09);
    assert_eq!(gold["distribution"], "ggx");
    assert_eq!(gold["color"], json!([1.0, 0.8, 0.3]));
}

#[test]
fn glass_scenario_with_host_defaults() {
    let scene = single_material(
        "Window",
        vec![json!({ "id": "surface", "type": "ShaderNodeBsdfGlass",
                     "inputs": { "IOR": 1.0, "Roughness": 0.0 } })],
        vec![],
    );
    let out = export(scene, ExportSettings::default());
    // The host's default glass color is white.
    assert_eq!(
        material(&out.doc, "Window"),
        &json!({ "name": "Window", "type": "thin dielectric", "ior": 1.0,
                 "specular_transmittance": [1.0, 1.0, 1.0] })
    );
}

#[test]
fn normal_mapped_diffuse_scenario() {
    let scene = single_material(
        "Old Wood",
        vec![
            json!({ "id": "albedo", "type": "ShaderNodeTexImage",
                    "image": { "name": "wood", "filepath": "//textures/wood.jpg", "colorspace": "sRGB" } }),
            json!({ "id": "normals", "type": "ShaderNodeTexImage",
                    "image": { "name": "wood_n", "filepath": "//textures/wood_n.png", "colorspace": "Non-Color" } }),
            json!({ "id": "nm", "type": "ShaderNodeNormalMap", "inputs": { "Strength": 0.7 } }),
            json!({ "id": "surface", "type": "ShaderNodeBsdfDiffuse" }),
        ],
        vec![
            link("albedo", "Color", "surface", "Color"),
            link("normals", "Color", "nm", "Color"),
            link("nm", "Normal", "surface", "Normal"),
        ],
    );
    let out = export(scene, ExportSettings::default());
    assert_eq!(
        material(&out.doc, "Old_Wood"),
        &json!({
            "name": "Old_Wood",
            "type": "normal map",
            "normals": { "type": "image", "filename": "textures/wood_n.png", "raw": true },
            "strength": 0.7,
            "nested": {
                "type": "lambertian",
                "albedo": { "type": "image", "filename": "textures/wood.jpg" }
            }
        })
    );
    let copies: Vec<_> = out.textures.copies().iter().map(|c| c.destination.as_str()).collect();
    assert_eq!(copies, vec!["textures/wood.jpg", "textures/wood_n.png"]);
}

#[test]
fn blend_of_textured_and_fresnel() {
    let scene = single_material(
        "Varnish",
        vec![
            json!({ "id": "base", "type": "ShaderNodeBsdfDiffuse", "inputs": { "Color": [0.3, 0.2, 0.1, 1.0] } }),
            json!({ "id": "coat", "type": "ShaderNodeBsdfGlossy", "inputs": { "Roughness": 0.1 } }),
            json!({ "id": "fresnel", "type": "ShaderNodeFresnel", "inputs": { "IOR": 1.5 } }),
            json!({ "id": "surface", "type": "ShaderNodeMixShader" }),
        ],
        vec![
            link("fresnel", "Fac", "surface", "Fac"),
            link("base", "BSDF", "surface", "Shader"),
            link("coat", "BSDF", "surface", "Shader_001"),
        ],
    );
    let out = export(scene, ExportSettings::default());
    let varnish = material(&out.doc, "Varnish");
    assert_eq!(varnish["type"], "blend");
    assert_eq!(varnish["amount"], json!({ "type": "fresnel", "ior": 1.5 }));
    assert_eq!(varnish["a"]["type"], "lambertian");
    assert!(varnish["a"].get("name").is_none());
    assert_eq!(varnish["b"]["type"], "rough conductor");
    assert_close(&varnish["b"]["roughness"], 0.01);
}

#[test]
fn glossy_mode_comes_from_snapshot_settings() {
    let mut scene = single_material(
        "Chrome",
        vec![json!({ "id": "surface", "type": "ShaderNodeBsdfGlossy",
                     "inputs": { "Roughness": 0.5 }, "params": { "distribution": "BECKMANN" } })],
        vec![],
    );
    scene["settings"] = json!({ "glossyMode": "blinn-phong" });
    let loaded = load_scene_from_str(&scene.to_string()).unwrap();
    let settings = loaded.settings.clone().unwrap_or_default();
    assert_eq!(settings.glossy_mode, GlossyMode::BlinnPhong);

    let out = export(scene, settings);
    let chrome = material(&out.doc, "Chrome");
    assert_eq!(chrome["type"], "blinn-phong");
    assert_close(&chrome["exponent"], 31.0);
    assert_eq!(chrome["distribution"], "beckmann");
    assert_eq!(chrome["albedo"], json!([0.8, 0.8, 0.8]));
}

#[test]
fn same_material_on_many_objects_is_exported_once() {
    let mut scene = single_material(
        "Shared",
        vec![json!({ "id": "surface", "type": "ShaderNodeBsdfDiffuse" })],
        vec![],
    );
    scene["objects"] = json!([
        { "name": "A", "materials": ["Shared"] },
        { "name": "B", "materials": ["Shared"] },
        { "name": "C", "materials": ["Shared", "Shared"] }
    ]);
    let out = export(scene, ExportSettings::default());
    let names: Vec<_> = out.doc["materials"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["default", "Shared"]);
}

#[test]
fn unsupported_material_does_not_abort_the_export() {
    let mut scene = single_material(
        "Fancy",
        vec![json!({ "id": "surface", "type": "ShaderNodeBsdfPrincipled" })],
        vec![],
    );
    scene["materials"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "name": "Plain", "useNodes": false, "diffuseColor": [0.4, 0.4, 0.4, 1.0] }));
    scene["objects"][0]["materials"] = json!(["Fancy", "Plain"]);

    let out = export(scene, ExportSettings::default());
    assert_eq!(material(&out.doc, "Fancy")["albedo"], json!([1.0, 0.0, 0.3]));
    assert_eq!(material(&out.doc, "Plain")["albedo"], json!([0.4, 0.4, 0.4]));
    assert_eq!(out.reporter.warnings().len(), 1);
    assert!(out.reporter.infos().contains(&"Writing material: Plain"));
}

#[test]
fn output_document_shape() {
    let scene = json!({
        "materials": [],
        "objects": [],
        "world": { "useNodes": false, "color": [0.05, 0.05, 0.05] }
    });
    let out = export(scene, ExportSettings::default());
    assert_eq!(
        out.doc,
        json!({
            "background": [0.05, 0.05, 0.05],
            "materials": [ { "name": "default", "type": "lambertian", "albedo": [0.2, 0.2, 0.2] } ]
        })
    );
}
