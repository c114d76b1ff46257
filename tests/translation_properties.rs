use darts_material_export::{
    dsl::NodeTreeDSL,
    exporter::{
        ExportContext, ExportSettings, GlossyMode, Material, MaterialRecord, TextureDirectory,
        resolver::resolve_scalar,
        surface::translate,
        types::{ColorValue, ScalarValue},
    },
    graph::ShaderGraph,
    report::CollectingReporter,
};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use serde_json::{Value, json};

fn graph(tree: Value) -> ShaderGraph {
    let tree: NodeTreeDSL = serde_json::from_value(tree).unwrap();
    ShaderGraph::from_tree(&tree).unwrap()
}

fn translate_node(
    graph: &ShaderGraph,
    id: &str,
    settings: ExportSettings,
) -> (MaterialRecord, CollectingReporter) {
    let mut textures = TextureDirectory::new("textures");
    let mut reporter = CollectingReporter::default();
    let record = {
        let mut ctx = ExportContext::new(settings, &mut textures, &mut reporter);
        translate(&mut ctx, graph, graph.node_by_id(id).unwrap(), None).unwrap()
    };
    (record, reporter)
}

fn glossy_modes() -> impl Strategy<Value = GlossyMode> {
    prop_oneof![
        Just(GlossyMode::RoughConductor),
        Just(GlossyMode::BlinnPhong),
        Just(GlossyMode::Phong),
        Just(GlossyMode::Metal),
    ]
}

proptest! {
    #[test]
    fn roughness_is_squared_exactly_once(r in 0.0f64..=1.0) {
        let g = graph(json!({ "nodes": [
            { "id": "g", "type": "ShaderNodeBsdfGlossy", "inputs": { "Roughness": r, "Color": 0.5 } }
        ] }));
        let socket = g.node_by_id("g").unwrap().input("Roughness").unwrap();

        let mut textures = TextureDirectory::new("textures");
        let mut reporter = CollectingReporter::default();
        let mut ctx = ExportContext::new(ExportSettings::default(), &mut textures, &mut reporter);
        let first = resolve_scalar(&mut ctx, &g, socket).unwrap();
        let second = resolve_scalar(&mut ctx, &g, socket).unwrap();
        prop_assert_eq!(&first, &ScalarValue::Constant(r * r));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn sharp_glossy_never_has_distribution(mode in glossy_modes(), r in 0.0f64..=1.0) {
        let g = graph(json!({ "nodes": [
            { "id": "g", "type": "ShaderNodeBsdfGlossy",
              "inputs": { "Roughness": r, "Color": [0.9, 0.9, 0.9, 1.0] },
              "params": { "distribution": "SHARP" } }
        ] }));
        let settings = ExportSettings { glossy_mode: mode, ..ExportSettings::default() };
        let (record, _) = translate_node(&g, "g", settings);
        let v = serde_json::to_value(&record).unwrap();
        prop_assert!(v.get("distribution").is_none());
        prop_assert!(v.get("exponent").is_none());
        if let Some(roughness) = v.get("roughness") {
            prop_assert_eq!(roughness.as_f64(), Some(0.0));
        }
    }

    #[test]
    fn rough_diffuse_warns_once_without_roughness(r in 0.001f64..=1.0) {
        let g = graph(json!({ "nodes": [
            { "id": "d", "type": "ShaderNodeBsdfDiffuse",
              "inputs": { "Roughness": r, "Color": [0.5, 0.5, 0.5, 1.0] } }
        ] }));
        let (record, reporter) = translate_node(&g, "d", ExportSettings::default());
        prop_assert_eq!(reporter.warnings().len(), 1);
        let v = serde_json::to_value(&record).unwrap();
        prop_assert!(v.get("roughness").is_none());
    }

    #[test]
    fn literal_blend_amount_stays_in_unit_range(fac in 0.0f64..=1.0) {
        let g = graph(json!({
            "nodes": [
                { "id": "a", "type": "ShaderNodeBsdfDiffuse", "inputs": { "Color": [1.0, 1.0, 1.0, 1.0] } },
                { "id": "b", "type": "ShaderNodeEmission", "inputs": { "Color": [1.0, 1.0, 1.0, 1.0], "Strength": 2.0 } },
                { "id": "mix", "type": "ShaderNodeMixShader", "inputs": { "Fac": fac } }
            ],
            "connections": [
                { "from": { "nodeId": "a", "portId": "BSDF" }, "to": { "nodeId": "mix", "portId": "Shader" } },
                { "from": { "nodeId": "b", "portId": "Emission" }, "to": { "nodeId": "mix", "portId": "Shader_001" } }
            ]
        }));
        let (record, _) = translate_node(&g, "mix", ExportSettings::default());
        let Material::Blend { amount, a, b } = record.material else {
            return Err(TestCaseError::fail("expected a blend"));
        };
        prop_assert_eq!(amount, ScalarValue::Constant(fac));
        prop_assert!((0.0..=1.0).contains(&fac));
        prop_assert_eq!(a.material.type_name(), "lambertian");
        prop_assert_eq!(b.material.type_name(), "diffuse_light");
    }

    #[test]
    fn zero_emission_is_black_lambertian(
        color in prop::array::uniform3(0.0f64..10.0),
        zero_strength in any::<bool>(),
    ) {
        let (color, strength) = if zero_strength { (color, 0.0) } else { ([0.0; 3], 5.0) };
        let g = graph(json!({ "nodes": [
            { "id": "e", "type": "ShaderNodeEmission",
              "inputs": { "Color": [color[0], color[1], color[2], 1.0], "Strength": strength } }
        ] }));
        let (record, reporter) = translate_node(&g, "e", ExportSettings::default());
        prop_assert_eq!(
            record.material,
            Material::Lambertian { albedo: Some(ColorValue::Constant([0.0; 3])) }
        );
        prop_assert_eq!(reporter.warnings().len(), 1);
    }
}
