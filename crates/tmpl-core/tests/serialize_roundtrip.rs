//! Integration tests: build → serialize → deserialize against the JSON
//! contract consumed by the downstream renderer.

use pretty_assertions::assert_eq;
use tmpl_core::factory;
use tmpl_core::id::ObjectId;
use tmpl_core::model::{DocumentType, ObjectKind};
use tmpl_core::scene::SceneGraph;
use tmpl_core::serialize::{deserialize_scene, serialize_scene};
use tmpl_core::starter::starter_scene;

fn reload(scene: &SceneGraph) -> SceneGraph {
    let json = serialize_scene(scene).unwrap();
    let report = deserialize_scene(&json).unwrap();
    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    report.scene
}

// ─── Round trip ──────────────────────────────────────────────────────────

#[test]
fn starters_roundtrip_to_identical_json() {
    for t in DocumentType::ALL {
        let scene = starter_scene(t);
        let first = serialize_scene(&scene).unwrap();
        let second = serialize_scene(&reload(&scene)).unwrap();
        assert_eq!(first, second, "{t} changed across a round trip");
    }
}

#[test]
fn floats_reload_to_the_same_bits() {
    let mut scene = SceneGraph::new();
    let mut rect = factory::rectangle(0.0, 0.0);
    rect.geometry.width = 92.39999999999999;
    rect.geometry.top = 0.1 + 0.2;
    scene.add(rect);
    scene.add(factory::body_text("Valid until", 360.0, 130.0));

    let json = serialize_scene(&scene).unwrap();
    assert!(json.contains("92.39999999999999"));
    assert_eq!(serialize_scene(&reload(&scene)).unwrap(), json);
}

#[test]
fn roundtrip_preserves_z_order_and_attributes() {
    let mut scene = SceneGraph::new();
    let mut rect = factory::rectangle(100.0, 120.0);
    rect.geometry.angle = 15.0;
    rect.geometry.scale_x = 1.5;
    rect.style.opacity = 0.4;
    rect.locked = true;
    scene.add(rect);
    scene.add(factory::circle(200.0, 200.0));
    scene.add(factory::line(40.0, 400.0));

    let back = reload(&scene);
    assert_eq!(back, scene);
}

// ─── Scenario A: heading plus data field ─────────────────────────────────

#[test]
fn heading_and_data_field_survive_reload() {
    let mut scene = SceneGraph::new();
    scene.add(factory::heading("Heading", 50.0, 50.0));
    scene.add(factory::data_field("customer.name", 50.0, 120.0));

    let back = reload(&scene);
    assert_eq!(back.len(), 2);
    let field = &back.objects()[1];
    assert_eq!(field.field_name(), Some("customer.name"));
    assert_eq!(field.text(), Some("{{customer.name}}"));
    assert_eq!(back.objects()[0].text(), Some("Heading"));
}

// ─── Scenario D: line-items table ────────────────────────────────────────

#[test]
fn table_json_carries_every_row_token() {
    let mut scene = SceneGraph::new();
    scene.add(factory::line_items_table(5, 40.0, 300.0));
    let json = serialize_scene(&scene).unwrap();

    for row in 0..5 {
        for column in ["description", "quantity", "unit_price", "line_total"] {
            let token = format!("{{{{line_items[{row}].{column}}}}}");
            assert_eq!(json.matches(&token).count(), 1, "{token}");
        }
    }
    assert!(!json.contains("line_items[5]"));
}

// ─── Scenario E: attributes from a newer editor ──────────────────────────

#[test]
fn unknown_attributes_are_dropped() {
    let json = include_str!("fixtures/future_attributes.json");
    let report = deserialize_scene(json).unwrap();
    assert!(report.skipped.is_empty());
    assert_eq!(report.scene.len(), 4);

    let field = report.scene.get(ObjectId::intern("customer")).unwrap();
    assert_eq!(field.field_name(), Some("customer.name"));
    assert_eq!(field.style.stroke_dash_array, Some(vec![4.0, 2.0]));

    let emitted = serialize_scene(&report.scene).unwrap();
    assert!(!emitted.contains("conditionalVisibility"));
    assert!(!emitted.contains("shadow"));

    let title = report.scene.get(ObjectId::intern("title")).unwrap();
    assert!(title.style.font_weight.is_bold());
    let divider = report.scene.get(ObjectId::intern("divider")).unwrap();
    assert_eq!(divider.kind, ObjectKind::Line);
    assert_eq!(divider.style.fill, None);
    assert!(report.scene.get(ObjectId::intern("logo")).unwrap().locked);
}

#[test]
fn duplicate_ids_are_rekeyed_on_load() {
    let json = r#"{"objects": [
        {"id": "box", "type": "rectangle", "left": 1},
        {"id": "box", "type": "rectangle", "left": 2}
    ]}"#;
    let scene = deserialize_scene(json).unwrap().scene;
    assert_eq!(scene.len(), 2);
    let ids = scene.ids();
    assert_ne!(ids[0], ids[1]);
    assert_eq!(scene.objects()[1].geometry.left, 2.0);
}
