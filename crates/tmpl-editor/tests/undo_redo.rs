//! Integration tests: snapshot history driven through the editor session.
//!
//! Every mutation entry point (add, delete, paste, drag, nudge, align,
//! property edit, z-order) must land as exactly one undoable step, and
//! undo followed by redo must reproduce the serialized scene exactly.

use pretty_assertions::assert_eq;
use tmpl_core::factory;
use tmpl_core::id::ObjectId;
use tmpl_core::model::DocumentType;
use tmpl_core::serialize::{deserialize_scene, serialize_scene};
use tmpl_core::template::Template;
use tmpl_editor::{
    AlignEdge, Direction, EditorConfig, EditorSession, InputEvent, PlatformProfile, PropertyEdit,
};

fn letterhead() -> EditorSession {
    let report = deserialize_scene(include_str!("fixtures/letterhead.json")).unwrap();
    assert!(report.skipped.is_empty());
    let template = Template {
        scene: report.scene,
        ..Template::blank("Letterhead", DocumentType::Invoice)
    };
    let mut session = EditorSession::new(EditorConfig::default(), PlatformProfile::Other);
    session.load_template(template).unwrap();
    session
}

fn json(session: &EditorSession) -> String {
    serialize_scene(session.scene()).unwrap()
}

/// Apply `mutate`, then check it undoes to the prior state and redoes to
/// the mutated one, byte for byte.
fn assert_inverse_law(session: &mut EditorSession, mutate: impl FnOnce(&mut EditorSession)) {
    let before = json(session);
    let depth = session.history().index();
    mutate(session);
    let after = json(session);
    assert_ne!(before, after, "mutation changed nothing");
    assert_eq!(session.history().index(), depth + 1, "expected exactly one snapshot");

    assert!(session.undo().unwrap());
    assert_eq!(json(session), before);
    assert!(session.redo().unwrap());
    assert_eq!(json(session), after);
}

// ─── Inverse law per entry point ────────────────────────────────────────

#[test]
fn add_is_one_step() {
    let mut s = letterhead();
    assert_inverse_law(&mut s, |s| {
        s.add_object(factory::circle(300.0, 300.0)).unwrap();
    });
}

#[test]
fn measured_text_survives_undo_redo() {
    let mut s = letterhead();
    assert_inverse_law(&mut s, |s| {
        s.add_object(factory::body_text("Valid until", 360.0, 130.0)).unwrap();
    });
}

#[test]
fn table_is_one_step() {
    let mut s = letterhead();
    assert_inverse_law(&mut s, |s| {
        s.add_line_items_table(40.0, 300.0).unwrap();
    });
}

#[test]
fn delete_is_one_step() {
    let mut s = letterhead();
    s.set_active_object(Some(ObjectId::intern("title"))).unwrap();
    assert_inverse_law(&mut s, |s| {
        assert_eq!(s.delete_selected().unwrap(), 1);
    });
}

#[test]
fn paste_is_one_step() {
    let mut s = letterhead();
    s.set_active_object(Some(ObjectId::intern("customer"))).unwrap();
    s.copy().unwrap();
    assert_inverse_law(&mut s, |s| {
        assert_eq!(s.paste().unwrap().len(), 1);
    });
}

#[test]
fn nudge_is_one_step() {
    let mut s = letterhead();
    s.set_active_object(Some(ObjectId::intern("rule"))).unwrap();
    assert_inverse_law(&mut s, |s| {
        assert!(s.nudge(Direction::Down, false).unwrap());
    });
}

#[test]
fn property_edit_is_one_step() {
    let mut s = letterhead();
    assert_inverse_law(&mut s, |s| {
        s.apply_property(ObjectId::intern("title"), PropertyEdit::FontSize(40.0))
            .unwrap();
    });
}

#[test]
fn z_order_is_one_step() {
    let mut s = letterhead();
    s.set_active_object(Some(ObjectId::intern("rule"))).unwrap();
    assert_inverse_law(&mut s, |s| {
        assert!(s.send_to_back().unwrap());
    });
}

// ─── Gestures ───────────────────────────────────────────────────────────

#[test]
fn drag_records_once_on_release() {
    let mut s = letterhead();
    let title = ObjectId::intern("title");
    let depth = s.history().len();

    s.handle_pointer(&InputEvent::down(400.0, 50.0)).unwrap();
    for step in 1..=10 {
        let x = 400.0 + step as f64 * 5.0;
        assert!(!s.handle_pointer(&InputEvent::moved(x, 60.0)).unwrap());
        assert_eq!(s.history().len(), depth, "no snapshot mid-drag");
    }
    assert!(s.handle_pointer(&InputEvent::up(450.0, 60.0)).unwrap());
    assert_eq!(s.history().len(), depth + 1);

    let g = s.scene().get(title).unwrap().geometry;
    assert_eq!((g.left, g.top), (430.0, 50.0));

    s.undo().unwrap();
    let g = s.scene().get(title).unwrap().geometry;
    assert_eq!((g.left, g.top), (380.0, 40.0));
}

#[test]
fn click_without_move_records_nothing() {
    let mut s = letterhead();
    let depth = s.history().len();
    s.handle_pointer(&InputEvent::down(400.0, 50.0)).unwrap();
    assert!(!s.handle_pointer(&InputEvent::up(400.0, 50.0)).unwrap());
    assert_eq!(s.history().len(), depth);
    assert_eq!(s.selection().active_object(), Some(ObjectId::intern("title")));
}

#[test]
fn locked_logo_cannot_be_dragged() {
    let mut s = letterhead();
    let before = json(&s);
    s.handle_pointer(&InputEvent::down(60.0, 60.0)).unwrap();
    s.handle_pointer(&InputEvent::moved(200.0, 200.0)).unwrap();
    assert!(!s.handle_pointer(&InputEvent::up(200.0, 200.0)).unwrap());
    assert_eq!(json(&s), before);
}

// ─── Alignment batching ─────────────────────────────────────────────────

#[test]
fn align_is_one_snapshot() {
    let mut s = letterhead();
    s.execute(tmpl_editor::EditorCommand::SelectAll).unwrap();
    // logo is locked, so three members
    assert_eq!(s.selection().len(), 3);
    let depth = s.history().len();

    let moved = s.align(AlignEdge::Left).unwrap();
    assert_eq!(moved, 1);
    assert_eq!(s.history().len(), depth + 1);
    assert!(!s.history().is_batching());

    s.undo().unwrap();
    assert_eq!(s.scene().get(ObjectId::intern("title")).unwrap().geometry.left, 380.0);
}

#[test]
fn align_that_moves_nothing_records_nothing() {
    let mut s = letterhead();
    s.set_active_object(Some(ObjectId::intern("logo"))).unwrap();
    let depth = s.history().len();
    assert_eq!(s.align(AlignEdge::Center).unwrap(), 0);
    assert_eq!(s.history().len(), depth);
}

// ─── Bounds ─────────────────────────────────────────────────────────────

#[test]
fn undo_stops_at_load() {
    let mut s = letterhead();
    let loaded = json(&s);
    for i in 0..3 {
        s.add_object(factory::rectangle(10.0 * i as f64, 500.0)).unwrap();
    }
    while s.undo().unwrap() {}
    assert_eq!(json(&s), loaded);
    assert!(!s.can_undo());
    assert!(s.can_redo());
}

#[test]
fn depth_is_bounded_by_config() {
    let config = EditorConfig {
        history_depth: 4,
        ..EditorConfig::default()
    };
    let mut s = EditorSession::new(config, PlatformProfile::Other);
    s.load_template(Template::blank("Bounded", DocumentType::Quote))
        .unwrap();
    for i in 0..10 {
        s.add_object(factory::rectangle(i as f64, 0.0)).unwrap();
    }
    assert_eq!(s.history().len(), 4);
    let mut undone = 0;
    while s.undo().unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    assert_eq!(s.scene().len(), 7);
}

#[test]
fn new_edit_after_undo_drops_redo() {
    let mut s = letterhead();
    s.add_object(factory::rectangle(0.0, 500.0)).unwrap();
    s.undo().unwrap();
    assert!(s.can_redo());
    s.add_object(factory::circle(0.0, 600.0)).unwrap();
    assert!(!s.can_redo());
}
