//! Snapshot save/restore round trips through the engine.

use dockyard_layout::snapshot::NodeRecord;
use dockyard_layout::{
    DockEdge, DockError, DockLocation, DockManager, DockTarget, InsertOptions, LayoutSnapshot,
    PanelTypeOptions, Rect, SNAPSHOT_SCHEMA_VERSION, TabOrientation,
};
use serde_json::json;

fn engine() -> DockManager {
    let mut engine = DockManager::default();
    for name in ["editor", "console", "files", "search", "outline", "dialog"] {
        engine
            .register(name, PanelTypeOptions::default(), move |init| {
                init.title = name.to_uppercase();
            })
            .expect("register");
    }
    engine.set_area(Rect::from_size(1280.0, 800.0));
    engine
}

fn busy_layout() -> DockManager {
    let mut engine = engine();
    let editor = engine
        .add_panel("editor", DockLocation::Left, None, InsertOptions::default())
        .expect("editor");
    let console = engine
        .add_panel(
            "console",
            DockLocation::Bottom,
            Some(DockTarget::Panel(editor)),
            InsertOptions {
                fraction: Some(0.65),
                ..InsertOptions::default()
            },
        )
        .expect("console");
    engine
        .add_panel(
            "search",
            DockLocation::Stacked,
            Some(DockTarget::Panel(console)),
            InsertOptions {
                activate: true,
                ..InsertOptions::default()
            },
        )
        .expect("search");
    engine
        .add_panel(
            "outline",
            DockLocation::Float,
            None,
            InsertOptions {
                rect: Some(Rect::new(100.0, 80.0, 260.0, 300.0)),
                ..InsertOptions::default()
            },
        )
        .expect("outline");
    engine
        .add_panel("dialog", DockLocation::Modal, None, InsertOptions::default())
        .expect("dialog");

    let files = engine
        .add_panel("files", DockLocation::Right, Some(DockTarget::Panel(editor)), InsertOptions::default())
        .expect("files");
    engine.collapse_panel(files, DockEdge::Right).expect("right drawer");
    engine.expand(DockEdge::Right, None).expect("expand");
    engine.solve_now();

    let panel = engine.panel_mut(editor).expect("editor");
    panel.payload = json!({ "path": "src/main.rs", "line": 42 });
    panel.title = "main.rs".into();
    engine
}

#[test]
fn restore_reproduces_the_snapshot() {
    let source = busy_layout();
    let snapshot = source.save();
    assert_eq!(snapshot.schema_version, SNAPSHOT_SCHEMA_VERSION);
    assert_eq!(snapshot.floating.len(), 2);
    assert!(snapshot.floating[1].modal);
    assert_eq!(snapshot.collapsers.len(), 1);
    assert!(snapshot.collapsers[0].expanded);
    assert_eq!(
        snapshot.collapsers[0].frame.tab_orientation,
        TabOrientation::Right
    );

    let mut target = engine();
    let report = target.restore(&snapshot).expect("restore");
    assert_eq!(report.panels, snapshot.panel_count());
    assert!(report.skipped.is_empty());
    assert_eq!(target.save(), snapshot);
    assert!(target.tree().validate().is_ok());
}

#[test]
fn json_round_trip_preserves_stacks_and_active_tabs() {
    let source = busy_layout();
    let json = source.save_json().expect("json");
    let mut target = engine();
    target.restore_json(&json).expect("restore");

    let Some(NodeRecord::Splitter { second, .. }) = target.save().root else {
        panic!("expected a split root");
    };
    let NodeRecord::Frame(bottom) = *second else {
        panic!("expected the console stack below the editor");
    };
    let types: Vec<&str> = bottom.panels.iter().map(|p| p.panel_type.as_str()).collect();
    assert_eq!(types, vec!["console", "search"]);
    assert_eq!(bottom.active, Some(1));
    assert_eq!(bottom.panels[0].title, "CONSOLE");

    let panels = target.tree().panels();
    let editor = panels
        .into_iter()
        .find(|p| p.panel_type() == "editor")
        .expect("editor restored");
    assert_eq!(editor.title, "main.rs");
    assert_eq!(editor.payload["line"], 42);
}

#[test]
fn restoring_twice_is_idempotent() {
    let snapshot = busy_layout().save();
    let mut target = engine();
    target.restore(&snapshot).expect("first");
    let once = target.save();
    target.restore(&once).expect("second");
    assert_eq!(target.save(), once);
}

#[test]
fn unknown_schema_is_rejected() {
    let mut target = busy_layout();
    let before = target.save();
    let json = r#"{"schema_version": 7, "root": null}"#;
    assert_eq!(
        target.restore_json(json).map(|_| ()),
        Err(DockError::UnsupportedSchema(7))
    );
    assert_eq!(target.save(), before);
}

#[test]
fn malformed_json_is_an_encoding_error() {
    let mut target = engine();
    assert!(matches!(
        target.restore_json("{\"root\": {\"type\": \"mystery\"}}"),
        Err(DockError::Encoding(_))
    ));
    assert!(LayoutSnapshot::from_json("42").is_err());
}
