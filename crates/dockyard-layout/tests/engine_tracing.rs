//! Structured log coverage for the engine's tracing targets.

use std::sync::{Arc, Mutex};

use dockyard_core::event::{InputEvent, PointerButton, PointerEvent, PointerEventKind};
use dockyard_layout::snapshot::NodeRecord;
use dockyard_layout::{DockLocation, DockManager, DockTarget, InsertOptions, PanelTypeOptions, Point, Rect};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Captured {
    target: String,
    level: Level,
    message: String,
}

#[derive(Default)]
struct CaptureState {
    events: Vec<Captured>,
}

struct EventCapture {
    state: Arc<Mutex<CaptureState>>,
}

impl<S> Layer<S> for EventCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        #[derive(Default)]
        struct MessageVisitor {
            message: String,
        }

        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{value:?}");
                }
            }
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        self.state.lock().expect("capture lock").events.push(Captured {
            target: metadata.target().to_owned(),
            level: *metadata.level(),
            message: visitor.message,
        });
    }
}

fn captured<F: FnOnce()>(body: F) -> Vec<Captured> {
    let state = Arc::new(Mutex::new(CaptureState::default()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        state: Arc::clone(&state),
    });
    {
        let _guard = tracing::subscriber::set_default(subscriber);
        tracing::callsite::rebuild_interest_cache();
        body();
    }
    tracing::callsite::rebuild_interest_cache();
    let events = std::mem::take(&mut state.lock().expect("capture lock").events);
    events
}

fn engine(types: &[&'static str]) -> DockManager {
    let mut engine = DockManager::default();
    for name in types {
        engine
            .register(name, PanelTypeOptions::default(), |_| {})
            .expect("register");
    }
    engine.set_area(Rect::from_size(1000.0, 600.0));
    engine
}

fn pointer(kind: PointerEventKind, x: f64, y: f64) -> InputEvent {
    InputEvent::Pointer(PointerEvent::new(kind, x, y))
}

#[test]
fn mutations_log_under_the_tree_target() {
    let events = captured(|| {
        let mut engine = engine(&["editor", "console"]);
        let editor = engine
            .add_panel("editor", DockLocation::Left, None, InsertOptions::default())
            .expect("editor");
        engine
            .add_panel(
                "console",
                DockLocation::Bottom,
                Some(DockTarget::Panel(editor)),
                InsertOptions::default(),
            )
            .expect("console");
    });
    let tree: Vec<&Captured> = events
        .iter()
        .filter(|e| e.target == "dockyard.tree")
        .collect();
    assert!(
        tree.iter()
            .any(|e| e.level == Level::DEBUG && e.message.contains("mutation applied")),
        "expected applied mutations, got {tree:?}"
    );
    assert!(tree.iter().any(|e| e.message.contains("panel created")));
}

#[test]
fn restoring_an_unregistered_type_warns() {
    let mut source = engine(&["editor", "console"]);
    let editor = source
        .add_panel("editor", DockLocation::Left, None, InsertOptions::default())
        .expect("editor");
    source
        .add_panel(
            "console",
            DockLocation::Right,
            Some(DockTarget::Panel(editor)),
            InsertOptions::default(),
        )
        .expect("console");
    let mut snapshot = source.save();
    let Some(NodeRecord::Splitter { second, .. }) = snapshot.root.as_mut() else {
        panic!("expected a split root");
    };
    let NodeRecord::Frame(frame) = second.as_mut() else {
        panic!("expected a frame");
    };
    frame.panels[0].panel_type = "mystery".into();

    let mut report = None;
    let events = captured(|| {
        let mut target = engine(&["editor", "console"]);
        report = Some(target.restore(&snapshot).expect("restore"));
    });
    let report = report.expect("report");
    assert_eq!(report.skipped, vec!["mystery".to_owned()]);
    assert_eq!(report.panels, 1);
    assert!(events.iter().any(|e| e.target == "dockyard.snapshot"
        && e.level == Level::WARN
        && e.message.contains("unregistered")));
}

#[test]
fn pointer_drag_logs_its_lifecycle() {
    let events = captured(|| {
        let mut engine = engine(&["editor", "console"]);
        let editor = engine
            .add_panel("editor", DockLocation::Left, None, InsertOptions::default())
            .expect("editor");
        engine
            .add_panel(
                "console",
                DockLocation::Right,
                Some(DockTarget::Panel(editor)),
                InsertOptions::default(),
            )
            .expect("console");
        engine.solve_now();

        let down = pointer(PointerEventKind::Down(PointerButton::Primary), 100.0, 10.0);
        engine.handle_event(down).expect("down");
        engine
            .handle_event(pointer(PointerEventKind::Moved, 160.0, 200.0))
            .expect("move");
        engine
            .tick(std::time::Duration::from_millis(16))
            .expect("tick");
        assert!(engine.drag().is_dragging());
        engine
            .handle_event(pointer(PointerEventKind::Up(PointerButton::Primary), 160.0, 200.0))
            .expect("up");
        assert!(!engine.drag().is_active());
    });
    let drag: Vec<&str> = events
        .iter()
        .filter(|e| e.target == "dockyard.drag")
        .map(|e| e.message.as_str())
        .collect();
    assert!(drag.iter().any(|m| m.contains("drag armed")), "{drag:?}");
    assert!(drag.iter().any(|m| m.contains("drag started")), "{drag:?}");
    assert!(drag.iter().any(|m| m.contains("drag committed")), "{drag:?}");
}

#[test]
fn new_panel_drag_can_be_canceled() {
    let events = captured(|| {
        let mut engine = engine(&["editor"]);
        engine
            .begin_panel_drag("editor", Point::new(500.0, 300.0))
            .expect("begin");
        assert!(engine.drag().is_dragging());
        engine.handle_event(InputEvent::Cancel).expect("cancel");
        assert!(engine.ghost().is_none());
    });
    assert!(
        events
            .iter()
            .any(|e| e.target == "dockyard.drag" && e.message.contains("drag canceled"))
    );
}
