#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use dockyard_core::event::{InputEvent, PointerButton, PointerEvent, PointerEventKind, ResizeEvent};
use dockyard_layout::{DockLocation, DockManager, InsertOptions, PanelTypeOptions, Rect};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Step {
    Down { x: u16, y: u16 },
    Move { x: u16, y: u16 },
    Up { x: u16, y: u16 },
    Resize { width: u16, height: u16 },
    Cancel,
    Add { location: u8 },
    Tick { millis: u8 },
}

const LOCATIONS: [DockLocation; 7] = [
    DockLocation::Left,
    DockLocation::Right,
    DockLocation::Top,
    DockLocation::Bottom,
    DockLocation::Stacked,
    DockLocation::Float,
    DockLocation::Modal,
];

fn pointer(kind: PointerEventKind, x: u16, y: u16) -> InputEvent {
    InputEvent::Pointer(PointerEvent::new(kind, f64::from(x % 1400), f64::from(y % 900)))
}

fuzz_target!(|steps: Vec<Step>| {
    let mut engine = DockManager::default();
    engine
        .register("pane", PanelTypeOptions::default(), |_| {})
        .expect("register");
    engine.set_area(Rect::from_size(1280.0, 800.0));

    for step in steps.into_iter().take(256) {
        let event = match step {
            Step::Down { x, y } => pointer(PointerEventKind::Down(PointerButton::Primary), x, y),
            Step::Move { x, y } => pointer(PointerEventKind::Moved, x, y),
            Step::Up { x, y } => pointer(PointerEventKind::Up(PointerButton::Primary), x, y),
            Step::Resize { width, height } => InputEvent::Resize(ResizeEvent::End {
                width: f64::from(width % 2000),
                height: f64::from(height % 1200),
            }),
            Step::Cancel => InputEvent::Cancel,
            Step::Add { location } => {
                let location = LOCATIONS[usize::from(location) % LOCATIONS.len()];
                let _ = engine.add_panel("pane", location, None, InsertOptions::default());
                continue;
            }
            Step::Tick { millis } => {
                let _ = engine.tick(Duration::from_millis(u64::from(millis)));
                continue;
            }
        };
        // Individual events may be rejected; the tree must stay sound.
        let _ = engine.handle_event(event);
        assert!(engine.tree().validate().is_ok(), "input left the tree invalid");
    }
});
