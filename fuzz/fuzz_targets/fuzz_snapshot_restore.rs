#![no_main]

use dockyard_layout::{DockManager, LayoutSnapshot, PanelTypeOptions, Rect};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if json.len() > 16 * 1024 {
        return;
    }
    let Ok(snapshot) = LayoutSnapshot::from_json(json) else {
        return;
    };

    let mut engine = DockManager::default();
    for name in ["editor", "console", "files"] {
        engine
            .register(name, PanelTypeOptions::default(), |_| {})
            .expect("register");
    }
    engine.set_area(Rect::from_size(1024.0, 768.0));
    let before = engine.save();

    match engine.restore(&snapshot) {
        Ok(_) => {
            // A restored layout must be structurally sound and re-save to a
            // fixed point.
            assert!(engine.tree().validate().is_ok(), "restored tree invalid");
            let saved = engine.save();
            engine.restore(&saved).expect("re-restore of a saved layout");
            assert_eq!(engine.save(), saved, "save/restore is not idempotent");
            engine.solve_now();
        }
        Err(_) => assert_eq!(engine.save(), before, "failed restore mutated the tree"),
    }
});
