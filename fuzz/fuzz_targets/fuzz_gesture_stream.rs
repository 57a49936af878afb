#![no_main]

use floatdock_core::config::InteractionConfig;
use floatdock_core::event::PointerSample;
use floatdock_core::geometry::Rect;
use floatdock_layout::{WindowId, WindowOptions};
use floatdock_runtime::{GestureOutcome, InteractionEngine, Stage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Three overlapping windows; every 4-byte chunk is one host event.
    let mut engine =
        InteractionEngine::headless(InteractionConfig::default(), Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let windows: Vec<WindowId> = (0..3)
        .map(|i| {
            let x = 100.0 + f64::from(i) * 300.0;
            engine.create("fuzz", WindowOptions::at(Rect::new(x, 100.0, 400.0, 300.0)))
        })
        .collect();

    let mut now: u64 = 0;
    for chunk in data.chunks_exact(4) {
        let window = windows[usize::from(chunk[0] >> 6) % windows.len()];
        now += u64::from(chunk[1]) * 8;
        let x = f64::from(chunk[2]) * 8.0;
        let y = f64::from(chunk[3]) * 4.0;
        let Ok(sample) = PointerSample::at_screen(x, y, now) else {
            continue;
        };

        match chunk[0] & 0x7 {
            0 => {
                let _ = engine.pointer_down(window, sample);
            }
            1 | 2 => {
                let _ = engine.pointer_move(window, sample);
            }
            3 => {
                let before = engine.session(window).map(|s| s.snapshot().opacity);
                if let Some(GestureOutcome::Canceled { .. }) = engine.pointer_up(window, sample) {
                    assert_eq!(engine.store().get(window).map(|w| w.opacity), before);
                }
            }
            4 => {
                let _ = engine.tick(now);
            }
            5 => {
                let before = engine.session(window).map(|s| s.snapshot());
                if engine.interrupt(window).is_some() {
                    let after = engine.store().get(window);
                    assert_eq!(after.map(|w| w.opacity), before.map(|s| s.opacity));
                    assert_eq!(after.map(|w| w.position), before.map(|s| s.position));
                }
            }
            6 => {
                let _ = engine.undock(window);
            }
            _ => {
                let _ = engine.focus(window);
            }
        }

        if let Some(session) = engine.session(window) {
            assert!((0.0..=1.0).contains(&session.progress()));
            if session.stage() != Stage::Dragging {
                assert!(session.preview().is_none());
            }
        }
        engine.store().dock_tree().validate().expect("dock tree invariant");
    }
});
