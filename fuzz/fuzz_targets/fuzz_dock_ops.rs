#![no_main]

use arbitrary::Arbitrary;
use floatdock_layout::{DockPosition, Rect, WindowId, WindowOptions, WindowStore, detect};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Open { x: i16, y: i16, w: u16, h: u16 },
    Dock { source: u8, target: u8, position: u8 },
    Undock { window: u8 },
    Close { window: u8 },
    Resize { window: u8, w: i16, h: i16 },
    Detect { drag: u8, target: u8 },
}

const POSITIONS: [DockPosition; 5] = [
    DockPosition::Left,
    DockPosition::Right,
    DockPosition::Top,
    DockPosition::Bottom,
    DockPosition::Center,
];

fn pick(open: &[WindowId], index: u8) -> Option<WindowId> {
    if open.is_empty() {
        None
    } else {
        Some(open[usize::from(index) % open.len()])
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut store = WindowStore::default();
    let mut open = Vec::new();

    for op in ops.into_iter().take(256) {
        match op {
            Op::Open { x, y, w, h } => {
                let bounds = Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h));
                open.push(store.create("fuzz", WindowOptions::at(bounds)));
            }
            Op::Dock { source, target, position } => {
                if let (Some(s), Some(t)) = (pick(&open, source), pick(&open, target)) {
                    let docked = store.dock(s, t, POSITIONS[usize::from(position) % POSITIONS.len()]);
                    assert_eq!(docked, s != t, "dock refused between visible windows");
                }
            }
            Op::Undock { window } => {
                if let Some(id) = pick(&open, window) {
                    let _ = store.undock(id);
                }
            }
            Op::Close { window } => {
                if let Some(id) = pick(&open, window) {
                    open.retain(|w| *w != id);
                    assert!(store.remove(id).is_some());
                }
            }
            Op::Resize { window, w, h } => {
                if let Some(id) = pick(&open, window) {
                    let _ = store.resize(id, floatdock_layout::Size::new(f64::from(w), f64::from(h)));
                    let size = store.get(id).map(|w| w.size).unwrap_or_default();
                    assert!(size.width >= store.min_size().width);
                    assert!(size.height >= store.min_size().height);
                }
            }
            Op::Detect { drag, target } => {
                if let (Some(d), Some(t)) = (pick(&open, drag), pick(&open, target)) {
                    let (Some(dw), Some(tw)) = (store.get(d), store.get(t)) else {
                        continue;
                    };
                    let first = detect(dw.bounds(), tw.bounds(), 50.0);
                    assert_eq!(first, detect(dw.bounds(), tw.bounds(), 50.0));
                }
            }
        }

        store.dock_tree().validate().expect("dock tree invariant");
        for window in store.windows() {
            assert_eq!(window.dock_to, store.dock_tree().dock_to(window.id));
            assert!((0.0..=1.0).contains(&window.opacity));
        }
    }
});
