use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use plaster::prelude::*;

const FRAME: Duration = Duration::from_millis(16);

type Log = Rc<RefCell<Vec<(WidgetId, Event)>>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn quiet() -> Box<dyn Holder<SoftwareSurface>> {
    from_fn(|_, _, _| EventResponse::Ignored)
}

fn recording(log: &Log, response: EventResponse) -> Box<dyn Holder<SoftwareSurface>> {
    let log = log.clone();
    from_fn(move |_, id, event| {
        log.borrow_mut().push((id, *event));
        response
    })
}

fn pointer_log(log: &Log) -> Vec<(WidgetId, PointerEvent)> {
    log.borrow()
        .iter()
        .filter_map(|(id, event)| event.pointer().map(|p| (*id, *p)))
        .collect()
}

struct Window {
    tree: Tree<SoftwareSurface>,
    scene: HeadlessScene,
    root: WidgetId,
    panel: WidgetId,
    button: WidgetId,
}

/// A 100x100 top-level widget holding a container that fills it, and a
/// leaf at (10, 10, 20, 20) inside the container. One frame has run.
fn window(log: &Log, tree: Tree<SoftwareSurface>, scene: HeadlessScene) -> Window {
    let mut tree = tree;
    let root = tree.create(None, quiet(), None, false).unwrap();
    tree.set_top_level(root, Altitude::Explicit(0), Rect::from_size(100, 100))
        .unwrap();
    let panel = tree
        .create(Some(root), recording(log, EventResponse::Ignored), None, true)
        .unwrap();
    let button = tree
        .create(
            Some(panel),
            recording(log, EventResponse::Handled),
            Some("Save the document"),
            false,
        )
        .unwrap();
    tree.set_child_count(root, 1).unwrap();
    tree.set_child(root, 0, Some(panel)).unwrap();
    tree.set_child_count(panel, 1).unwrap();
    tree.set_child(panel, 0, Some(button)).unwrap();
    tree.set_child_rect(panel, 0, Rect::new(10, 10, 20, 20)).unwrap();

    scene.tick(&mut tree, FRAME);
    tree.take_stats();
    log.borrow_mut().clear();

    Window {
        tree,
        scene,
        root,
        panel,
        button,
    }
}

fn headless() -> (Tree<SoftwareSurface>, HeadlessScene) {
    let scene = HeadlessScene::new();
    (Tree::new(GuiConfig::default(), scene.clone()), scene)
}

#[test]
fn test_repainting_one_leaf_costs_one_restore_and_one_blit() {
    init_logging();
    let log = Log::default();
    let (tree, scene) = headless();
    let Window {
        mut tree,
        scene,
        root,
        panel,
        button,
    } = window(&log, tree, scene);

    assert_eq!(tree.rect(panel), Some(Rect::new(0, 0, 100, 100)));
    assert_eq!(tree.rect(button), Some(Rect::new(10, 10, 20, 20)));
    let redraws_before = scene.object_for(root).unwrap().redraws;

    let blue = Color::rgb(0, 0, 255);
    tree.drawing_surface_mut(button).unwrap().clear(blue);
    tree.mark_dirty(button).unwrap();
    scene.tick(&mut tree, FRAME);

    let stats = tree.take_stats();
    assert_eq!(stats.restores, 1);
    assert_eq!(stats.blits, 1);
    assert_eq!(stats.snapshots, 0);
    assert_eq!(stats.redraw_requests, 1);
    assert_eq!(scene.object_for(root).unwrap().redraws, redraws_before + 1);

    let buffer = tree.drawing_surface(root).unwrap();
    assert_eq!(buffer.pixel(10, 10), Some(blue));
    assert_eq!(buffer.pixel(29, 29), Some(blue));
    assert_eq!(buffer.pixel(30, 30), Some(Color::BLACK));
    assert!(!tree.is_dirty(button));
}

#[test]
fn test_floating_windows_stack_and_close_gaps() {
    init_logging();
    let (mut tree, scene) = headless();

    let mut dialogs = Vec::new();
    for _ in 0..3 {
        let dialog = tree.create(None, quiet(), None, false).unwrap();
        tree.set_top_level(dialog, Altitude::Automatic, Rect::new(20, 20, 50, 40))
            .unwrap();
        dialogs.push(dialog);
    }
    let (d1, d2, d3) = (dialogs[0], dialogs[1], dialogs[2]);

    assert_eq!(tree.altitude(d1), Some(-10000));
    assert_eq!(tree.altitude(d2), Some(-10001));
    assert_eq!(tree.altitude(d3), Some(-10002));
    assert_eq!(scene.paint_order(), vec![d1, d2, d3]);

    tree.set_altitude(d1, Altitude::Explicit(5)).unwrap();

    assert_eq!(tree.altitude(d1), Some(5));
    assert_eq!(scene.object_for(d1).unwrap().depth, 5);
    assert_eq!(scene.object_for(d2).unwrap().depth, 10000);
    assert_eq!(scene.object_for(d3).unwrap().depth, 10001);
    assert_eq!(tree.altitude(d2), Some(-10000));
    assert_eq!(tree.altitude(d3), Some(-10001));
    assert_eq!(scene.paint_order(), vec![d1, d2, d3]);
}

#[test]
fn test_deleted_floating_window_closes_the_gap() {
    init_logging();
    let (mut tree, scene) = headless();

    let mut dialogs = Vec::new();
    for _ in 0..3 {
        let dialog = tree.create(None, quiet(), None, false).unwrap();
        tree.set_top_level(dialog, Altitude::Automatic, Rect::new(0, 0, 30, 30))
            .unwrap();
        dialogs.push(dialog);
    }

    tree.delete(dialogs[0]).unwrap();
    // Still alive until the scene delivers the deletion.
    assert!(tree.contains(dialogs[0]));
    assert_eq!(tree.altitude(dialogs[2]), Some(-10002));

    scene.tick(&mut tree, FRAME);

    assert!(!tree.contains(dialogs[0]));
    assert_eq!(tree.altitude(dialogs[1]), Some(-10000));
    assert_eq!(tree.altitude(dialogs[2]), Some(-10001));
    assert_eq!(scene.len(), 2);
    assert_eq!(scene.paint_order(), vec![dialogs[1], dialogs[2]]);
}

#[test]
fn test_press_on_a_floating_window_raises_it() {
    init_logging();
    let (mut tree, scene) = headless();

    let bottom = tree.create(None, quiet(), None, false).unwrap();
    tree.set_top_level(bottom, Altitude::Automatic, Rect::new(0, 0, 40, 40))
        .unwrap();
    let top = tree.create(None, quiet(), None, false).unwrap();
    tree.set_top_level(top, Altitude::Automatic, Rect::new(10, 10, 40, 40))
        .unwrap();
    assert_eq!(scene.paint_order(), vec![bottom, top]);

    tree.dispatch(
        bottom,
        &Event::Pointer(PointerEvent::press(5, 5, MouseButton::Left)),
    );

    assert_eq!(scene.paint_order(), vec![top, bottom]);
    assert_eq!(tree.altitude(bottom), Some(-10001));
    assert_eq!(tree.altitude(top), Some(-10000));
}

#[test]
fn test_drag_out_of_a_button_stays_captured_until_release() {
    init_logging();
    let log = Log::default();
    let (tree, scene) = headless();
    let Window {
        mut tree,
        root,
        panel,
        button,
        ..
    } = window(&log, tree, scene);

    let response = tree.dispatch(
        root,
        &Event::Pointer(PointerEvent::press(15, 15, MouseButton::Left)),
    );
    assert!(response.is_handled());
    assert_eq!(tree.capture(root), Capture::Child(0));
    assert_eq!(tree.capture(panel), Capture::Child(0));
    assert_eq!(tree.capture(button), Capture::SelfNode);

    tree.dispatch(root, &Event::Pointer(PointerEvent::moved(80, 80)));
    assert_eq!(tree.capture(button), Capture::SelfNode);

    tree.dispatch(
        root,
        &Event::Pointer(PointerEvent::release(80, 80, MouseButton::Left)),
    );

    assert_eq!(
        pointer_log(&log),
        vec![
            (button, PointerEvent::press(5, 5, MouseButton::Left)),
            (button, PointerEvent::moved(70, 70)),
            (button, PointerEvent::release(70, 70, MouseButton::Left)),
        ]
    );
    for id in [root, panel, button] {
        assert_eq!(tree.capture(id), Capture::None);
    }

    // Without capture a move outside the button reaches the panel only.
    log.borrow_mut().clear();
    tree.dispatch(root, &Event::Pointer(PointerEvent::moved(80, 80)));
    assert_eq!(pointer_log(&log), vec![(panel, PointerEvent::moved(80, 80))]);
}

#[test]
fn test_keyboard_follows_the_pressed_button() {
    init_logging();
    let log = Log::default();
    let (tree, scene) = headless();
    let Window {
        mut tree,
        root,
        button,
        ..
    } = window(&log, tree, scene);

    let key = KeyEvent::pressed(Key::Char('\r'));
    let response = tree.dispatch(root, &Event::Keyboard(key));

    assert!(response.is_handled());
    assert_eq!(*log.borrow(), vec![(button, Event::Keyboard(key))]);
}

#[test]
fn test_hover_arms_the_tooltip_in_screen_coordinates() {
    init_logging();
    let log = Log::default();
    let tracker = TooltipTracker::new(TooltipConfig::default(), |text| {
        (text.len() as u32 * 6, 10)
    })
    .shared();
    tracker.borrow_mut().set_screen_size(800, 600);

    let scene = HeadlessScene::new();
    let tree = Tree::new(GuiConfig::default(), scene.clone()).with_tooltip(tracker.clone());
    let Window {
        mut tree,
        scene,
        root,
        button,
        ..
    } = window(&log, tree, scene);
    tree.set_top_level(root, Altitude::Explicit(0), Rect::new(200, 100, 100, 100))
        .unwrap();

    tree.dispatch(root, &Event::Pointer(PointerEvent::moved(15, 15)));
    assert!(tracker.borrow().is_pending());
    assert_eq!(tracker.borrow().caller(), Some(button));

    // Keep hovering past the insist delay: the tip shows on the next frame.
    let mut shown = None;
    for _ in 0..20 {
        tree.dispatch(root, &Event::Pointer(PointerEvent::moved(16, 15)));
        scene.tick(&mut tree, FRAME);
        if let Some(change) = tracker.borrow_mut().advance(FRAME) {
            shown = Some(change);
            break;
        }
    }
    assert_eq!(shown, Some(TooltipChange::Show));

    let tracker = tracker.borrow();
    let (text, area) = tracker.visible().unwrap();
    assert_eq!(text, "Save the document");
    let width = 17 * 6 + 2 * 4;
    // Centered under the button at (210, 110, 20, 20) on screen.
    assert_eq!(area, Rect::new(220 - width as i32 / 2, 130, width, 18));
}

#[test]
fn test_deleting_a_button_restores_its_background() {
    init_logging();
    let log = Log::default();
    let (tree, scene) = headless();
    let Window {
        mut tree,
        scene,
        root,
        panel,
        button,
    } = window(&log, tree, scene);

    tree.drawing_surface_mut(button).unwrap().clear(Color::WHITE);
    tree.mark_dirty(button).unwrap();
    scene.tick(&mut tree, FRAME);
    assert_eq!(
        tree.drawing_surface(root).unwrap().pixel(12, 12),
        Some(Color::WHITE)
    );

    tree.delete(button).unwrap();

    assert!(!tree.contains(button));
    assert_eq!(tree.child(panel, 0), None);
    assert_eq!(tree.focus(panel), None);
    assert_eq!(
        tree.drawing_surface(root).unwrap().pixel(12, 12),
        Some(Color::BLACK)
    );
    assert!(log
        .borrow()
        .iter()
        .any(|(id, event)| *id == button && *event == Event::Delete));

    tree.take_stats();
    scene.tick(&mut tree, FRAME);
    let stats = tree.take_stats();
    assert_eq!(stats.copies(), 0);
    assert_eq!(stats.redraw_requests, 1);
}
