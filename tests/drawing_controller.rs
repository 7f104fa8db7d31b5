use egui::{Color32, ColorImage, pos2};
use studymask::command::CommandHistory;
use studymask::mask::MaskShape;
use studymask::page::Page;
use studymask::settings::Settings;
use studymask::tools::{DrawingController, Preview, ToolMode};

fn test_page() -> Page {
    Page::new("test", ColorImage::new([1000, 1000], Color32::WHITE))
}

#[test]
fn rect_drag_commits_one_undoable_mask() {
    let mut page = test_page();
    let mut history = CommandHistory::new();
    let mut controller = DrawingController::new();
    let settings = Settings::default();
    controller.set_mode(ToolMode::Rect);

    controller.pointer_down(pos2(100.0, 100.0), &mut page, &settings);
    controller.pointer_move(pos2(120.0, 130.0), &mut page, &settings);
    assert!(controller.is_drawing());
    assert_eq!(page.mask_count(), 0); // preview only, no model mutation

    controller
        .pointer_up(pos2(150.0, 150.0), &mut page, &mut history, &settings)
        .unwrap();

    assert_eq!(page.mask_count(), 1);
    assert!(!controller.is_drawing());
    match page.masks()[0].shape() {
        MaskShape::Rect(rect) => {
            assert_eq!(rect.min, pos2(100.0, 100.0));
            assert_eq!(rect.max, pos2(150.0, 150.0));
        }
        other => panic!("expected rect, got {other:?}"),
    }

    assert!(history.undo(&mut page));
    assert_eq!(page.mask_count(), 0);
}

#[test]
fn rect_drag_normalizes_inverted_corners() {
    let mut page = test_page();
    let mut history = CommandHistory::new();
    let mut controller = DrawingController::new();
    let settings = Settings::default();
    controller.set_mode(ToolMode::Rect);

    // Drag up-left: start below and right of the release point.
    controller.pointer_down(pos2(200.0, 200.0), &mut page, &settings);
    controller
        .pointer_up(pos2(150.0, 140.0), &mut page, &mut history, &settings)
        .unwrap();

    match page.masks()[0].shape() {
        MaskShape::Rect(rect) => {
            assert_eq!(rect.min, pos2(150.0, 140.0));
            assert_eq!(rect.max, pos2(200.0, 200.0));
        }
        other => panic!("expected rect, got {other:?}"),
    }
}

#[test]
fn tiny_rect_is_discarded_as_an_accidental_click() {
    let mut page = test_page();
    let mut history = CommandHistory::new();
    let mut controller = DrawingController::new();
    let settings = Settings::default();
    controller.set_mode(ToolMode::Rect);

    controller.pointer_down(pos2(100.0, 100.0), &mut page, &settings);
    controller
        .pointer_up(pos2(104.0, 104.0), &mut page, &mut history, &settings)
        .unwrap();

    assert_eq!(page.mask_count(), 0);
    assert!(history.is_empty());
}

#[test]
fn brush_stroke_commits_the_full_path() {
    let mut page = test_page();
    let mut history = CommandHistory::new();
    let mut controller = DrawingController::new();
    let settings = Settings::default();
    controller.set_mode(ToolMode::Brush);

    controller.pointer_down(pos2(10.0, 10.0), &mut page, &settings);
    controller.pointer_move(pos2(20.0, 15.0), &mut page, &settings);
    controller.pointer_move(pos2(30.0, 25.0), &mut page, &settings);
    assert!(matches!(controller.preview(), Some(Preview::Path(p)) if p.len() == 3));

    controller
        .pointer_up(pos2(30.0, 25.0), &mut page, &mut history, &settings)
        .unwrap();

    assert_eq!(page.mask_count(), 1);
    match page.masks()[0].shape() {
        MaskShape::Brush(points) => {
            assert_eq!(points.len(), 3);
            assert_eq!(points[0], pos2(10.0, 10.0));
        }
        other => panic!("expected brush, got {other:?}"),
    }
    assert!(history.can_undo());
}

#[test]
fn single_point_stroke_is_discarded() {
    let mut page = test_page();
    let mut history = CommandHistory::new();
    let mut controller = DrawingController::new();
    let settings = Settings::default();
    controller.set_mode(ToolMode::Brush);

    controller.pointer_down(pos2(10.0, 10.0), &mut page, &settings);
    controller
        .pointer_up(pos2(10.0, 10.0), &mut page, &mut history, &settings)
        .unwrap();

    assert_eq!(page.mask_count(), 0);
    assert!(history.is_empty());
}

#[test]
fn eraser_drag_deletes_on_every_pass_without_history() {
    let mut page = test_page();
    let mut history = CommandHistory::new();
    let mut controller = DrawingController::new();
    let settings = Settings::default();

    // Two committed masks, far apart.
    controller.set_mode(ToolMode::Rect);
    controller.pointer_down(pos2(100.0, 100.0), &mut page, &settings);
    controller
        .pointer_up(pos2(150.0, 150.0), &mut page, &mut history, &settings)
        .unwrap();
    controller.pointer_down(pos2(400.0, 400.0), &mut page, &settings);
    controller
        .pointer_up(pos2(450.0, 450.0), &mut page, &mut history, &settings)
        .unwrap();
    assert_eq!(page.mask_count(), 2);
    let history_len = history.len();

    controller.set_mode(ToolMode::Eraser);
    controller.pointer_down(pos2(120.0, 120.0), &mut page, &settings);
    assert_eq!(page.mask_count(), 1); // deletion on pointer-down, no commit step
    controller.pointer_move(pos2(420.0, 420.0), &mut page, &settings);
    assert_eq!(page.mask_count(), 0); // and again per move event
    controller
        .pointer_up(pos2(420.0, 420.0), &mut page, &mut history, &settings)
        .unwrap();

    assert_eq!(history.len(), history_len);
}

#[test]
fn view_mode_click_toggles_without_drawing() {
    let mut page = test_page();
    let mut history = CommandHistory::new();
    let mut controller = DrawingController::new();
    let settings = Settings::default();

    controller.set_mode(ToolMode::Rect);
    controller.pointer_down(pos2(100.0, 100.0), &mut page, &settings);
    controller
        .pointer_up(pos2(200.0, 200.0), &mut page, &mut history, &settings)
        .unwrap();

    controller.set_mode(ToolMode::View);
    controller.pointer_down(pos2(150.0, 150.0), &mut page, &settings);

    assert!(!controller.is_drawing());
    assert!(!page.masks()[0].is_visible());
    assert_eq!(history.len(), 1);
}

#[test]
fn pinch_suppresses_and_cancels_single_pointer_drawing() {
    let mut page = test_page();
    let mut history = CommandHistory::new();
    let mut controller = DrawingController::new();
    let settings = Settings::default();
    controller.set_mode(ToolMode::Rect);

    controller.pointer_down(pos2(100.0, 100.0), &mut page, &settings);
    assert!(controller.is_drawing());

    // Second finger lands: the stroke is cancelled and the pinch takes over.
    let zoom = controller.touch_update(&[pos2(100.0, 100.0), pos2(300.0, 100.0)], 1.0);
    assert_eq!(zoom, None);
    assert!(!controller.is_drawing());

    // Drawing input is ignored for the duration of the gesture.
    controller.pointer_down(pos2(200.0, 200.0), &mut page, &settings);
    assert!(!controller.is_drawing());

    let zoom = controller.touch_update(&[pos2(100.0, 100.0), pos2(500.0, 100.0)], 1.0);
    assert!((zoom.unwrap() - 2.0).abs() < 1e-6);

    // Fingers lift: the gesture ends and drawing works again.
    controller.touch_update(&[], 1.0);
    controller.pointer_down(pos2(200.0, 200.0), &mut page, &settings);
    assert!(controller.is_drawing());
    controller
        .pointer_up(pos2(260.0, 260.0), &mut page, &mut history, &settings)
        .unwrap();
    assert_eq!(page.mask_count(), 1);
}

#[test]
fn switching_tools_drops_in_progress_geometry() {
    let mut page = test_page();
    let mut controller = DrawingController::new();
    let settings = Settings::default();
    controller.set_mode(ToolMode::Brush);

    controller.pointer_down(pos2(10.0, 10.0), &mut page, &settings);
    controller.pointer_move(pos2(20.0, 20.0), &mut page, &settings);
    assert!(controller.is_drawing());

    controller.set_mode(ToolMode::View);
    assert!(!controller.is_drawing());
    assert!(controller.preview().is_none());
}
