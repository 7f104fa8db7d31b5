use egui::{Color32, ColorImage, pos2};
use futures::channel::oneshot;
use studymask::detection::{
    DetectionError, DetectionResult, DetectionTask, Detector, NormalizedBox, insert_boxes,
    parse_boxes,
};
use studymask::mask::MaskShape;
use studymask::page::Page;
use studymask::project::Project;

fn project_with_page() -> Project {
    let mut project = Project::new();
    project.add_page(Page::new(
        "scan",
        ColorImage::new([1000, 500], Color32::WHITE),
    ));
    project
}

fn nbox(ymin: f32, xmin: f32, ymax: f32, xmax: f32) -> NormalizedBox {
    NormalizedBox {
        ymin,
        xmin,
        ymax,
        xmax,
    }
}

#[test]
fn boxes_become_individually_undoable_masks() {
    let mut project = project_with_page();
    let boxes = [nbox(100.0, 100.0, 200.0, 300.0), nbox(400.0, 0.0, 600.0, 500.0)];

    let inserted = insert_boxes(&mut project, &boxes, Color32::RED).unwrap();
    assert_eq!(inserted, 2);

    let page = project.current_page().unwrap();
    assert_eq!(page.mask_count(), 2);
    match page.masks()[0].shape() {
        MaskShape::Rect(rect) => {
            // 0-1000 fixed point scaled onto the 1000x500 canvas.
            assert_eq!(rect.min, pos2(100.0, 50.0));
            assert_eq!(rect.max, pos2(300.0, 100.0));
        }
        other => panic!("expected rect, got {other:?}"),
    }

    // One command per box: a single undo removes only the last one.
    assert!(project.undo());
    assert_eq!(project.current_page().unwrap().mask_count(), 1);
    assert!(project.undo());
    assert_eq!(project.current_page().unwrap().mask_count(), 0);
}

#[test]
fn degenerate_boxes_are_skipped_not_fatal() {
    let mut project = project_with_page();
    let boxes = [
        nbox(100.0, 100.0, 200.0, 300.0),
        nbox(500.0, 500.0, 500.0, 500.0), // zero extent
        nbox(300.0, 400.0, 200.0, 500.0), // inverted
    ];

    let inserted = insert_boxes(&mut project, &boxes, Color32::RED).unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(project.current_page().unwrap().mask_count(), 1);
}

#[test]
fn stale_results_are_discarded_after_a_page_switch() {
    let mut project = project_with_page();
    project.add_page(Page::new(
        "other",
        ColorImage::new([1000, 500], Color32::WHITE),
    ));

    let (task, _tx) = DetectionTask::new(project.current_page().unwrap().id());

    // The user switches pages while the call is in flight.
    project.select_page(1);

    let boxes = [nbox(100.0, 100.0, 200.0, 300.0)];
    let result = task.apply(&mut project, &boxes, Color32::RED);
    assert!(matches!(result, Err(DetectionError::StalePage)));
    assert_eq!(project.current_page().unwrap().mask_count(), 0);
    assert_eq!(project.pages()[0].mask_count(), 0);
}

#[test]
fn task_polls_to_completion_through_the_channel() {
    struct StubDetector {
        boxes: Vec<NormalizedBox>,
    }

    impl Detector for StubDetector {
        fn detect(&self, _image: &ColorImage, reply: oneshot::Sender<DetectionResult>) {
            let _ = reply.send(Ok(self.boxes.clone()));
        }
    }

    let mut project = project_with_page();
    let page_id = project.current_page().unwrap().id();

    let (mut task, tx) = DetectionTask::new(page_id);
    let detector = StubDetector {
        boxes: vec![nbox(0.0, 0.0, 100.0, 100.0)],
    };
    detector.detect(project.current_page().unwrap().image().data(), tx);

    let boxes = task.try_take().expect("stub replies immediately").unwrap();
    assert_eq!(task.apply(&mut project, &boxes, Color32::RED).unwrap(), 1);
    assert_eq!(project.current_page().unwrap().mask_count(), 1);
}

#[test]
fn dropped_collaborator_reports_cancellation() {
    let mut project = project_with_page();
    let (mut task, tx) = DetectionTask::new(project.current_page().unwrap().id());
    drop(tx);

    assert!(matches!(
        task.try_take(),
        Some(Err(DetectionError::Cancelled))
    ));
    assert_eq!(project.current_page().unwrap().mask_count(), 0);
}

#[test]
fn pending_task_yields_none_until_the_reply_lands() {
    let (mut task, tx) = DetectionTask::new(uuid::Uuid::new_v4());
    assert!(task.try_take().is_none());

    tx.send(Ok(vec![nbox(0.0, 0.0, 10.0, 10.0)])).unwrap();
    let boxes = task.try_take().expect("reply landed").unwrap();
    assert_eq!(boxes.len(), 1);
}

#[test]
fn payload_parsing_matches_the_collaborator_contract() {
    let reply = "```json\n{\"boxes\": [[120, 40, 380, 900]]}\n```";
    let boxes = parse_boxes(reply).unwrap();
    assert_eq!(boxes, vec![nbox(120.0, 40.0, 380.0, 900.0)]);

    assert!(parse_boxes("{\"boxes\": []}").unwrap().is_empty());
    assert!(parse_boxes("garbage").is_err());
}
