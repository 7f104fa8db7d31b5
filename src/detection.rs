use egui::{Color32, ColorImage, Rect, pos2};
use futures::channel::oneshot;
use serde::Deserialize;

use crate::command::{Command, CommandError};
use crate::mask::Mask;
use crate::page::PageId;
use crate::project::Project;

/// The detection collaborator reports box corners in a 0-1000 fixed-point
/// coordinate space, `[ymin, xmin, ymax, xmax]` ordering.
pub const COORD_SPACE: f32 = 1000.0;

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("malformed detection payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("detection result arrived for a page that is no longer current")]
    StalePage,
    #[error("detection collaborator dropped without a result")]
    Cancelled,
    #[error("detection failed: {0}")]
    Collaborator(String),
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// One detected box in normalized 0-1000 coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub ymin: f32,
    pub xmin: f32,
    pub ymax: f32,
    pub xmax: f32,
}

impl NormalizedBox {
    /// Scale into image-pixel space for a canvas of the given dimensions.
    pub fn to_rect(self, canvas_width: f32, canvas_height: f32) -> Rect {
        Rect::from_min_max(
            pos2(
                self.xmin / COORD_SPACE * canvas_width,
                self.ymin / COORD_SPACE * canvas_height,
            ),
            pos2(
                self.xmax / COORD_SPACE * canvas_width,
                self.ymax / COORD_SPACE * canvas_height,
            ),
        )
    }
}

#[derive(Deserialize)]
struct BoxesPayload {
    #[serde(default)]
    boxes: Vec<[f32; 4]>,
}

/// Parse the collaborator's raw text reply into normalized boxes.
///
/// The reply is expected to be `{"boxes": [[ymin,xmin,ymax,xmax], ...]}` but
/// models like to wrap JSON in Markdown code fences, so those are stripped
/// first. A malformed payload is an error; a well-formed empty list simply
/// means no boxes were found.
pub fn parse_boxes(text: &str) -> Result<Vec<NormalizedBox>, DetectionError> {
    let mut body = text.trim();
    if body.starts_with("```") {
        body = body
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
    }

    let payload: BoxesPayload = serde_json::from_str(body)?;
    Ok(payload
        .boxes
        .into_iter()
        .map(|[ymin, xmin, ymax, xmax]| NormalizedBox {
            ymin,
            xmin,
            ymax,
            xmax,
        })
        .collect())
}

/// Insert detected boxes as rectangle masks on the current page, one
/// `AddMask` command per box so each is independently undoable and a partial
/// failure after N of M boxes leaves N consistent masks.
///
/// Degenerate boxes (non-positive extent after scaling) are skipped, not
/// errors. Returns the number of masks inserted.
pub fn insert_boxes(
    project: &mut Project,
    boxes: &[NormalizedBox],
    color: Color32,
) -> Result<usize, DetectionError> {
    let (canvas_w, canvas_h) = {
        let page = project.current_page().ok_or(CommandError::NoCurrentPage)?;
        (page.image().width(), page.image().height())
    };

    let mut inserted = 0;
    for &nbox in boxes {
        let rect = nbox.to_rect(canvas_w, canvas_h);
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            log::warn!("skipping degenerate detection box: {nbox:?}");
            continue;
        }
        project.execute(Command::add_mask(Mask::rect(rect, color)))?;
        inserted += 1;
    }

    log::info!("inserted {inserted} detected masks");
    Ok(inserted)
}

pub type DetectionResult = Result<Vec<NormalizedBox>, DetectionError>;

/// Boundary contract for the external detection collaborator. It receives
/// the page image and must eventually send exactly one terminal result over
/// the channel; the core stays responsive while the call is outstanding.
pub trait Detector: Send {
    fn detect(&self, image: &ColorImage, reply: oneshot::Sender<DetectionResult>);
}

/// An outstanding detection call, pinned to the page it was started for.
pub struct DetectionTask {
    page: PageId,
    rx: oneshot::Receiver<DetectionResult>,
}

impl DetectionTask {
    pub fn new(page: PageId) -> (Self, oneshot::Sender<DetectionResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { page, rx }, tx)
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    /// Non-blocking poll. `None` while the call is still outstanding.
    pub fn try_take(&mut self) -> Option<DetectionResult> {
        match self.rx.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(DetectionError::Cancelled)),
        }
    }

    /// Fold a completed result back into the project.
    ///
    /// If the user switched pages while the call was in flight the result is
    /// discarded with `StalePage` rather than silently applied to the wrong
    /// page.
    pub fn apply(
        &self,
        project: &mut Project,
        boxes: &[NormalizedBox],
        color: Color32,
    ) -> Result<usize, DetectionError> {
        match project.current_page() {
            Some(page) if page.id() == self.page => insert_boxes(project, boxes, color),
            _ => {
                log::info!("discarding stale detection result for {}", self.page);
                Err(DetectionError::StalePage)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_fenced_payloads() {
        let plain = r#"{"boxes": [[100, 50, 200, 300]]}"#;
        let boxes = parse_boxes(plain).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].xmin, 50.0);
        assert_eq!(boxes[0].ymax, 200.0);

        let fenced = "```json\n{\"boxes\": [[100, 50, 200, 300], [0, 0, 10, 10]]}\n```";
        assert_eq!(parse_boxes(fenced).unwrap().len(), 2);

        assert!(parse_boxes("{\"boxes\": []}").unwrap().is_empty());
        assert!(parse_boxes("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(matches!(
            parse_boxes("not json at all"),
            Err(DetectionError::Malformed(_))
        ));
        assert!(matches!(
            parse_boxes(r#"{"boxes": [[1, 2, 3]]}"#),
            Err(DetectionError::Malformed(_))
        ));
    }

    #[test]
    fn boxes_scale_into_image_pixels() {
        let nbox = NormalizedBox {
            ymin: 100.0,
            xmin: 50.0,
            ymax: 200.0,
            xmax: 300.0,
        };
        let rect = nbox.to_rect(800.0, 600.0);
        assert_eq!(rect.min, pos2(40.0, 60.0));
        assert_eq!(rect.max, pos2(240.0, 120.0));
    }
}
