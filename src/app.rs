use std::collections::HashMap;

use egui::{ColorImage, Key, Pos2, Sense, vec2};

use crate::command::Command;
use crate::detection::{DetectionTask, Detector};
use crate::geometry::CanvasTransform;
use crate::page::Page;
use crate::project::Project;
use crate::renderer::Renderer;
use crate::settings::{self, Settings};
use crate::tools::{DrawingController, ToolMode};

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct StudymaskApp {
    settings: Settings,
    zoom: f32,
    quiz_mode: bool,

    // Pages hold decoded images and the detection task holds a live channel;
    // neither survives a restart.
    #[serde(skip)]
    project: Project,
    #[serde(skip)]
    controller: DrawingController,
    #[serde(skip)]
    renderer: Renderer,
    #[serde(skip)]
    pending_detection: Option<DetectionTask>,
    #[serde(skip)]
    detector: Option<Box<dyn Detector>>,
    #[serde(skip)]
    active_touches: HashMap<u64, Pos2>,
}

impl Default for StudymaskApp {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            zoom: 1.0,
            quiz_mode: false,
            project: Project::new(),
            controller: DrawingController::new(),
            renderer: Renderer::new(),
            pending_detection: None,
            detector: None,
            active_touches: HashMap::new(),
        }
    }
}

impl StudymaskApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        if let Some(storage) = cc.storage {
            return eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default();
        }
        Self::default()
    }

    /// Plug in the external detection collaborator.
    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    fn start_detection(&mut self) {
        let Some(detector) = &self.detector else {
            return;
        };
        let Some(page) = self.project.current_page() else {
            return;
        };

        let (task, tx) = DetectionTask::new(page.id());
        detector.detect(page.image().data(), tx);
        log::info!("detection started for page '{}'", page.name());
        self.pending_detection = Some(task);
    }

    fn poll_detection(&mut self) {
        if let Some(mut task) = self.pending_detection.take() {
            match task.try_take() {
                None => self.pending_detection = Some(task),
                Some(Ok(boxes)) => {
                    match task.apply(&mut self.project, &boxes, self.settings.brush_color) {
                        Ok(n) => log::info!("detection added {n} masks"),
                        Err(err) => log::warn!("detection result dropped: {err}"),
                    }
                }
                Some(Err(err)) => log::warn!("detection failed: {err}"),
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let name = if !file.name.is_empty() {
                file.name.clone()
            } else if let Some(path) = &file.path {
                path.display().to_string()
            } else {
                "page".to_owned()
            };

            let bytes = if let Some(bytes) = &file.bytes {
                Some(bytes.to_vec())
            } else if let Some(path) = &file.path {
                std::fs::read(path).ok()
            } else {
                None
            };

            match bytes {
                Some(bytes) => match load_page_from_bytes(&name, &bytes) {
                    Ok(page) => {
                        let index = self.project.add_page(page);
                        log::info!("imported '{name}' as page {index}");
                    }
                    Err(err) => log::warn!("could not decode '{name}': {err}"),
                },
                None => log::warn!("dropped file '{name}' had no readable content"),
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo, mode) = ctx.input(|i| {
            let undo = i.modifiers.command && i.key_pressed(Key::Z) && !i.modifiers.shift;
            let redo = i.modifiers.command
                && (i.key_pressed(Key::Y) || (i.modifiers.shift && i.key_pressed(Key::Z)));
            let mode = if i.key_pressed(Key::Num1) {
                Some(ToolMode::View)
            } else if i.key_pressed(Key::Num2) {
                Some(ToolMode::Rect)
            } else if i.key_pressed(Key::Num3) {
                Some(ToolMode::Brush)
            } else if i.key_pressed(Key::Num4) {
                Some(ToolMode::Eraser)
            } else {
                None
            };
            (undo, redo, mode)
        });

        if undo {
            self.project.undo();
        }
        if redo {
            self.project.redo();
        }
        if let Some(mode) = mode {
            self.controller.set_mode(mode);
        }
    }

    fn track_touches(&mut self, ctx: &egui::Context) {
        let touches = &mut self.active_touches;
        ctx.input(|i| {
            for event in &i.events {
                if let egui::Event::Touch { id, phase, pos, .. } = event {
                    match phase {
                        egui::TouchPhase::Start | egui::TouchPhase::Move => {
                            touches.insert(id.0, *pos);
                        }
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                            touches.remove(&id.0);
                        }
                    }
                }
            }
        });

        // Stable ordering so the pinch sees the same finger first each frame.
        let mut points: Vec<(u64, Pos2)> = self.active_touches.iter().map(|(&k, &v)| (k, v)).collect();
        points.sort_by_key(|(id, _)| *id);
        let positions: Vec<Pos2> = points.into_iter().map(|(_, p)| p).collect();

        if let Some(zoom) = self.controller.touch_update(&positions, self.zoom) {
            self.zoom = zoom;
        }
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("tools_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Tools");
                ui.separator();

                for mode in [
                    ToolMode::View,
                    ToolMode::Rect,
                    ToolMode::Brush,
                    ToolMode::Eraser,
                ] {
                    if ui
                        .selectable_label(self.controller.mode() == mode, mode.name())
                        .clicked()
                    {
                        self.controller.set_mode(mode);
                    }
                }

                ui.separator();

                ui.horizontal(|ui| {
                    ui.label("Color:");
                    for color in settings::PALETTE {
                        let size = vec2(18.0, 18.0);
                        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
                        ui.painter().rect_filled(rect, 2.0, color);
                        if self.settings.brush_color == color {
                            ui.painter()
                                .rect_stroke(rect, 2.0, egui::Stroke::new(2.0, ui.visuals().strong_text_color()));
                        }
                        if response.clicked() {
                            self.settings.brush_color = color;
                        }
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Custom:");
                    egui::color_picker::color_edit_button_srgba(
                        ui,
                        &mut self.settings.brush_color,
                        egui::color_picker::Alpha::Opaque,
                    );
                });

                ui.horizontal(|ui| {
                    ui.label("Brush size:");
                    ui.add(egui::Slider::new(
                        &mut self.settings.brush_size,
                        settings::BRUSH_SIZE_MIN..=settings::BRUSH_SIZE_MAX,
                    ));
                });

                ui.separator();

                ui.horizontal(|ui| {
                    let can_undo = self.project.history().can_undo();
                    let can_redo = self.project.history().can_redo();
                    if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                        self.project.undo();
                    }
                    if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                        self.project.redo();
                    }
                });

                let has_page = self.project.current_page().is_some();

                if ui
                    .add_enabled(has_page, egui::Button::new("Hide / show all"))
                    .clicked()
                {
                    if let Some(page) = self.project.current_page_mut() {
                        page.toggle_all_masks();
                    }
                }

                let mut quiz = self.quiz_mode;
                if ui
                    .add_enabled(has_page, egui::Checkbox::new(&mut quiz, "Quiz mode"))
                    .changed()
                {
                    self.quiz_mode = quiz;
                    if let Some(page) = self.project.current_page_mut() {
                        page.set_all_visible(!quiz);
                    }
                }

                if ui
                    .add_enabled(has_page, egui::Button::new("Clear masks"))
                    .clicked()
                {
                    if let Err(err) = self.project.execute(Command::clear_masks()) {
                        log::warn!("clear failed: {err}");
                    }
                }

                ui.separator();

                let detect_ready =
                    has_page && self.detector.is_some() && self.pending_detection.is_none();
                if ui
                    .add_enabled(detect_ready, egui::Button::new("Detect boxes"))
                    .clicked()
                {
                    self.start_detection();
                }
                if self.pending_detection.is_some() {
                    ui.spinner();
                }

                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("−").clicked() {
                        self.zoom = settings::clamp_zoom(self.zoom - settings::ZOOM_STEP);
                    }
                    ui.label(format!("{:.0}%", self.zoom * 100.0));
                    if ui.button("+").clicked() {
                        self.zoom = settings::clamp_zoom(self.zoom + settings::ZOOM_STEP);
                    }
                });

                ui.separator();
                ui.heading("Pages");

                // Collect first to avoid borrowing issues while mutating below.
                let page_names: Vec<String> =
                    self.project.pages().iter().map(|p| p.name().to_owned()).collect();
                let current = self.project.current_index();

                let mut select: Option<usize> = None;
                let mut delete: Option<usize> = None;
                for (index, name) in page_names.iter().enumerate() {
                    ui.horizontal(|ui| {
                        if ui.selectable_label(current == Some(index), name).clicked() {
                            select = Some(index);
                        }
                        if ui.small_button("✕").clicked() {
                            delete = Some(index);
                        }
                    });
                }
                if let Some(index) = select {
                    self.project.select_page(index);
                }
                if let Some(index) = delete {
                    self.project.delete_page(index);
                }

                if page_names.is_empty() {
                    ui.label("Drop an image here to start.");
                }
            });
    }

    fn canvas_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(page) = self.project.current_page() else {
                ui.centered_and_justified(|ui| {
                    ui.label("Import an image to begin masking.");
                });
                return;
            };
            let (canvas_w, canvas_h) = (page.image().width(), page.image().height());
            let display_size = vec2(canvas_w, canvas_h) * self.zoom;

            egui::ScrollArea::both().show(ui, |ui| {
                let (response, painter) = ui.allocate_painter(display_size, Sense::click_and_drag());
                let xf = CanvasTransform::new(response.rect, canvas_w, canvas_h);

                let (pressed, released) = ctx.input(|i| {
                    (i.pointer.primary_pressed(), i.pointer.primary_released())
                });

                if let Some(pointer) = response.interact_pointer_pos() {
                    let image_pos = xf.to_image(pointer);
                    if let Some((page, history)) = self.project.page_and_history_mut() {
                        if pressed {
                            self.controller.pointer_down(image_pos, page, &self.settings);
                        } else if released {
                            if let Err(err) =
                                self.controller.pointer_up(image_pos, page, history, &self.settings)
                            {
                                log::warn!("commit failed: {err}");
                            }
                        } else if response.dragged() {
                            self.controller.pointer_move(image_pos, page, &self.settings);
                        }
                    }
                }

                if let Some(page) = self.project.current_page_mut() {
                    let name = page_texture_name(page);
                    let texture = page.image_mut().texture(ctx, &name).clone();
                    let page = &*page;
                    self.renderer.render(
                        &painter,
                        &texture,
                        page,
                        &self.settings,
                        self.controller.preview(),
                        &xf,
                    );
                }
            });
        });
    }
}

fn page_texture_name(page: &Page) -> String {
    format!("page-{}", page.id())
}

/// Decode an imported image into a page via the `image` crate.
pub fn load_page_from_bytes(name: &str, bytes: &[u8]) -> Result<Page, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice());
    Ok(Page::new(name, color_image))
}

impl eframe::App for StudymaskApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_detection();
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);
        self.track_touches(ctx);

        self.side_panel(ctx);
        self.canvas_panel(ctx);

        if self.pending_detection.is_some() {
            // Keep polling while the collaborator works.
            ctx.request_repaint();
        }
    }
}
