use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use eframe::egui;
use trace_browser_core::model::{ThreadRegistry, TraceEvent, TraceLog};
use trace_browser_core::parsers::{self, Ingested, LoadOptions};
use trace_browser_core::scroll::ScrollController;
use trace_browser_core::views::{WindowStyle, render_window, row_at, rows_that_fit, status_line};
use trace_browser_protocol::{self as protocol, RenderCommand, ThemeToken, Viewport};

use crate::renderer;
use crate::theme::{self, ThemeMode};

/// A loaded trace and the viewport shared by all of its views.
struct LoadedTrace {
    path: PathBuf,
    log: TraceLog,
    registry: ThreadRegistry,
    controller: ScrollController,
    rejected: usize,
}

impl LoadedTrace {
    fn new(path: PathBuf, ingested: Ingested, dirty: &Rc<Cell<bool>>) -> Self {
        let Ingested { log, rejected } = ingested;
        let registry = ThreadRegistry::build(&log);
        let mut controller = ScrollController::new(log.len());
        let flag = Rc::clone(dirty);
        controller.subscribe(move |_, _| flag.set(true));
        Self {
            path,
            log,
            registry,
            controller,
            rejected: rejected.len(),
        }
    }
}

/// Main application state.
pub struct TraceBrowserApp {
    trace: Option<LoadedTrace>,
    options: LoadOptions,
    style: WindowStyle,
    theme_mode: ThemeMode,
    /// Raised by viewport notifications; the cached commands are stale.
    dirty: Rc<Cell<bool>>,
    commands: Vec<RenderCommand>,
    /// Canvas size the cached commands were rendered for.
    commands_size: egui::Vec2,
    /// Fractional rows of wheel movement not yet applied.
    wheel_rows: f32,
    error: Option<String>,
}

impl TraceBrowserApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        initial: Option<(PathBuf, Ingested)>,
        options: LoadOptions,
    ) -> Self {
        let theme_mode = ThemeMode::default();
        cc.egui_ctx.set_visuals(theme_mode.visuals());

        let dirty = Rc::new(Cell::new(true));
        let trace = initial.map(|(path, ingested)| LoadedTrace::new(path, ingested, &dirty));

        Self {
            trace,
            options,
            style: WindowStyle::default(),
            theme_mode,
            dirty,
            commands: Vec::new(),
            commands_size: egui::Vec2::ZERO,
            wheel_rows: 0.0,
            error: None,
        }
    }

    fn load_trace(&mut self, path: &Path) {
        match parsers::load_trace_file(path, &self.options) {
            Ok(ingested) => {
                self.trace = Some(LoadedTrace::new(path.to_path_buf(), ingested, &self.dirty));
                self.dirty.set(true);
                self.wheel_rows = 0.0;
                self.error = None;
            }
            Err(e) => {
                let e = anyhow::Error::new(e);
                tracing::error!(error = %format!("{e:#}"), "failed to load trace");
                self.error = Some(format!("{e:#}"));
            }
        }
    }

    fn ensure_commands(&mut self, size: egui::Vec2) {
        let Some(trace) = &self.trace else {
            return;
        };
        if !self.dirty.replace(false) && size == self.commands_size {
            return;
        }
        self.commands_size = size;
        self.commands = render_window(
            &trace.log,
            &trace.registry,
            &trace.controller.state(),
            &Viewport::new(f64::from(size.x), f64::from(size.y)),
            &self.style,
        );
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("trace-browser");
                ui.separator();

                if ui.button("Open").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Trace", &["jsonl", "json", "log"])
                        .pick_file()
                    {
                        self.load_trace(&path);
                    }
                }

                ui.separator();

                let theme_label = match self.theme_mode {
                    ThemeMode::Dark => "Dark",
                    ThemeMode::Light => "Light",
                };
                if ui.button(theme_label).clicked() {
                    self.theme_mode = self.theme_mode.toggled();
                    ctx.set_visuals(self.theme_mode.visuals());
                }

                if let Some(trace) = &self.trace {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(trace.path.display().to_string());
                    });
                }
            });
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(err) = &self.error {
                    ui.colored_label(theme::resolve(ThemeToken::ErrorText, self.theme_mode), err);
                } else if let Some(trace) = &self.trace {
                    let mut line =
                        status_line(&trace.log, &trace.registry, &trace.controller.state());
                    if trace.rejected > 0 {
                        line.push_str(&format!(" | {} lines skipped", trace.rejected));
                    }
                    ui.colored_label(theme::resolve(ThemeToken::StatusText, self.theme_mode), line);
                } else {
                    ui.label("No trace loaded. Click Open or drop a file");
                }
            });
        });
    }

    fn handle_navigation(&mut self, ui: &egui::Ui, hovered: bool) {
        let Some(trace) = &mut self.trace else {
            return;
        };
        let page = trace.controller.window_size() as i64;
        let (step, home, end, wheel) = ui.input(|i| {
            let mut step = 0i64;
            if i.key_pressed(egui::Key::ArrowUp) {
                step -= 1;
            }
            if i.key_pressed(egui::Key::ArrowDown) {
                step += 1;
            }
            if i.key_pressed(egui::Key::PageUp) {
                step -= page;
            }
            if i.key_pressed(egui::Key::PageDown) {
                step += page;
            }
            let wheel = if hovered { i.smooth_scroll_delta.y } else { 0.0 };
            (
                step,
                i.key_pressed(egui::Key::Home),
                i.key_pressed(egui::Key::End),
                wheel,
            )
        });

        if home {
            trace.controller.set_scroll_position(0);
        }
        if end {
            trace.controller.set_scroll_position(trace.log.len() as i64);
        }
        if step != 0 {
            trace.controller.scroll_by(step);
        }

        let row_height = self.style.metrics.row_height() as f32;
        let rows = take_wheel_rows(&mut self.wheel_rows, wheel, row_height);
        if rows != 0 {
            trace.controller.scroll_by(rows);
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_rect_before_wrap();
        let Some(trace) = &mut self.trace else {
            ui.centered_and_justified(|ui| {
                ui.heading("Drop a JSON-Lines trace here or click Open");
            });
            return;
        };

        let layout = self.style.layout(
            protocol::Rect::new(0.0, 0.0, f64::from(available.width()), f64::from(available.height())),
            trace.registry.len(),
        );
        trace
            .controller
            .set_window_size(rows_that_fit(f64::from(available.height()), &self.style.metrics));

        let to_screen = |r: protocol::Rect| {
            egui::Rect::from_min_size(
                available.min + egui::vec2(r.x as f32, r.y as f32),
                egui::vec2(r.w as f32, r.h as f32),
            )
        };

        // Timeline: press jumps, dragging follows the pointer even past
        // the strip's edges.
        let timeline_rect = to_screen(layout.timeline);
        let timeline = ui.interact(
            timeline_rect,
            ui.id().with("timeline"),
            egui::Sense::click_and_drag(),
        );
        let pointer = timeline.interact_pointer_pos();
        match pointer {
            Some(pos) if timeline.is_pointer_button_down_on() => {
                let y = f64::from(pos.y - timeline_rect.top());
                let height = f64::from(timeline_rect.height());
                if trace.controller.is_dragging() {
                    trace.controller.drag(y, height);
                } else {
                    trace.controller.press(y, height);
                }
            }
            _ if trace.controller.is_dragging() => trace.controller.release(),
            _ => {}
        }

        let lists_rect = egui::Rect::from_min_max(
            available.min,
            egui::pos2(timeline_rect.left(), available.bottom()),
        );
        let lists = ui.interact(lists_rect, ui.id().with("lists"), egui::Sense::hover());
        self.handle_navigation(ui, ui.rect_contains_pointer(available));

        self.ensure_commands(available.size());

        let mut painter = ui.painter_at(available);
        let bg = theme::resolve(ThemeToken::Background, self.theme_mode);
        painter.rect_filled(available, egui::CornerRadius::ZERO, bg);
        renderer::render_commands(&mut painter, &self.commands, available.min, self.theme_mode);

        let Some(trace) = &self.trace else {
            return;
        };
        let Some(pos) = lists.hover_pos() else {
            return;
        };
        let row_height = self.style.metrics.row_height();
        let hovered = layout
            .lists
            .iter()
            .zip(trace.registry.threads())
            .map(|(r, thread)| (to_screen(*r), thread))
            .find(|(r, _)| r.contains(pos))
            .and_then(|(rect, thread)| {
                let y = f64::from(pos.y - rect.top());
                row_at(
                    &trace.log,
                    thread,
                    trace.controller.scroll_position(),
                    y,
                    f64::from(rect.height()),
                    &self.style.metrics,
                )
                .map(|index| (rect, (y / row_height).floor(), index))
            });

        if let Some((rect, row, index)) = hovered {
            let top = rect.top() + (row * row_height) as f32;
            let row_rect = egui::Rect::from_min_size(
                egui::pos2(rect.left(), top),
                egui::vec2(rect.width(), row_height as f32),
            )
            .intersect(rect);
            painter.rect_filled(
                row_rect,
                egui::CornerRadius::ZERO,
                theme::resolve(ThemeToken::HoverHighlight, self.theme_mode),
            );
            if let Some(event) = trace.log.get(index) {
                let details = event_details(event);
                lists.on_hover_ui_at_pointer(|ui| {
                    ui.monospace(details);
                });
            }
        }
    }
}

/// Convert a wheel delta in points into whole rows, carrying the remainder
/// in `pending`. Scrolling the content up moves the lists forward.
fn take_wheel_rows(pending: &mut f32, delta: f32, row_height: f32) -> i64 {
    if delta.abs() <= 0.1 || row_height <= 0.0 {
        return 0;
    }
    *pending -= delta / row_height;
    let whole = pending.trunc();
    *pending -= whole;
    whole as i64
}

/// Multi-line description of one event for the hover tooltip.
pub fn event_details(event: &TraceEvent) -> String {
    let mut out = format!(
        "#{} {}\nthread {}\n{}:{}",
        event.sequence_index, event.kind, event.thread, event.filename, event.line_number
    );
    if let Some(name) = &event.function_name {
        out.push_str(&format!("\nfunction {name}"));
    }
    out.push_str(&format!("\ndepth {}", event.depth));
    out
}

impl eframe::App for TraceBrowserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.load_trace(&path);
        }

        self.toolbar(ctx);
        self.status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));
    }
}
