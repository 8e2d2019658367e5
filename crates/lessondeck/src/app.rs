use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use eframe::egui;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::activity::LevelBoard;
use crate::config::Config;
use crate::deck::{Align, Deck};
use crate::layout;
use crate::presenter::{InputBlocker, NavKey, OnComplete, Presenter};
use crate::render::image_cache::{ImageCache, WithImages};
use crate::render::slide::{self, NavButton, NavLayout};
use crate::render::text;
use crate::render::{Canvas, PainterMeasure};
use crate::store::{
    ACHIEVEMENTS_STORE, AchievementRecord, CompletionOutcome, JsonFileStore, MemoryStore,
    PROGRESS_STORE, ProgressRecord, Store, record_completion,
};
use crate::theme::Theme;

/// Activity every level board tracks for its slide deck.
pub const SLIDES_ACTIVITY: &str = "slides";

/// Level used for the activity board when neither the deck nor the CLI name one.
const PRACTICE_LEVEL: &str = "practice";

const TOAST_SECONDS: f32 = 1.5;
const TOAST_FADE_START: f32 = 1.0;

/// Longest frame step fed to animations, so a stalled frame does not skip
/// a whole transition.
const MAX_FRAME_DT: f32 = 0.1;

/// Blocks the app's own shortcuts while slides are on screen.
struct HostInput {
    blocked: Rc<Cell<bool>>,
}

impl InputBlocker for HostInput {
    fn set_blocked(&mut self, blocked: bool) {
        debug!(blocked, "host input");
        self.blocked.set(blocked);
    }
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        if elapsed < TOAST_FADE_START {
            1.0
        } else if elapsed < TOAST_SECONDS {
            1.0 - (elapsed - TOAST_FADE_START) / (TOAST_SECONDS - TOAST_FADE_START)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_SECONDS
    }
}

/// What the screen shows once the slides are gone.
#[derive(Debug, Clone, PartialEq)]
enum Ending {
    Completed(Vec<String>),
    Closed,
}

/// What one painted frame leaves behind for the next frame's pointer input.
struct FrameOutput {
    canvas: Canvas,
    triggers: Vec<(usize, egui::Rect)>,
    overflow: Option<(u64, usize, usize)>,
}

pub struct LessonApp {
    theme: Theme,
    presenter: Presenter,
    image_cache: ImageCache,
    completed: Rc<Cell<bool>>,
    host_blocked: Rc<Cell<bool>>,
    level: Option<String>,
    board: LevelBoard,
    progress: Box<dyn Store<ProgressRecord>>,
    achievements: Box<dyn Store<AchievementRecord>>,
    ending: Option<Ending>,
    last_canvas: Option<Canvas>,
    last_triggers: Vec<(usize, egui::Rect)>,
    hovered_nav: Option<NavButton>,
    warned_generation: Option<u64>,
    toast: Option<Toast>,
}

impl LessonApp {
    #[allow(clippy::too_many_arguments)]
    fn new(
        deck: Arc<Deck>,
        theme: Theme,
        presenter: Presenter,
        image_cache: ImageCache,
        level: Option<String>,
        progress: Box<dyn Store<ProgressRecord>>,
        achievements: Box<dyn Store<AchievementRecord>>,
        start_slide: Option<usize>,
    ) -> Self {
        let mut board = LevelBoard::new(level.as_deref().unwrap_or(PRACTICE_LEVEL));
        if let Err(e) = board.register(SLIDES_ACTIVITY).start() {
            warn!(error = %e, "could not start slides activity");
        }

        let mut app = Self {
            theme,
            presenter,
            image_cache,
            completed: Rc::new(Cell::new(false)),
            host_blocked: Rc::new(Cell::new(false)),
            level,
            board,
            progress,
            achievements,
            ending: None,
            last_canvas: None,
            last_triggers: Vec::new(),
            hovered_nav: None,
            warned_generation: None,
            toast: None,
        };

        let blocker = HostInput {
            blocked: Rc::clone(&app.host_blocked),
        };
        let on_complete = app.completion_callback();
        app.presenter
            .show(deck, Some(on_complete), Some(Box::new(blocker)));
        if let Some(n) = start_slide {
            app.presenter.jump_to(n.saturating_sub(1));
        }
        app
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    fn cycle_transition(&mut self) {
        let kind = self.presenter.settings().kind.cycled();
        self.presenter.set_transition_kind(kind);
        self.toast = Some(Toast::new(format!("Transition: {}", kind.name())));
    }

    fn completion_callback(&self) -> OnComplete {
        let completed = Rc::clone(&self.completed);
        Box::new(move || completed.set(true))
    }

    /// Show the deck again. After completion this is a review and the
    /// completion screen returns when it ends; a deck closed early can
    /// still be completed.
    fn review(&mut self) {
        let reopened = match self.ending {
            Some(Ending::Completed(_)) => self.presenter.reopen(),
            Some(Ending::Closed) | None => {
                let on_complete = self.completion_callback();
                self.presenter.reopen_with(Some(on_complete))
            }
        };
        if reopened {
            self.warned_generation = None;
        }
    }

    /// Completion hand-off: finish the slides activity and persist the level.
    fn finish_level(&mut self) {
        match self.board.activity_mut(SLIDES_ACTIVITY) {
            Ok(activity) if !activity.is_complete() => {
                if let Err(e) = activity.complete() {
                    warn!(error = %e, "could not complete slides activity");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "slides activity missing"),
        }

        let outcome = match self.level.as_deref() {
            Some(level) => {
                match record_completion(
                    self.progress.as_ref(),
                    self.achievements.as_ref(),
                    level,
                    Utc::now(),
                ) {
                    Ok(outcome) => {
                        info!(level, newly = outcome.newly_completed, "level recorded");
                        Some(outcome)
                    }
                    Err(e) => {
                        warn!(level, error = %e, "could not record progress");
                        None
                    }
                }
            }
            None => None,
        };

        self.ending = Some(Ending::Completed(completion_lines(
            self.level.as_deref(),
            outcome.as_ref(),
        )));
    }

    fn handle_pointer(&mut self, ctx: &egui::Context) {
        let (pos, clicked) = ctx.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.button_pressed(egui::PointerButton::Primary),
            )
        });

        if !self.presenter.is_showing() {
            self.hovered_nav = None;
            return;
        }

        self.presenter
            .hover(pos.and_then(|p| trigger_at(&self.last_triggers, p)));

        let Some(canvas) = self.last_canvas else {
            return;
        };
        self.hovered_nav = pos.and_then(|p| NavLayout::standard().hit(canvas.to_canvas(p)));
        if clicked {
            match self.hovered_nav {
                Some(NavButton::Next) => {
                    self.presenter.next();
                }
                Some(NavButton::Back) => {
                    self.presenter.back();
                }
                None => {}
            }
        }
    }

    fn draw_slides(&self, ui: &egui::Ui, canvas: &Canvas) -> FrameOutput {
        let mut output = FrameOutput {
            canvas: *canvas,
            triggers: Vec::new(),
            overflow: None,
        };
        let (Some(current), Some(view)) = (self.presenter.current_slide(), self.presenter.view())
        else {
            return output;
        };

        let text_measure = PainterMeasure::new(ui.painter(), canvas.scale);
        let measurer = WithImages::new(&text_measure, &self.image_cache);
        let slide_layout = layout::layout_slide(&current.elements, &self.theme, &measurer);
        if slide_layout.overflowed() {
            output.overflow = Some((view.generation, view.index, slide_layout.pinned_count()));
        }

        let alpha = self.presenter.container_alpha();
        let offset = self.presenter.container_offset();
        slide::draw_background(ui, canvas, current);
        output.triggers = slide::render_slide(
            ui,
            canvas,
            &self.theme,
            current,
            &slide_layout,
            &view.tooltip,
            &self.image_cache,
            alpha,
            offset,
        );

        if let Some(indicator) = self.presenter.indicator() {
            slide::draw_nav(
                ui,
                canvas,
                &self.theme,
                &indicator,
                self.presenter.next_label(),
                self.presenter.back_enabled(),
                self.hovered_nav,
            );
        }

        slide::draw_tooltip_layer(
            ui,
            canvas,
            &self.theme,
            current,
            &slide_layout,
            &view.tooltip,
            &measurer,
            &self.image_cache,
            alpha,
            offset,
        );
        output
    }

    fn draw_ending(&self, ui: &egui::Ui, canvas: &Canvas) {
        let (heading, lines): (&str, &[String]) = match &self.ending {
            Some(Ending::Completed(lines)) => ("Slides complete", lines.as_slice()),
            Some(Ending::Closed) => ("Slides closed", [].as_slice()),
            None => return,
        };

        let theme = &self.theme;
        let width = layout::CONTENT_WIDTH;
        let left = layout::CONTENT_LEFT;
        let mut y = 220.0;
        let rect = text::paint_text(
            ui,
            canvas,
            heading,
            egui::pos2(left, y),
            theme.title_size,
            true,
            theme.heading_color,
            width,
            Align::Center,
        );
        y = rect.bottom() + 30.0;

        for line in lines {
            let rect = text::paint_text(
                ui,
                canvas,
                line,
                egui::pos2(left, y),
                theme.body_size,
                false,
                theme.foreground,
                width,
                Align::Center,
            );
            y = rect.bottom() + 12.0;
        }

        text::paint_text(
            ui,
            canvas,
            "S  review slides     Q  quit",
            egui::pos2(left, y + 40.0),
            theme.table_size,
            false,
            theme.muted,
            width,
            Align::Center,
        );
    }

    fn draw_toast(&self, ui: &egui::Ui, ctx: &egui::Context, rect: egui::Rect, scale: f32) {
        let Some(ref toast) = self.toast else {
            return;
        };
        let opacity = toast.opacity();
        if opacity <= 0.0 {
            return;
        }
        let color = Theme::with_opacity(self.theme.foreground, opacity * 0.9);
        let background = Theme::with_opacity(self.theme.panel_background, opacity * 0.9);
        let galley = ui.painter().layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(20.0 * scale),
            color,
        );
        let padding = 16.0 * scale;
        let toast_rect = egui::Rect::from_min_size(
            egui::pos2(
                rect.center().x - galley.rect.width() / 2.0 - padding,
                rect.top() + 24.0 * scale,
            ),
            egui::vec2(
                galley.rect.width() + padding * 2.0,
                galley.rect.height() + padding * 2.0,
            ),
        );
        ui.painter().rect_filled(toast_rect, 8.0 * scale, background);
        ui.painter().galley(
            egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding),
            galley,
            color,
        );
        ctx.request_repaint();
    }
}

impl eframe::App for LessonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Collect viewport commands to send after the input closure
        // (sending inside ctx.input() deadlocks).
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let host_blocked = self.host_blocked.get();

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }
            if i.key_pressed(egui::Key::D) {
                self.toggle_theme();
            }
            if i.key_pressed(egui::Key::T) {
                self.cycle_transition();
            }

            if self.presenter.is_showing() {
                if i.key_pressed(egui::Key::ArrowRight)
                    || i.key_pressed(egui::Key::Space)
                    || i.key_pressed(egui::Key::Enter)
                {
                    self.presenter.key(NavKey::Next);
                }
                if i.key_pressed(egui::Key::ArrowLeft) {
                    self.presenter.key(NavKey::Back);
                }
                if i.key_pressed(egui::Key::Escape) {
                    self.presenter.hide();
                    self.ending = Some(Ending::Closed);
                }
            } else if !host_blocked && i.key_pressed(egui::Key::S) {
                self.review();
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        self.handle_pointer(ctx);

        let dt = ctx.input(|i| i.stable_dt).min(MAX_FRAME_DT);
        self.presenter.tick(dt);

        if self.completed.replace(false) {
            self.finish_level();
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        let bg = self.theme.background;
        let output = egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                let canvas = Canvas::fit(rect);

                let output = if self.presenter.is_showing() {
                    self.draw_slides(ui, &canvas)
                } else {
                    self.draw_ending(ui, &canvas);
                    FrameOutput {
                        canvas,
                        triggers: Vec::new(),
                        overflow: None,
                    }
                };
                self.draw_toast(ui, ctx, rect, canvas.scale);
                output
            })
            .inner;

        if let Some((generation, index, pinned)) = output.overflow {
            if self.warned_generation != Some(generation) {
                warn!(slide = index + 1, pinned, "slide content overflows the content area");
                self.warned_generation = Some(generation);
            }
        }
        self.last_canvas = Some(output.canvas);
        self.last_triggers = output.triggers;

        let animating = self.presenter.is_transitioning()
            || self
                .presenter
                .view()
                .is_some_and(|v| v.tooltip.is_animating());
        if animating {
            ctx.request_repaint();
        }
    }
}

/// Index of the tooltip trigger under `pos`, if any.
fn trigger_at(triggers: &[(usize, egui::Rect)], pos: egui::Pos2) -> Option<usize> {
    triggers
        .iter()
        .find(|(_, rect)| rect.contains(pos))
        .map(|(index, _)| *index)
}

fn completion_lines(level: Option<&str>, outcome: Option<&CompletionOutcome>) -> Vec<String> {
    let mut lines = Vec::new();
    match (level, outcome) {
        (Some(level), Some(outcome)) => {
            if outcome.newly_completed {
                lines.push(format!("{level} completed"));
            } else {
                lines.push(format!("{level} was already complete"));
            }
            if let Some(next) = outcome.unlocked {
                lines.push(format!("Unlocked {next}"));
            }
            if let Some(id) = &outcome.achievement {
                lines.push(format!("Achievement earned: {id}"));
            }
        }
        (Some(level), None) => lines.push(format!("Progress for {level} could not be saved")),
        (None, _) => {}
    }
    lines
}

/// File-backed store, or an in-memory one when no data directory exists.
fn open_store<T>(name: &str) -> Box<dyn Store<T>>
where
    T: Serialize + DeserializeOwned + Default + 'static,
{
    match JsonFileStore::<T>::named(name) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(store = name, error = %e, "progress will not persist");
            Box::new(MemoryStore::<T>::default())
        }
    }
}

pub fn run(
    file: PathBuf,
    windowed: bool,
    start_slide: Option<usize>,
    level: Option<String>,
) -> anyhow::Result<()> {
    let deck = Deck::load(&file)?;
    if deck.is_empty() {
        anyhow::bail!("No slides found in {}", file.display());
    }
    let base_path = file
        .parent()
        .unwrap_or(std::path::Path::new("."))
        .to_path_buf();

    let title = deck.display_title().map(str::to_string).unwrap_or_else(|| {
        format!(
            "lessondeck - {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        )
    });
    let level = level.or_else(|| deck.level.clone());

    let config = Config::load_or_default();
    let theme = Theme::from_name(config.theme_name());
    let settings = config.transition_settings();

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let deck = Arc::new(deck);
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(LessonApp::new(
                deck,
                theme,
                Presenter::new(settings),
                ImageCache::new(base_path),
                level,
                open_store(PROGRESS_STORE),
                open_store(ACHIEVEMENTS_STORE),
                start_slide,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
