use std::path::{Path, PathBuf};

use eframe::egui;
use tracing::warn;

use crate::config::Config;
use crate::deck::Deck;
use crate::layout;
use crate::render::image_cache::{ImageCache, WithImages};
use crate::render::slide;
use crate::render::{Canvas, PainterMeasure};
use crate::theme::Theme;
use crate::tooltip::TooltipOverlay;

struct ExportApp {
    deck: Deck,
    theme: Theme,
    image_cache: ImageCache,
    output_dir: PathBuf,
    current_slide: usize,
    screenshot_requested: bool,
    done: bool,
}

impl ExportApp {
    fn new(deck: Deck, theme: Theme, base_path: &Path, output_dir: PathBuf) -> Self {
        Self {
            deck,
            theme,
            image_cache: ImageCache::new(base_path.to_path_buf()),
            output_dir,
            current_slide: 0,
            screenshot_requested: false,
            done: false,
        }
    }
}

impl eframe::App for ExportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.done {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // The screenshot requested last frame arrives as an input event.
        let mut got_screenshot = false;
        ctx.input(|i| {
            for event in &i.events {
                if let egui::Event::Screenshot { image, .. } = event {
                    let path = self.output_dir.join(slide_filename(self.current_slide));
                    save_color_image(image, &path);
                    got_screenshot = true;
                }
            }
        });

        if got_screenshot {
            self.screenshot_requested = false;
            self.current_slide += 1;
            if self.current_slide >= self.deck.len() {
                self.done = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                return;
            }
        }

        let bg = self.theme.background;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                let canvas = Canvas::fit(rect);

                if let Some(current) = self.deck.slides.get(self.current_slide) {
                    let text_measure = PainterMeasure::new(ui.painter(), canvas.scale);
                    let measurer = WithImages::new(&text_measure, &self.image_cache);
                    let slide_layout =
                        layout::layout_slide(&current.elements, &self.theme, &measurer);
                    slide::draw_background(ui, &canvas, current);
                    slide::render_slide(
                        ui,
                        &canvas,
                        &self.theme,
                        current,
                        &slide_layout,
                        &TooltipOverlay::default(),
                        &self.image_cache,
                        1.0,
                        0.0,
                    );
                }
            });

        if !self.screenshot_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
            self.screenshot_requested = true;
        }

        ctx.request_repaint();
    }
}

pub fn slide_filename(index: usize) -> String {
    format!("slide-{:02}.png", index + 1)
}

fn save_color_image(image: &egui::ColorImage, path: &Path) {
    let width = image.width() as u32;
    let height = image.height() as u32;
    let pixels: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|c| [c.r(), c.g(), c.b(), c.a()])
        .collect();

    match image::save_buffer(path, &pixels, width, height, image::ColorType::Rgba8) {
        Ok(()) => eprintln!("  Saved {}", path.display()),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to save slide"),
    }
}

pub fn run(file: PathBuf, output_dir: PathBuf, width: u32, height: u32) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let deck = Deck::load(&file)?;
    if deck.is_empty() {
        anyhow::bail!("No slides found in {}", file.display());
    }

    let base_path = file
        .parent()
        .unwrap_or(std::path::Path::new("."))
        .to_path_buf();
    std::fs::create_dir_all(&output_dir)?;

    eprintln!(
        "Exporting {} slides to {} ({}x{})",
        deck.len(),
        output_dir.display(),
        width,
        height,
    );

    let title = deck
        .display_title()
        .map(str::to_string)
        .unwrap_or_else(|| "lessondeck export".to_string());
    let theme = Theme::from_name(Config::load_or_default().theme_name());

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([width as f32, height as f32])
        .with_title(&title)
        .with_decorations(false);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let output_dir_clone = output_dir.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(ExportApp::new(
                deck,
                theme,
                &base_path,
                output_dir_clone,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    eprintln!("Export complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_filenames_sort() {
        assert_eq!(slide_filename(0), "slide-01.png");
        assert_eq!(slide_filename(11), "slide-12.png");
    }
}
