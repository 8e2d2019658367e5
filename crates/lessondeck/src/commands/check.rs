use anyhow::Result;
use colored::Colorize;
use eframe::egui::pos2;
use std::path::Path;

use crate::config::Config;
use crate::deck::{Deck, Element};
use crate::layout::{
    CONTENT_LEFT, CONTENT_TOP, CURSOR_CEILING, EstimateMeasure, FlowArea, TextMeasure,
    layout_elements,
};
use crate::render::image_cache::{ImageCache, WithImages};
use crate::theme::Theme;

/// Layout findings for one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideReport {
    pub index: usize,
    pub title: String,
    pub natural_bottom: f32,
    pub overflowed: bool,
    /// Pinned elements as (element index, type name).
    pub pinned: Vec<(usize, &'static str)>,
    pub unsupported: Vec<usize>,
    pub missing_images: Vec<String>,
}

impl SlideReport {
    pub fn is_clean(&self) -> bool {
        !self.overflowed && self.unsupported.is_empty() && self.missing_images.is_empty()
    }
}

pub fn check_deck(
    deck: &Deck,
    theme: &Theme,
    measurer: &dyn TextMeasure,
    width: f32,
    images: &ImageCache,
) -> Vec<SlideReport> {
    let measurer = WithImages::new(measurer, images);
    let area = FlowArea {
        origin: pos2(CONTENT_LEFT, CONTENT_TOP),
        width,
        ceiling: CURSOR_CEILING,
    };

    deck.slides
        .iter()
        .enumerate()
        .map(|(index, slide)| {
            let layout = layout_elements(&slide.elements, theme, &measurer, area);
            let pinned = layout
                .placements
                .iter()
                .filter(|p| p.pinned)
                .map(|p| (p.index, slide.elements[p.index].type_name()))
                .collect();
            let unsupported = slide
                .elements
                .iter()
                .enumerate()
                .filter(|(_, e)| matches!(e, Element::Unsupported))
                .map(|(i, _)| i)
                .collect();
            let missing_images = slide
                .elements
                .iter()
                .filter_map(|e| match e {
                    Element::Image { path, .. } if !images.resolve(path).exists() => {
                        Some(path.clone())
                    }
                    _ => None,
                })
                .collect();

            SlideReport {
                index,
                title: slide.title.clone(),
                natural_bottom: layout.natural_bottom,
                overflowed: layout.overflowed(),
                pinned,
                unsupported,
                missing_images,
            }
        })
        .collect()
}

pub fn run(file: &Path, width: f32, strict: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let deck = Deck::load(file)?;
    if deck.is_empty() {
        println!("{}", "Deck has no slides.".yellow());
        return Ok(());
    }

    let config = Config::load_or_default();
    let theme = Theme::from_name(config.theme_name());
    let base_path = file.parent().unwrap_or(Path::new(".")).to_path_buf();
    let images = ImageCache::new(base_path);
    let reports = check_deck(&deck, &theme, &EstimateMeasure::default(), width, &images);

    println!(
        "Checking {} slide(s) in {}",
        reports.len(),
        file.display()
    );
    for report in &reports {
        let label = format!("{:>3}. {}", report.index + 1, report.title);
        if report.is_clean() {
            println!("{}  {}", "ok".green(), label);
            continue;
        }
        println!("{}  {}", "!!".yellow().bold(), label);
        if report.overflowed {
            println!(
                "      content ends at y={:.0}, past the limit of {:.0}",
                report.natural_bottom, CURSOR_CEILING
            );
            for (i, kind) in &report.pinned {
                println!("      element {} ({kind}) pinned to the bottom", i + 1);
            }
        }
        for i in &report.unsupported {
            println!("      element {} has an unsupported type and is skipped", i + 1);
        }
        for path in &report.missing_images {
            println!("      image not found: {path}");
        }
    }

    let overflowing = reports.iter().filter(|r| r.overflowed).count();
    if overflowing == 0 {
        println!("{}", "All slides fit.".green().bold());
    } else {
        println!(
            "{}",
            format!("{overflowing} slide(s) overflow the content area.").yellow()
        );
        if strict {
            anyhow::bail!("{overflowing} slide(s) overflow");
        }
    }
    Ok(())
}
