//! Paints one slide: header, flowed elements, navigation chrome and the
//! tooltip layer. Positions come from [`crate::layout`]; nothing here
//! computes heights.

use eframe::egui::{self, Color32, Pos2, Rect, Stroke, pos2, vec2};

use crate::deck::{Align, Element, Slide};
use crate::layout::{
    self, BULLET_SPACING, CANVAS_WIDTH, CONTENT_LEFT, CONTENT_WIDTH, Placement, SlideLayout,
    TextMeasure,
};
use crate::render::Canvas;
use crate::render::diagram;
use crate::render::image_cache::ImageCache;
use crate::render::text;
use crate::theme::{Theme, parse_hex_color};
use crate::tooltip::{self, PanelLayout, TooltipContent, TooltipOverlay};

pub const NAV_TOP: f32 = 640.0;
pub const NAV_BUTTON_WIDTH: f32 = 132.0;
pub const NAV_BUTTON_HEIGHT: f32 = 44.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavButton {
    Back,
    Next,
}

/// Canvas geometry of the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavLayout {
    pub back: Rect,
    pub next: Rect,
    pub indicator: Pos2,
}

impl NavLayout {
    pub fn standard() -> Self {
        let size = vec2(NAV_BUTTON_WIDTH, NAV_BUTTON_HEIGHT);
        Self {
            back: Rect::from_min_size(pos2(CONTENT_LEFT, NAV_TOP), size),
            next: Rect::from_min_size(
                pos2(CONTENT_LEFT + CONTENT_WIDTH - NAV_BUTTON_WIDTH, NAV_TOP),
                size,
            ),
            indicator: pos2(CANVAS_WIDTH / 2.0, NAV_TOP + NAV_BUTTON_HEIGHT / 2.0),
        }
    }

    /// Button under canvas point `p`.
    pub fn hit(&self, p: Pos2) -> Option<NavButton> {
        if self.back.contains(p) {
            Some(NavButton::Back)
        } else if self.next.contains(p) {
            Some(NavButton::Next)
        } else {
            None
        }
    }
}

/// Fill the canvas with the slide's background color, if it sets one.
pub fn draw_background(ui: &egui::Ui, canvas: &Canvas, slide: &Slide) {
    if let Some(color) = slide.background_color.as_deref().and_then(parse_hex_color) {
        ui.painter().rect_filled(canvas.bounds(), 0.0, color);
    }
}

/// Draw the header and every element except an active tooltip trigger,
/// which [`draw_tooltip_layer`] paints above the dimming layer.
///
/// Returns the screen rects of tooltip triggers, keyed by element index.
#[allow(clippy::too_many_arguments)]
pub fn render_slide(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    slide: &Slide,
    layout: &SlideLayout,
    overlay: &TooltipOverlay,
    image_cache: &ImageCache,
    container_alpha: f32,
    container_offset: f32,
) -> Vec<(usize, Rect)> {
    let shifted = canvas.shifted(container_offset);
    text::draw_header(ui, &shifted, theme, &slide.title, container_alpha);

    let raised = overlay.is_visible().then(|| overlay.active()).flatten();
    let mut triggers = Vec::new();
    for placement in &layout.placements {
        let Some(element) = slide.elements.get(placement.index) else {
            continue;
        };
        if raised == Some(placement.index) {
            if element.is_tooltip() {
                let rect = trigger_rect(placement);
                triggers.push((placement.index, shifted.rect_to_screen(rect)));
            }
            continue;
        }
        let opacity = container_alpha * overlay.element_alpha(placement.index);
        if let Some(rect) =
            draw_element(ui, &shifted, theme, element, placement, image_cache, opacity)
        {
            triggers.push((placement.index, shifted.rect_to_screen(rect)));
        }
    }
    triggers
}

/// Hit area reserved for a trigger before it has been painted.
fn trigger_rect(placement: &Placement) -> Rect {
    Rect::from_min_size(placement.pos, vec2(placement.width, placement.height()))
}

/// Paint one element. Returns the trigger rect for tooltip elements.
pub fn draw_element(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    element: &Element,
    placement: &Placement,
    image_cache: &ImageCache,
    opacity: f32,
) -> Option<Rect> {
    let pos = placement.pos;
    let width = placement.width;
    let height = placement.height();

    match element {
        Element::Title { text } => {
            text::draw_title(ui, canvas, theme, text, pos, width, opacity);
        }
        Element::Paragraph { text, align } => {
            text::draw_paragraph(ui, canvas, theme, text, *align, pos, width, opacity);
        }
        Element::Bold { text, align } => {
            text::draw_bold(ui, canvas, theme, text, *align, pos, width, opacity);
        }
        Element::Bullet { items } => {
            text::draw_bullets(
                ui,
                canvas,
                theme,
                items,
                &placement.extent,
                pos,
                width,
                opacity,
            );
        }
        Element::Icon { icon, x, .. } => {
            let center_x = x.unwrap_or(pos.x + width / 2.0);
            text::draw_icon(ui, canvas, theme, icon, height, center_x, pos.y, opacity);
        }
        Element::Diagram { kind, .. } | Element::Graph { kind, .. } => {
            let area = Rect::from_min_size(pos, vec2(width, height));
            diagram::draw_illustration(ui, canvas, theme, kind, area, opacity);
        }
        Element::Image {
            path,
            x,
            width: image_width,
            ..
        } => {
            let size = layout::image_box(
                image_cache.natural_size(path),
                *image_width,
                Some(height),
                width,
            );
            let center_x = x.unwrap_or(pos.x + width / 2.0);
            let area = Rect::from_min_size(pos2(center_x - size.x / 2.0, pos.y), size);
            text::draw_image(ui, canvas, theme, image_cache, path, area, opacity);
        }
        Element::Tooltip { text, .. } => {
            return Some(text::draw_tooltip_trigger(
                ui, canvas, theme, text, pos, width, opacity,
            ));
        }
        Element::Table {
            headers,
            rows,
            width: table_width,
        } => {
            let w = table_width.unwrap_or(width).min(width);
            text::draw_table(ui, canvas, theme, headers, rows, pos, w, opacity);
        }
        Element::Spacer { .. } | Element::Unsupported => {}
    }
    None
}

#[allow(clippy::too_many_arguments)]
pub fn draw_nav(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    indicator: &str,
    next_label: &str,
    back_enabled: bool,
    hovered: Option<NavButton>,
) {
    let nav = NavLayout::standard();
    let button = |rect: Rect, label: &str, enabled: bool, hot: bool| {
        let fill = match (enabled, hot) {
            (false, _) => theme.button_disabled,
            (true, true) => Theme::with_opacity(theme.button_background, 0.85),
            (true, false) => theme.button_background,
        };
        ui.painter()
            .rect_filled(canvas.rect_to_screen(rect), canvas.px(10.0), fill);
        let text_size = theme.table_size;
        text::paint_text(
            ui,
            canvas,
            label,
            pos2(rect.left(), rect.center().y - text_size * 0.65),
            text_size,
            true,
            Color32::WHITE,
            rect.width(),
            Align::Center,
        );
    };

    button(
        nav.back,
        "Back",
        back_enabled,
        back_enabled && hovered == Some(NavButton::Back),
    );
    button(
        nav.next,
        next_label,
        true,
        hovered == Some(NavButton::Next),
    );

    let size = theme.table_size;
    text::paint_text(
        ui,
        canvas,
        indicator,
        pos2(nav.indicator.x - 100.0, nav.indicator.y - size * 0.65),
        size,
        false,
        Theme::with_opacity(theme.muted, 0.9),
        200.0,
        Align::Center,
    );
}

/// Dimming layer, the raised trigger and the floating panel.
#[allow(clippy::too_many_arguments)]
pub fn draw_tooltip_layer(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    slide: &Slide,
    layout: &SlideLayout,
    overlay: &TooltipOverlay,
    measurer: &dyn TextMeasure,
    image_cache: &ImageCache,
    container_alpha: f32,
    container_offset: f32,
) {
    if !overlay.is_visible() {
        return;
    }
    let Some(active) = overlay.active() else {
        return;
    };

    let dim = Theme::with_opacity(theme.dim_overlay, overlay.dim_alpha() * container_alpha);
    ui.painter().rect_filled(ui.max_rect(), 0.0, dim);

    let shifted = canvas.shifted(container_offset);
    if let Some(placement) = layout.placements.iter().find(|p| p.index == active) {
        if let Some(element) = slide.elements.get(active) {
            draw_element(
                ui,
                &shifted,
                theme,
                element,
                placement,
                image_cache,
                container_alpha,
            );
        }
    }

    let Some(content) = slide.elements.get(active).and_then(TooltipContent::of) else {
        return;
    };
    let panel = tooltip::panel_layout(&content, theme, measurer);
    draw_panel(
        ui,
        canvas,
        theme,
        &content,
        &panel,
        overlay.panel_alpha() * container_alpha,
    );
}

fn draw_panel(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    content: &TooltipContent<'_>,
    panel: &PanelLayout,
    alpha: f32,
) {
    let painter = ui.painter();
    let rect = canvas.rect_to_screen(panel.rect);
    let shadow = rect.translate(vec2(0.0, canvas.px(6.0)));
    painter.rect_filled(
        shadow,
        canvas.px(16.0),
        Theme::with_opacity(Color32::BLACK, alpha * 0.25),
    );
    painter.rect_filled(
        rect,
        canvas.px(16.0),
        Theme::with_opacity(theme.panel_background, alpha),
    );
    painter.rect_stroke(
        rect,
        canvas.px(16.0),
        Stroke::new(canvas.px(2.0), Theme::with_opacity(theme.panel_border, alpha)),
        egui::StrokeKind::Inside,
    );

    if let (Some(title), Some((pos, _))) = (content.title, panel.title) {
        text::paint_text(
            ui,
            canvas,
            title,
            pos,
            theme.panel_title_size,
            true,
            Theme::with_opacity(theme.heading_color, alpha),
            panel.inner_width,
            Align::Left,
        );
    }
    if let (Some(body), Some((pos, _))) = (content.body, panel.body) {
        text::paint_text(
            ui,
            canvas,
            body,
            pos,
            theme.panel_body_size,
            false,
            Theme::with_opacity(theme.foreground, alpha),
            panel.inner_width,
            Align::Left,
        );
    }

    let left = panel.rect.left() + tooltip::PANEL_PADDING;
    let wrap = crate::layout::bullet_wrap_width(panel.inner_width);
    let mut y = panel.items_top;
    for (item, row) in content.items.iter().zip(&panel.item_rows) {
        text::paint_text(
            ui,
            canvas,
            "\u{2022}",
            pos2(left + 8.0, y),
            theme.panel_body_size,
            false,
            Theme::with_opacity(theme.accent, alpha),
            crate::layout::BULLET_INDENT,
            Align::Left,
        );
        text::paint_text(
            ui,
            canvas,
            item,
            pos2(left + crate::layout::BULLET_INDENT, y),
            theme.panel_body_size,
            false,
            Theme::with_opacity(theme.foreground, alpha),
            wrap,
            Align::Left,
        );
        y += row + BULLET_SPACING;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CURSOR_CEILING;
    use crate::render::image_cache::WithImages;

    #[test]
    fn test_nav_sits_below_content() {
        let nav = NavLayout::standard();
        assert!(nav.back.top() > CURSOR_CEILING);
        assert!(nav.back.right() < nav.indicator.x);
        assert!(nav.next.left() > nav.indicator.x);
    }

    #[test]
    fn test_nav_hit() {
        let nav = NavLayout::standard();
        assert_eq!(nav.hit(nav.back.center()), Some(NavButton::Back));
        assert_eq!(nav.hit(nav.next.center()), Some(NavButton::Next));
        assert_eq!(nav.hit(nav.indicator), None);
        assert_eq!(nav.hit(pos2(640.0, 300.0)), None);
    }

    fn textured_meshes(output: &egui::FullOutput) -> usize {
        output
            .shapes
            .iter()
            .filter(|clipped| match &clipped.shape {
                egui::Shape::Mesh(mesh) => mesh.texture_id != egui::TextureId::default(),
                _ => false,
            })
            .count()
    }

    #[test]
    fn test_image_without_height_is_drawn() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::from_pixel(200, 100, image::Rgba([200, 40, 40, 255]))
            .save(dir.path().join("wide.png"))
            .unwrap();
        let images = ImageCache::new(dir.path().to_path_buf());
        let theme = Theme::light();
        let element = Element::Image {
            path: "wide.png".to_string(),
            x: None,
            width: None,
            height: None,
        };
        let estimate = layout::EstimateMeasure::default();
        let measurer = WithImages::new(&estimate, &images);
        let slide_layout = layout::layout_slide(std::slice::from_ref(&element), &theme, &measurer);
        let placement = &slide_layout.placements[0];
        assert_eq!(placement.height(), 100.0);

        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let canvas = Canvas::fit(ui.max_rect());
                draw_element(ui, &canvas, &theme, &element, placement, &images, 1.0);
            });
        });
        assert_eq!(textured_meshes(&output), 1);
    }
}
