use eframe::egui::text::LayoutJob;
use eframe::egui::{self, Color32, FontFamily, FontId, Pos2, Rect, Stroke, pos2, vec2};

use crate::deck::Align;
use crate::layout::{self, BULLET_INDENT, CONTENT_LEFT, CONTENT_WIDTH, Extent, HEADER_TOP};
use crate::render::Canvas;
use crate::render::image_cache::ImageCache;
use crate::theme::Theme;

/// egui's bundled fonts have no bold face; bold text is set in a larger size
/// and stronger color instead.
pub fn font(size: f32, _bold: bool, scale: f32) -> FontId {
    FontId::new(size * scale, FontFamily::Proportional)
}

/// Layout job for `text` wrapped at `wrap_px` screen pixels. Rows are
/// aligned individually around x = 0 of the galley.
pub fn text_job(
    text: &str,
    font: FontId,
    color: Color32,
    wrap_px: f32,
    align: Align,
) -> LayoutJob {
    let mut job = LayoutJob::simple(text.to_owned(), font, color, wrap_px);
    job.halign = match align {
        Align::Left => egui::Align::LEFT,
        Align::Center => egui::Align::Center,
        Align::Right => egui::Align::RIGHT,
    };
    job
}

/// Lay out and paint `text` inside a block starting at canvas `pos` that is
/// `wrap_width` wide. Returns the painted rect in canvas units.
#[allow(clippy::too_many_arguments)]
pub fn paint_text(
    ui: &egui::Ui,
    canvas: &Canvas,
    text: &str,
    pos: Pos2,
    size: f32,
    bold: bool,
    color: Color32,
    wrap_width: f32,
    align: Align,
) -> Rect {
    let job = text_job(
        text,
        font(size, bold, canvas.scale),
        color,
        canvas.px(wrap_width),
        align,
    );
    let galley = ui.painter().layout_job(job);
    let anchor_x = match align {
        Align::Left => pos.x,
        Align::Center => pos.x + wrap_width / 2.0,
        Align::Right => pos.x + wrap_width,
    };
    let anchor = pos2(anchor_x, pos.y);
    let rect = galley.rect;
    ui.painter().galley(canvas.to_screen(anchor), galley, color);
    Rect::from_min_size(
        pos2(anchor_x + rect.min.x / canvas.scale, pos.y),
        rect.size() / canvas.scale,
    )
}

/// Slide title line above the content area.
pub fn draw_header(ui: &egui::Ui, canvas: &Canvas, theme: &Theme, title: &str, opacity: f32) {
    if title.is_empty() {
        return;
    }
    let color = Theme::with_opacity(theme.muted, opacity);
    let rect = paint_text(
        ui,
        canvas,
        title,
        pos2(CONTENT_LEFT, HEADER_TOP),
        theme.header_size,
        false,
        color,
        CONTENT_WIDTH,
        Align::Left,
    );
    let y = rect.bottom() + 8.0;
    ui.painter().line_segment(
        [
            canvas.to_screen(pos2(CONTENT_LEFT, y)),
            canvas.to_screen(pos2(CONTENT_LEFT + 48.0, y)),
        ],
        Stroke::new(canvas.px(3.0), Theme::with_opacity(theme.accent, opacity)),
    );
}

pub fn draw_title(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    text: &str,
    pos: Pos2,
    width: f32,
    opacity: f32,
) {
    let color = Theme::with_opacity(theme.heading_color, opacity);
    paint_text(ui, canvas, text, pos, theme.title_size, true, color, width, Align::Center);
}

#[allow(clippy::too_many_arguments)]
pub fn draw_paragraph(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    text: &str,
    align: Align,
    pos: Pos2,
    width: f32,
    opacity: f32,
) {
    let color = Theme::with_opacity(theme.foreground, opacity);
    let wrap = layout::paragraph_wrap_width(width);
    paint_text(ui, canvas, text, pos, theme.body_size, false, color, wrap, align);
}

#[allow(clippy::too_many_arguments)]
pub fn draw_bold(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    text: &str,
    align: Align,
    pos: Pos2,
    width: f32,
    opacity: f32,
) {
    let color = Theme::with_opacity(theme.heading_color, opacity);
    let wrap = layout::paragraph_wrap_width(width);
    paint_text(ui, canvas, text, pos, theme.bold_size, true, color, wrap, align);
}

/// Bullet items placed at the row offsets computed by the layout pass.
#[allow(clippy::too_many_arguments)]
pub fn draw_bullets(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    items: &[String],
    extent: &Extent,
    pos: Pos2,
    width: f32,
    opacity: f32,
) {
    let color = Theme::with_opacity(theme.foreground, opacity);
    let marker_color = Theme::with_opacity(theme.accent, opacity);
    let wrap = layout::bullet_wrap_width(width);

    for (item, offset) in items.iter().zip(extent.row_offsets()) {
        let y = pos.y + offset;
        paint_text(
            ui,
            canvas,
            "\u{2022}",
            pos2(pos.x + 8.0, y),
            theme.body_size,
            false,
            marker_color,
            BULLET_INDENT,
            Align::Left,
        );
        paint_text(
            ui,
            canvas,
            item,
            pos2(pos.x + BULLET_INDENT, y),
            theme.body_size,
            false,
            color,
            wrap,
            Align::Left,
        );
    }
}

/// Hover target text. Returns its canvas rect for hit testing.
pub fn draw_tooltip_trigger(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    text: &str,
    pos: Pos2,
    width: f32,
    opacity: f32,
) -> Rect {
    let color = Theme::with_opacity(theme.accent, opacity);
    let wrap = layout::paragraph_wrap_width(width);
    let rect = paint_text(ui, canvas, text, pos, theme.body_size, false, color, wrap, Align::Left);

    // Dotted underline marks the text as hoverable.
    let y = rect.bottom() + 2.0;
    let mut x = rect.left();
    while x < rect.right() {
        let end = (x + 4.0).min(rect.right());
        ui.painter().line_segment(
            [canvas.to_screen(pos2(x, y)), canvas.to_screen(pos2(end, y))],
            Stroke::new(canvas.px(1.5), color),
        );
        x += 8.0;
    }
    rect
}

/// An emoji or short glyph centered on `center_x`.
#[allow(clippy::too_many_arguments)]
pub fn draw_icon(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    icon: &str,
    size: f32,
    center_x: f32,
    top: f32,
    opacity: f32,
) {
    let color = Theme::with_opacity(theme.foreground, opacity);
    let glyph = size * 0.8;
    paint_text(
        ui,
        canvas,
        icon,
        pos2(center_x - size / 2.0, top + (size - glyph * 1.2) / 2.0),
        glyph,
        false,
        color,
        size,
        Align::Center,
    );
}

#[allow(clippy::too_many_arguments)]
pub fn draw_table(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    headers: &[String],
    rows: &[Vec<String>],
    pos: Pos2,
    width: f32,
    opacity: f32,
) {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return;
    }
    let col_w = width / columns as f32;
    let painter = ui.painter();
    let border = Stroke::new(canvas.px(1.0), Theme::with_opacity(theme.muted, opacity * 0.5));

    let mut y = pos.y;
    let mut draw_row = |cells: &[String], height: f32, fill: Option<Color32>, header: bool| {
        let row_rect = Rect::from_min_size(pos2(pos.x, y), vec2(width, height));
        if let Some(fill) = fill {
            painter.rect_filled(canvas.rect_to_screen(row_rect), 0.0, fill);
        }
        let color = if header {
            Theme::with_opacity(theme.heading_color, opacity)
        } else {
            Theme::with_opacity(theme.foreground, opacity)
        };
        for (c, cell) in cells.iter().enumerate().take(columns) {
            let x = pos.x + c as f32 * col_w + 12.0;
            let cell_y = y + (height - theme.table_size * 1.3) / 2.0;
            paint_text(
                ui,
                canvas,
                cell,
                pos2(x, cell_y),
                theme.table_size,
                header,
                color,
                col_w - 24.0,
                Align::Left,
            );
        }
        painter.line_segment(
            [
                canvas.to_screen(pos2(pos.x, y + height)),
                canvas.to_screen(pos2(pos.x + width, y + height)),
            ],
            border,
        );
        y += height;
    };

    draw_row(
        headers,
        layout::TABLE_HEADER_HEIGHT,
        Some(Theme::with_opacity(theme.table_header, opacity)),
        true,
    );
    for (i, row) in rows.iter().enumerate() {
        let fill = (i % 2 == 1).then(|| Theme::with_opacity(theme.table_row_alt, opacity));
        draw_row(row, layout::TABLE_ROW_HEIGHT, fill, false);
    }
}

/// Draw an image into `area` (canvas units), preserving aspect ratio.
/// Falls back to a placeholder when the file cannot be loaded.
#[allow(clippy::too_many_arguments)]
pub fn draw_image(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    image_cache: &ImageCache,
    path: &str,
    area: Rect,
    opacity: f32,
) {
    if area.height() <= 0.0 || area.width() <= 0.0 {
        return;
    }
    if let Some(texture) = image_cache.get_or_load(ui.ctx(), path) {
        let draw_rect = contain(texture.size_vec2(), area);
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
        let tint = Color32::from_rgba_unmultiplied(255, 255, 255, alpha);
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        ui.painter()
            .image(texture.id(), canvas.rect_to_screen(draw_rect), uv, tint);
    } else {
        draw_image_placeholder(ui, canvas, theme, path, area, opacity);
    }
}

/// Largest rect with the texture's aspect ratio centered inside `area`.
pub fn contain(tex_size: egui::Vec2, area: Rect) -> Rect {
    if tex_size.x <= 0.0 || tex_size.y <= 0.0 {
        return area;
    }
    let scale = (area.width() / tex_size.x).min(area.height() / tex_size.y);
    Rect::from_center_size(area.center(), tex_size * scale)
}

pub fn draw_image_placeholder(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    label: &str,
    area: Rect,
    opacity: f32,
) {
    let bg = Theme::with_opacity(theme.table_row_alt, opacity);
    let color = Theme::with_opacity(theme.muted, opacity);
    let screen = canvas.rect_to_screen(area);
    ui.painter().rect_filled(screen, canvas.px(8.0), bg);
    ui.painter().rect_stroke(
        screen,
        canvas.px(8.0),
        Stroke::new(1.0, color),
        egui::StrokeKind::Outside,
    );
    let text_top = area.center().y - theme.table_size * 0.65;
    paint_text(
        ui,
        canvas,
        &format!("[Image: {label}]"),
        pos2(area.left(), text_top),
        theme.table_size,
        false,
        color,
        area.width(),
        Align::Center,
    );
}
