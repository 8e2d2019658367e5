//! Hand-composed illustrations for `diagram` and `graph` elements.
//!
//! Geometry is computed in canvas units by plain functions so it can be
//! checked without a rendering context; the `draw_*` functions only paint.

use std::f32::consts::PI;

use eframe::egui::{self, Color32, Pos2, Rect, Stroke, pos2, vec2};

use crate::deck::{Align, Illustration};
use crate::render::Canvas;
use crate::render::text::paint_text;
use crate::theme::Theme;

const AXIS_MARGIN: f32 = 36.0;
const CURVE_SAMPLES: usize = 48;

/// Draw `kind` into `area` (canvas units).
pub fn draw_illustration(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    kind: &Illustration,
    area: Rect,
    opacity: f32,
) {
    if area.height() <= 0.0 {
        return;
    }
    match kind {
        Illustration::AiHierarchy => draw_hierarchy(ui, canvas, theme, area, opacity),
        Illustration::NeuralNetwork => draw_network(ui, canvas, theme, area, opacity),
        Illustration::Scatter => draw_scatter(ui, canvas, theme, area, opacity, false),
        Illustration::DecisionBoundary => draw_scatter(ui, canvas, theme, area, opacity, true),
        Illustration::Accuracy => draw_curves(
            ui,
            canvas,
            theme,
            area,
            opacity,
            "epochs",
            "accuracy",
            &[accuracy_curve as fn(f32) -> f32],
        ),
        Illustration::Loss => draw_curves(
            ui,
            canvas,
            theme,
            area,
            opacity,
            "epochs",
            "loss",
            &[training_loss, validation_loss],
        ),
        Illustration::Other(name) => draw_placeholder(ui, canvas, theme, name, area, opacity),
    }
}

/// Nested boxes for AI, machine learning and deep learning, outermost first.
pub fn hierarchy_boxes(area: Rect) -> [Rect; 3] {
    let h = area.height();
    let w = area.width().min(h * 2.6);
    let outer = Rect::from_center_size(area.center(), vec2(w, h));
    let middle = Rect::from_min_max(
        pos2(outer.left() + w * 0.18, outer.top() + h * 0.2),
        pos2(outer.right() - w * 0.04, outer.bottom() - h * 0.06),
    );
    let inner = Rect::from_min_max(
        pos2(middle.left() + w * 0.22, middle.top() + h * 0.24),
        pos2(middle.right() - w * 0.04, middle.bottom() - h * 0.06),
    );
    [outer, middle, inner]
}

fn draw_hierarchy(ui: &egui::Ui, canvas: &Canvas, theme: &Theme, area: Rect, opacity: f32) {
    let labels = ["Artificial Intelligence", "Machine Learning", "Deep Learning"];
    let palette = theme.series_palette();
    let painter = ui.painter();

    for (i, (rect, label)) in hierarchy_boxes(area).iter().zip(labels).enumerate() {
        let color = palette[i % palette.len()];
        let screen = canvas.rect_to_screen(*rect);
        painter.rect_filled(
            screen,
            canvas.px(14.0),
            Theme::with_opacity(color, opacity * 0.14),
        );
        painter.rect_stroke(
            screen,
            canvas.px(14.0),
            Stroke::new(canvas.px(2.0), Theme::with_opacity(color, opacity)),
            egui::StrokeKind::Inside,
        );
        paint_text(
            ui,
            canvas,
            label,
            pos2(rect.left() + 14.0, rect.top() + 10.0),
            theme.table_size,
            true,
            Theme::with_opacity(color, opacity),
            rect.width() - 28.0,
            Align::Left,
        );
    }
}

/// Node centers per layer, spread evenly across `area`.
pub fn network_nodes(layers: &[usize], area: Rect) -> Vec<Vec<Pos2>> {
    let columns = layers.len().max(1) as f32;
    layers
        .iter()
        .enumerate()
        .map(|(l, &count)| {
            let x = area.left() + area.width() * (l as f32 + 0.5) / columns;
            (0..count)
                .map(|n| {
                    let y = area.top() + area.height() * (n as f32 + 0.5) / count as f32;
                    pos2(x, y)
                })
                .collect()
        })
        .collect()
}

fn draw_network(ui: &egui::Ui, canvas: &Canvas, theme: &Theme, area: Rect, opacity: f32) {
    let layers = network_nodes(&[3, 5, 5, 2], area.shrink2(vec2(area.width() * 0.15, 8.0)));
    let palette = theme.series_palette();
    let painter = ui.painter();
    let edge = Stroke::new(canvas.px(1.0), Theme::with_opacity(theme.muted, opacity * 0.6));

    for pair in layers.windows(2) {
        for a in &pair[0] {
            for b in &pair[1] {
                painter.line_segment([canvas.to_screen(*a), canvas.to_screen(*b)], edge);
            }
        }
    }

    let radius = (area.height() / 14.0).clamp(6.0, 18.0);
    let last = layers.len().saturating_sub(1);
    for (l, nodes) in layers.iter().enumerate() {
        let color = match l {
            0 => palette[0],
            l if l == last => palette[2],
            _ => palette[1],
        };
        for node in nodes {
            let center = canvas.to_screen(*node);
            painter.circle_filled(center, canvas.px(radius), Theme::with_opacity(color, opacity));
            painter.circle_stroke(
                center,
                canvas.px(radius),
                Stroke::new(canvas.px(1.5), Theme::with_opacity(theme.background, opacity)),
            );
        }
    }
}

/// Two point clusters in unit coordinates (y up), spread on a sunflower
/// pattern so the layout is stable between frames.
pub fn cluster_points(count: usize) -> [Vec<Pos2>; 2] {
    let golden = PI * (3.0 - 5.0_f32.sqrt());
    let cluster = |cx: f32, cy: f32| -> Vec<Pos2> {
        (0..count)
            .map(|i| {
                let r = 0.16 * ((i as f32 + 0.5) / count as f32).sqrt();
                let a = i as f32 * golden;
                pos2(cx + r * a.cos(), cy + r * a.sin())
            })
            .collect()
    };
    [cluster(0.3, 0.32), cluster(0.7, 0.68)]
}

/// Plot rect inside `area` after leaving room for axis labels.
pub fn plot_rect(area: Rect) -> Rect {
    Rect::from_min_max(
        pos2(area.left() + AXIS_MARGIN, area.top() + 8.0),
        pos2(area.right() - 8.0, area.bottom() - AXIS_MARGIN * 0.7),
    )
}

/// Map unit coordinates (origin bottom-left, y up) into `plot`.
pub fn to_plot(plot: Rect, p: Pos2) -> Pos2 {
    pos2(
        plot.left() + p.x * plot.width(),
        plot.bottom() - p.y * plot.height(),
    )
}

#[allow(clippy::too_many_arguments)]
fn draw_axes(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    plot: Rect,
    x_label: &str,
    y_label: &str,
    opacity: f32,
) {
    let color = Theme::with_opacity(theme.muted, opacity);
    let stroke = Stroke::new(canvas.px(2.0), color);
    let painter = ui.painter();
    painter.line_segment(
        [
            canvas.to_screen(plot.left_bottom()),
            canvas.to_screen(plot.right_bottom()),
        ],
        stroke,
    );
    painter.line_segment(
        [
            canvas.to_screen(plot.left_bottom()),
            canvas.to_screen(plot.left_top()),
        ],
        stroke,
    );
    let label_size = theme.table_size * 0.8;
    paint_text(
        ui,
        canvas,
        x_label,
        pos2(plot.left(), plot.bottom() + 4.0),
        label_size,
        false,
        color,
        plot.width(),
        Align::Right,
    );
    paint_text(
        ui,
        canvas,
        y_label,
        pos2(plot.left() - AXIS_MARGIN + 2.0, plot.top()),
        label_size,
        false,
        color,
        AXIS_MARGIN * 3.0,
        Align::Left,
    );
}

fn draw_scatter(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    area: Rect,
    opacity: f32,
    boundary: bool,
) {
    let plot = plot_rect(area);
    draw_axes(ui, canvas, theme, plot, "feature 1", "feature 2", opacity);

    let palette = theme.series_palette();
    let painter = ui.painter();
    let radius = canvas.px(5.0);
    for (c, points) in cluster_points(14).iter().enumerate() {
        let color = Theme::with_opacity(palette[c], opacity);
        for p in points {
            painter.circle_filled(canvas.to_screen(to_plot(plot, *p)), radius, color);
        }
    }

    if boundary {
        let stroke = Stroke::new(canvas.px(2.5), Theme::with_opacity(palette[3], opacity));
        let from = canvas.to_screen(to_plot(plot, pos2(0.08, 0.95)));
        let to = canvas.to_screen(to_plot(plot, pos2(0.92, 0.05)));
        painter.add(egui::Shape::dashed_line(
            &[from, to],
            stroke,
            canvas.px(10.0),
            canvas.px(6.0),
        ));
    }
}

pub fn accuracy_curve(t: f32) -> f32 {
    0.35 + 0.58 * (1.0 - (-4.0 * t).exp())
}

pub fn training_loss(t: f32) -> f32 {
    0.08 + 0.84 * (-4.5 * t).exp()
}

pub fn validation_loss(t: f32) -> f32 {
    0.16 + 0.78 * (-3.8 * t).exp()
}

/// Samples of `f` over `[0, 1]` in unit coordinates.
pub fn sample_curve(f: fn(f32) -> f32) -> Vec<Pos2> {
    (0..=CURVE_SAMPLES)
        .map(|i| {
            let t = i as f32 / CURVE_SAMPLES as f32;
            pos2(t, f(t).clamp(0.0, 1.0))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn draw_curves(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    area: Rect,
    opacity: f32,
    x_label: &str,
    y_label: &str,
    curves: &[fn(f32) -> f32],
) {
    let plot = plot_rect(area);
    draw_axes(ui, canvas, theme, plot, x_label, y_label, opacity);

    let palette = theme.series_palette();
    for (i, f) in curves.iter().enumerate() {
        let points: Vec<Pos2> = sample_curve(*f)
            .into_iter()
            .map(|p| canvas.to_screen(to_plot(plot, p)))
            .collect();
        let color: Color32 = Theme::with_opacity(palette[i % palette.len()], opacity);
        ui.painter()
            .add(egui::Shape::line(points, Stroke::new(canvas.px(3.0), color)));
    }
}

fn draw_placeholder(
    ui: &egui::Ui,
    canvas: &Canvas,
    theme: &Theme,
    name: &str,
    area: Rect,
    opacity: f32,
) {
    let color = Theme::with_opacity(theme.muted, opacity);
    ui.painter().rect_stroke(
        canvas.rect_to_screen(area),
        canvas.px(8.0),
        Stroke::new(canvas.px(1.5), color),
        egui::StrokeKind::Inside,
    );
    paint_text(
        ui,
        canvas,
        &format!("[{name}]"),
        pos2(area.left(), area.center().y - theme.table_size * 0.65),
        theme.table_size,
        false,
        color,
        area.width(),
        Align::Center,
    );
}
