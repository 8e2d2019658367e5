//! Hover tooltips: a dimming layer, faded sibling content and a centered
//! floating panel, all driven by one fade so show/hide can never disagree.

use eframe::egui::{Pos2, Rect, pos2, vec2};

use crate::deck::Element;
use crate::layout::{self, CANVAS_HEIGHT, CANVAS_WIDTH, TextMeasure};
use crate::theme::Theme;

/// Seconds for a full fade in or out.
pub const FADE_SECONDS: f32 = 0.2;
/// Opacity of the dimming layer when fully shown.
pub const DIM_ALPHA: f32 = 0.6;
/// Opacity of the other slide elements while a tooltip is open.
pub const SIBLING_ALPHA: f32 = 0.15;

pub const PANEL_WIDTH: f32 = 760.0;
pub const PANEL_PADDING: f32 = 28.0;
pub const PANEL_SECTION_GAP: f32 = 14.0;

/// A value eased linearly toward a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    value: f32,
    target: f32,
}

impl Fade {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Move at most `amount` toward the target.
    pub fn advance(&mut self, amount: f32) {
        if self.value < self.target {
            self.value = (self.value + amount).min(self.target);
        } else {
            self.value = (self.value - amount).max(self.target);
        }
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target
    }
}

/// Tooltip state for the slide on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipOverlay {
    /// Element whose panel is shown or fading out.
    active: Option<usize>,
    open: bool,
    reveal: Fade,
}

impl Default for TooltipOverlay {
    fn default() -> Self {
        Self {
            active: None,
            open: false,
            reveal: Fade::new(0.0),
        }
    }
}

impl TooltipOverlay {
    pub fn pointer_over(&mut self, index: usize) {
        self.active = Some(index);
        self.open = true;
        self.reveal.set_target(1.0);
    }

    /// Pointer left trigger `index`. Stray events for other triggers are ignored.
    pub fn pointer_out(&mut self, index: usize) {
        if self.active == Some(index) && self.open {
            self.open = false;
            self.reveal.set_target(0.0);
        }
    }

    /// Feed the trigger currently under the pointer, if any.
    pub fn sync_hover(&mut self, hovered: Option<usize>) {
        match hovered {
            Some(index) if self.open && self.active == Some(index) => {}
            Some(index) => {
                if let Some(current) = self.active {
                    self.pointer_out(current);
                }
                self.pointer_over(index);
            }
            None => {
                if let Some(current) = self.active {
                    self.pointer_out(current);
                }
            }
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.reveal.advance(dt / FADE_SECONDS);
        if !self.open && self.reveal.value() <= 0.0 {
            self.active = None;
        }
    }

    /// Drop the tooltip immediately, without fading.
    pub fn close_now(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Anything still on screen, including a panel that is fading out.
    pub fn is_visible(&self) -> bool {
        self.open || self.reveal.value() > 0.0
    }

    pub fn is_animating(&self) -> bool {
        !self.reveal.is_settled()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn dim_alpha(&self) -> f32 {
        self.reveal.value() * DIM_ALPHA
    }

    pub fn panel_alpha(&self) -> f32 {
        self.reveal.value()
    }

    pub fn sibling_alpha(&self) -> f32 {
        1.0 - self.reveal.value() * (1.0 - SIBLING_ALPHA)
    }

    /// Opacity for element `index` given the current tooltip.
    pub fn element_alpha(&self, index: usize) -> f32 {
        if self.active == Some(index) {
            1.0
        } else {
            self.sibling_alpha()
        }
    }
}

/// Expanded content of a tooltip element.
#[derive(Debug, Clone, Copy)]
pub struct TooltipContent<'a> {
    pub title: Option<&'a str>,
    pub body: Option<&'a str>,
    pub items: &'a [String],
}

impl<'a> TooltipContent<'a> {
    pub fn of(element: &'a Element) -> Option<Self> {
        match element {
            Element::Tooltip {
                title, body, items, ..
            } => Some(Self {
                title: title.as_deref(),
                body: body.as_deref(),
                items,
            }),
            _ => None,
        }
    }
}

/// Geometry of the floating panel in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub rect: Rect,
    pub inner_width: f32,
    pub title: Option<(Pos2, f32)>,
    pub body: Option<(Pos2, f32)>,
    pub items_top: f32,
    pub item_rows: Vec<f32>,
}

pub fn panel_layout(
    content: &TooltipContent<'_>,
    theme: &Theme,
    measurer: &dyn TextMeasure,
) -> PanelLayout {
    let inner_width = PANEL_WIDTH - PANEL_PADDING * 2.0;

    let title_h = content
        .title
        .map(|t| measurer.measure_text(t, theme.panel_title_size, true, inner_width).y);
    let body_h = content
        .body
        .map(|t| measurer.measure_text(t, theme.panel_body_size, false, inner_width).y);
    let (item_rows, items_h) =
        layout::bullet_rows(content.items, theme.panel_body_size, measurer, inner_width);

    let sections: Vec<f32> = [title_h, body_h, (!item_rows.is_empty()).then_some(items_h)]
        .into_iter()
        .flatten()
        .collect();
    let gaps = sections.len().saturating_sub(1) as f32 * PANEL_SECTION_GAP;
    let height = PANEL_PADDING * 2.0 + sections.iter().sum::<f32>() + gaps;

    let rect = Rect::from_center_size(
        pos2(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
        vec2(PANEL_WIDTH, height),
    );

    let left = rect.left() + PANEL_PADDING;
    let mut y = rect.top() + PANEL_PADDING;
    let title = title_h.map(|h| {
        let placed = (pos2(left, y), h);
        y += h + PANEL_SECTION_GAP;
        placed
    });
    let body = body_h.map(|h| {
        let placed = (pos2(left, y), h);
        y += h + PANEL_SECTION_GAP;
        placed
    });

    PanelLayout {
        rect,
        inner_width,
        title,
        body,
        items_top: y,
        item_rows,
    }
}
