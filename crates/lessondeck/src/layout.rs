//! Vertical flow layout for slide elements.
//!
//! Everything here works in a fixed 1280x720 reference canvas; the renderer
//! maps canvas coordinates onto the window. Element heights come from
//! [`measure`], which is the only place heights are computed: the layout pass
//! uses it to advance the cursor and the renderer uses the same [`Extent`]
//! (bullet row heights included) to place what it draws.

use eframe::egui::{Pos2, Vec2, pos2, vec2};

use crate::deck::Element;
use crate::theme::Theme;

pub const CANVAS_WIDTH: f32 = 1280.0;
pub const CANVAS_HEIGHT: f32 = 720.0;

pub const HEADER_TOP: f32 = 56.0;
pub const CONTENT_LEFT: f32 = 140.0;
pub const CONTENT_TOP: f32 = 130.0;
pub const CONTENT_WIDTH: f32 = 1000.0;

/// Lowest y an element may be placed at; the navigation bar lives below.
pub const CURSOR_CEILING: f32 = 610.0;

pub const ELEMENT_GAP: f32 = 18.0;
pub const BOLD_GAP_BONUS: f32 = 6.0;
pub const BOLD_PARAGRAPH_BONUS: f32 = 10.0;
pub const TOOLTIP_GAP_BONUS: f32 = 8.0;

/// Added to measured text blocks to cover multi-line rounding.
pub const TEXT_BUFFER: f32 = 4.0;
pub const PARAGRAPH_PADDING: f32 = 40.0;

pub const BULLET_INDENT: f32 = 36.0;
pub const BULLET_MIN_ROW: f32 = 30.0;
pub const BULLET_SPACING: f32 = 10.0;

pub const DEFAULT_DIAGRAM_HEIGHT: f32 = 240.0;
pub const DEFAULT_ICON_SIZE: f32 = 64.0;

pub const TABLE_HEADER_HEIGHT: f32 = 42.0;
pub const TABLE_ROW_HEIGHT: f32 = 36.0;

/// Text metrics provided by the host surface.
pub trait TextMeasure {
    /// Size of `text` at `size` points, word-wrapped at `wrap_width`.
    fn measure_text(&self, text: &str, size: f32, bold: bool, wrap_width: f32) -> Vec2;

    /// Natural pixel size of the image at `path`, when it can be read.
    fn image_size(&self, _path: &str) -> Option<Vec2> {
        None
    }
}

/// Font-free text metrics: fixed advance per glyph and greedy word wrap.
///
/// Used wherever no egui context exists (the `check` command, tests). Close
/// enough to the default proportional font to flag overflowing slides.
#[derive(Debug, Clone, Copy)]
pub struct EstimateMeasure {
    pub advance: f32,
    pub bold_advance: f32,
    pub line_height: f32,
}

impl Default for EstimateMeasure {
    fn default() -> Self {
        Self {
            advance: 0.52,
            bold_advance: 0.56,
            line_height: 1.25,
        }
    }
}

impl TextMeasure for EstimateMeasure {
    fn measure_text(&self, text: &str, size: f32, bold: bool, wrap_width: f32) -> Vec2 {
        let glyph = size * if bold { self.bold_advance } else { self.advance };
        let max_cols = ((wrap_width / glyph).floor() as usize).max(1);

        let mut lines = 0usize;
        let mut widest = 0usize;
        for paragraph in text.split('\n') {
            let mut col = 0usize;
            lines += 1;
            for word in paragraph.split_whitespace() {
                let len = word.chars().count();
                let needed = if col == 0 { len } else { col + 1 + len };
                if col > 0 && needed > max_cols {
                    widest = widest.max(col);
                    lines += 1;
                    col = len;
                } else {
                    col = needed;
                }
                // Words longer than a line are broken across rows.
                while col > max_cols {
                    widest = max_cols;
                    lines += 1;
                    col -= max_cols;
                }
            }
            widest = widest.max(col);
        }

        vec2(widest as f32 * glyph, lines as f32 * size * self.line_height)
    }
}

/// Vertical space an element takes in the flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Extent {
    /// Declared or fixed height.
    Fixed(f32),
    /// A measured text block; `height` includes any buffer.
    Text { size: Vec2, height: f32 },
    /// Bullet rows; `rows[i]` is the height reserved for item `i`.
    Rows { rows: Vec<f32>, height: f32 },
}

impl Extent {
    pub fn height(&self) -> f32 {
        match self {
            Extent::Fixed(h) => *h,
            Extent::Text { height, .. } | Extent::Rows { height, .. } => *height,
        }
    }

    /// Offset of each bullet row from the element top.
    pub fn row_offsets(&self) -> Vec<f32> {
        match self {
            Extent::Rows { rows, .. } => rows
                .iter()
                .scan(0.0, |acc, row| {
                    let offset = *acc;
                    *acc += row + BULLET_SPACING;
                    Some(offset)
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub fn paragraph_wrap_width(width: f32) -> f32 {
    (width - PARAGRAPH_PADDING).max(1.0)
}

pub fn bullet_wrap_width(width: f32) -> f32 {
    (width - BULLET_INDENT).max(1.0)
}

/// Height of a bullet list from its item texts.
pub fn bullet_rows(
    items: &[String],
    size: f32,
    measurer: &dyn TextMeasure,
    width: f32,
) -> (Vec<f32>, f32) {
    let wrap = bullet_wrap_width(width);
    let rows: Vec<f32> = items
        .iter()
        .map(|item| {
            measurer
                .measure_text(item, size, false, wrap)
                .y
                .max(BULLET_MIN_ROW)
        })
        .collect();
    let height = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r + BULLET_SPACING).sum::<f32>() - BULLET_SPACING
    };
    (rows, height)
}

/// Canvas box of an image. Declared sizes win; the natural size fills in the
/// rest at its own aspect ratio. The width never exceeds `content_width`, and
/// an image of unknown size with no declared height takes no space.
pub fn image_box(
    natural: Option<Vec2>,
    width: Option<f32>,
    height: Option<f32>,
    content_width: f32,
) -> Vec2 {
    let natural = natural.filter(|n| n.x > 0.0 && n.y > 0.0);
    let w = width
        .or(natural.map(|n| n.x))
        .unwrap_or(content_width)
        .min(content_width);
    let h = match (height, natural) {
        (Some(h), _) => h,
        (None, Some(n)) => w * n.y / n.x,
        (None, None) => 0.0,
    };
    vec2(w.max(0.0), h.max(0.0))
}

/// Measure one element at the given content width.
pub fn measure(element: &Element, theme: &Theme, measurer: &dyn TextMeasure, width: f32) -> Extent {
    match element {
        Element::Spacer { height } => Extent::Fixed(height.max(0.0)),
        Element::Title { text } => {
            let size = measurer.measure_text(text, theme.title_size, true, width);
            Extent::Text {
                size,
                height: size.y + TEXT_BUFFER,
            }
        }
        Element::Paragraph { text, .. } => {
            let size =
                measurer.measure_text(text, theme.body_size, false, paragraph_wrap_width(width));
            Extent::Text {
                size,
                height: size.y + TEXT_BUFFER,
            }
        }
        Element::Bold { text, .. } => {
            let size =
                measurer.measure_text(text, theme.bold_size, true, paragraph_wrap_width(width));
            Extent::Text {
                size,
                height: size.y + TEXT_BUFFER,
            }
        }
        Element::Bullet { items } => {
            let (rows, height) = bullet_rows(items, theme.body_size, measurer, width);
            Extent::Rows { rows, height }
        }
        Element::Diagram { height, .. } | Element::Graph { height, .. } => {
            Extent::Fixed(height.unwrap_or(DEFAULT_DIAGRAM_HEIGHT))
        }
        Element::Icon { size, .. } => Extent::Fixed(size.unwrap_or(DEFAULT_ICON_SIZE)),
        Element::Image {
            path,
            width: declared_width,
            height,
            ..
        } => Extent::Fixed(
            image_box(measurer.image_size(path), *declared_width, *height, width).y,
        ),
        Element::Table { rows, .. } => {
            Extent::Fixed(TABLE_HEADER_HEIGHT + rows.len() as f32 * TABLE_ROW_HEIGHT)
        }
        Element::Tooltip { text, .. } => {
            let size =
                measurer.measure_text(text, theme.body_size, false, paragraph_wrap_width(width));
            Extent::Text {
                size,
                height: size.y,
            }
        }
        Element::Unsupported => Extent::Fixed(0.0),
    }
}

/// Space between `prev` and the element after it.
pub fn gap_after(prev: &Element, next: Option<&Element>) -> f32 {
    match prev {
        Element::Spacer { .. } | Element::Unsupported => 0.0,
        Element::Bold { .. } => {
            let mut gap = ELEMENT_GAP + BOLD_GAP_BONUS;
            if matches!(next, Some(Element::Paragraph { .. })) {
                gap += BOLD_PARAGRAPH_BONUS;
            }
            gap
        }
        Element::Tooltip { .. } => ELEMENT_GAP + TOOLTIP_GAP_BONUS,
        _ => ELEMENT_GAP,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Index into the slide's element list.
    pub index: usize,
    pub pos: Pos2,
    pub width: f32,
    pub extent: Extent,
    pub gap_after: f32,
    /// The cursor hit the ceiling and this element was moved up to it.
    pub pinned: bool,
}

impl Placement {
    pub fn height(&self) -> f32 {
        self.extent.height()
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height()
    }
}

/// Where a slide's elements flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowArea {
    pub origin: Pos2,
    pub width: f32,
    pub ceiling: f32,
}

impl FlowArea {
    /// The standard slide content area.
    pub fn content() -> Self {
        Self {
            origin: pos2(CONTENT_LEFT, CONTENT_TOP),
            width: CONTENT_WIDTH,
            ceiling: CURSOR_CEILING,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    pub placements: Vec<Placement>,
    /// Bottom of the content had nothing been clamped.
    pub natural_bottom: f32,
    pub ceiling: f32,
}

impl SlideLayout {
    pub fn overflowed(&self) -> bool {
        self.natural_bottom > self.ceiling
    }

    pub fn pinned_count(&self) -> usize {
        self.placements.iter().filter(|p| p.pinned).count()
    }
}

/// Flow `elements` downward through `area`.
pub fn layout_elements(
    elements: &[Element],
    theme: &Theme,
    measurer: &dyn TextMeasure,
    area: FlowArea,
) -> SlideLayout {
    let FlowArea {
        origin,
        width,
        ceiling,
    } = area;
    let mut placements = Vec::with_capacity(elements.len());
    let mut cursor = origin.y;
    let mut natural = origin.y;
    let mut natural_bottom = origin.y;

    for (index, element) in elements.iter().enumerate() {
        let extent = measure(element, theme, measurer, width);
        let height = extent.height();
        let gap = gap_after(element, elements.get(index + 1));

        natural_bottom = natural_bottom.max(natural + height);
        placements.push(Placement {
            index,
            pos: pos2(origin.x, cursor),
            width,
            extent,
            gap_after: gap,
            pinned: natural > ceiling,
        });

        natural += height + gap;
        cursor = (cursor + height + gap).min(ceiling);
    }

    SlideLayout {
        placements,
        natural_bottom,
        ceiling,
    }
}

/// Lay out a slide's elements in the standard content area.
pub fn layout_slide(
    elements: &[Element],
    theme: &Theme,
    measurer: &dyn TextMeasure,
) -> SlideLayout {
    layout_elements(elements, theme, measurer, FlowArea::content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Align, Illustration};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn para(text: &str) -> Element {
        Element::Paragraph {
            text: text.to_string(),
            align: Align::Left,
        }
    }

    fn bold(text: &str) -> Element {
        Element::Bold {
            text: text.to_string(),
            align: Align::Left,
        }
    }

    fn bullets(items: &[&str]) -> Element {
        Element::Bullet {
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn every_kind() -> Vec<Element> {
        vec![
            Element::Title {
                text: "Neural Networks".to_string(),
            },
            bold("Layers of simple units"),
            para("Each unit sums its weighted inputs and applies an activation."),
            bullets(&["Input layer", "Hidden layers", "Output layer"]),
            Element::Icon {
                icon: "\u{1F9E0}".to_string(),
                size: None,
                x: None,
            },
            Element::Spacer { height: 12.0 },
            Element::Diagram {
                kind: Illustration::NeuralNetwork,
                height: None,
            },
            Element::Graph {
                kind: Illustration::Accuracy,
                height: Some(120.0),
            },
            Element::Image {
                path: "brain.png".to_string(),
                x: None,
                width: Some(80.0),
                height: Some(60.0),
            },
            Element::Tooltip {
                text: "What is an activation?".to_string(),
                title: Some("Activation".to_string()),
                body: Some("A squashing function.".to_string()),
                items: vec![],
            },
            Element::Table {
                headers: vec!["A".to_string(), "B".to_string()],
                rows: vec![vec!["1".to_string(), "2".to_string()]],
                width: None,
            },
        ]
    }

    /// Layout without a ceiling so nothing is pinned.
    fn unclamped(elements: &[Element]) -> SlideLayout {
        let area = FlowArea {
            origin: pos2(CONTENT_LEFT, 0.0),
            width: CONTENT_WIDTH,
            ceiling: f32::INFINITY,
        };
        layout_elements(elements, &Theme::light(), &EstimateMeasure::default(), area)
    }

    #[test]
    fn test_cursor_matches_height_rules() {
        let elements = every_kind();
        let layout = unclamped(&elements);
        assert_eq!(layout.placements.len(), elements.len());

        for pair in layout.placements.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert_relative_eq!(b.pos.y, a.pos.y + a.height() + a.gap_after);
        }
        assert_eq!(layout.pinned_count(), 0);
    }

    #[test]
    fn test_documented_heights() {
        let theme = Theme::light();
        let m = EstimateMeasure::default();
        let layout = unclamped(&every_kind());
        let h: Vec<f32> = layout.placements.iter().map(|p| p.height()).collect();

        let title = m.measure_text("Neural Networks", theme.title_size, true, CONTENT_WIDTH);
        assert_relative_eq!(h[0], title.y + TEXT_BUFFER);
        assert_relative_eq!(h[4], DEFAULT_ICON_SIZE);
        assert_relative_eq!(h[5], 12.0);
        assert_relative_eq!(h[6], DEFAULT_DIAGRAM_HEIGHT);
        assert_relative_eq!(h[7], 120.0);
        assert_relative_eq!(h[8], 60.0);
        let trigger = m.measure_text(
            "What is an activation?",
            theme.body_size,
            false,
            paragraph_wrap_width(CONTENT_WIDTH),
        );
        assert_relative_eq!(h[9], trigger.y);
        assert_relative_eq!(h[10], TABLE_HEADER_HEIGHT + TABLE_ROW_HEIGHT);
    }

    #[test]
    fn test_gap_rules() {
        let title = Element::Title {
            text: "T".to_string(),
        };
        let tooltip = Element::Tooltip {
            text: "t".to_string(),
            title: None,
            body: None,
            items: vec![],
        };
        assert_relative_eq!(gap_after(&para("a"), Some(&para("b"))), ELEMENT_GAP);
        assert_relative_eq!(
            gap_after(&bold("a"), Some(&para("b"))),
            ELEMENT_GAP + BOLD_GAP_BONUS + BOLD_PARAGRAPH_BONUS
        );
        assert_relative_eq!(
            gap_after(&bold("a"), Some(&title)),
            ELEMENT_GAP + BOLD_GAP_BONUS
        );
        assert_relative_eq!(
            gap_after(&tooltip, None),
            ELEMENT_GAP + TOOLTIP_GAP_BONUS
        );
        assert_relative_eq!(gap_after(&Element::Spacer { height: 40.0 }, Some(&title)), 0.0);
        assert_relative_eq!(gap_after(&Element::Unsupported, Some(&title)), 0.0);
    }

    #[test]
    fn test_spacer_adds_only_its_height() {
        let layout = unclamped(&[Element::Spacer { height: 50.0 }, para("after")]);
        assert_relative_eq!(layout.placements[1].pos.y, 50.0);
    }

    #[test]
    fn test_bullet_height_matches_rows() {
        let theme = Theme::light();
        let m = EstimateMeasure::default();
        let long = "Gradient descent nudges every weight a little in the direction that \
                    reduces the loss, repeating until the predictions stop improving noticeably.";
        let items = ["Short", long, "Medium length item that may wrap once on narrow slides"];
        let element = bullets(&items);
        let width = 420.0;

        let extent = measure(&element, &theme, &m, width);
        let Extent::Rows { rows, height } = &extent else {
            panic!("bullets should measure as rows");
        };
        assert_eq!(rows.len(), 3);
        assert!(rows[1] > BULLET_MIN_ROW, "long item must wrap");
        assert_relative_eq!(rows[0], BULLET_MIN_ROW);

        // What the renderer draws: each item's text height, floored at the row minimum.
        let drawn: f32 = items
            .iter()
            .map(|t| {
                m.measure_text(t, theme.body_size, false, bullet_wrap_width(width))
                    .y
                    .max(BULLET_MIN_ROW)
            })
            .sum::<f32>()
            + BULLET_SPACING * 2.0;
        assert!((height - drawn).abs() <= TEXT_BUFFER);

        let offsets = extent.row_offsets();
        assert_relative_eq!(offsets[0], 0.0);
        assert_relative_eq!(offsets[2], rows[0] + rows[1] + 2.0 * BULLET_SPACING);
        assert_relative_eq!(offsets[2] + rows[2], *height);
    }

    #[test]
    fn test_empty_bullet_list() {
        let extent = measure(&bullets(&[]), &Theme::light(), &EstimateMeasure::default(), 500.0);
        assert_relative_eq!(extent.height(), 0.0);
    }

    #[test]
    fn test_cursor_pins_at_ceiling() {
        let elements: Vec<Element> = (0..6).map(|_| Element::Spacer { height: 150.0 }).collect();
        let layout = layout_slide(&elements, &Theme::light(), &EstimateMeasure::default());
        let ys: Vec<f32> = layout.placements.iter().map(|p| p.pos.y).collect();

        assert_relative_eq!(ys[0], CONTENT_TOP);
        assert_relative_eq!(ys[1], CONTENT_TOP + 150.0);
        assert_relative_eq!(ys[3], CONTENT_TOP + 450.0);
        assert_relative_eq!(ys[4], CURSOR_CEILING);
        assert_relative_eq!(ys[5], CURSOR_CEILING);
        assert!(!layout.placements[3].pinned);
        assert!(layout.placements[4].pinned);
        assert!(layout.placements[5].pinned);
        assert!(layout.overflowed());
    }

    #[test]
    fn test_estimate_wraps_words() {
        let m = EstimateMeasure::default();
        let one = m.measure_text("hello", 20.0, false, 1000.0);
        let many = m.measure_text("hello world again and again", 20.0, false, 80.0);
        assert_relative_eq!(one.y, 25.0);
        assert!(many.y >= 4.0 * 25.0);
        assert!(many.x <= 80.0 + 0.001);
    }

    /// Estimated text, with every image reporting the same pixel size.
    struct SizedImages(Vec2);

    impl TextMeasure for SizedImages {
        fn measure_text(&self, text: &str, size: f32, bold: bool, wrap_width: f32) -> Vec2 {
            EstimateMeasure::default().measure_text(text, size, bold, wrap_width)
        }

        fn image_size(&self, _path: &str) -> Option<Vec2> {
            Some(self.0)
        }
    }

    fn image(width: Option<f32>, height: Option<f32>) -> Element {
        Element::Image {
            path: "photo.png".to_string(),
            x: None,
            width,
            height,
        }
    }

    fn image_height(element: Element, measurer: &dyn TextMeasure) -> f32 {
        layout_slide(&[element], &Theme::light(), measurer).placements[0].height()
    }

    #[test]
    fn test_image_height_follows_natural_aspect() {
        let measurer = SizedImages(vec2(200.0, 100.0));
        assert_relative_eq!(image_height(image(None, None), &measurer), 100.0);
        assert_relative_eq!(image_height(image(Some(400.0), None), &measurer), 200.0);
        assert_relative_eq!(image_height(image(None, Some(30.0)), &measurer), 30.0);
    }

    #[test]
    fn test_large_image_capped_to_content_width() {
        let measurer = SizedImages(vec2(2000.0, 1000.0));
        let size = image_box(Some(vec2(2000.0, 1000.0)), None, None, CONTENT_WIDTH);
        assert_relative_eq!(size.x, CONTENT_WIDTH);
        assert_relative_eq!(
            image_height(image(None, None), &measurer),
            CONTENT_WIDTH / 2.0
        );
    }

    #[test]
    fn test_unknown_image_without_height_takes_no_space() {
        let measurer = EstimateMeasure::default();
        assert_relative_eq!(image_height(image(None, None), &measurer), 0.0);
        assert_eq!(
            image_box(Some(vec2(0.0, 50.0)), Some(100.0), None, CONTENT_WIDTH),
            vec2(100.0, 0.0)
        );
    }

    fn arb_element() -> impl Strategy<Value = Element> {
        prop_oneof![
            "[a-z ]{0,80}".prop_map(|t| para(&t)),
            "[a-z ]{0,40}".prop_map(|t| bold(&t)),
            (0.0f32..200.0).prop_map(|h| Element::Spacer { height: h }),
            prop::collection::vec("[a-z ]{0,60}", 0..5).prop_map(|items| Element::Bullet { items }),
            (0usize..6).prop_map(|n| Element::Table {
                headers: vec!["h".to_string()],
                rows: vec![vec!["c".to_string()]; n],
                width: None,
            }),
            Just(Element::Unsupported),
        ]
    }

    proptest! {
        #[test]
        fn prop_positions_monotone_and_bounded(elements in prop::collection::vec(arb_element(), 0..16)) {
            let layout = layout_slide(&elements, &Theme::light(), &EstimateMeasure::default());
            let mut last = CONTENT_TOP;
            for p in &layout.placements {
                prop_assert!(p.pos.y >= last);
                prop_assert!(p.pos.y <= CURSOR_CEILING);
                last = p.pos.y;
            }
        }
    }
}
