use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub muted: Color32,
    pub panel_background: Color32,
    pub panel_border: Color32,
    pub dim_overlay: Color32,
    pub table_header: Color32,
    pub table_row_alt: Color32,
    pub button_background: Color32,
    pub button_disabled: Color32,
    pub header_size: f32,
    pub title_size: f32,
    pub body_size: f32,
    pub bold_size: f32,
    pub table_size: f32,
    pub panel_title_size: f32,
    pub panel_body_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x14, 0x18, 0x26),
            foreground: Color32::from_rgb(0xD8, 0xDC, 0xE6),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x5C, 0xB8, 0xFF),
            muted: Color32::from_rgb(0x8A, 0x93, 0xA8),
            panel_background: Color32::from_rgb(0x22, 0x28, 0x3A),
            panel_border: Color32::from_rgb(0x5C, 0xB8, 0xFF),
            dim_overlay: Color32::from_rgb(0x00, 0x00, 0x00),
            table_header: Color32::from_rgb(0x2C, 0x4A, 0x72),
            table_row_alt: Color32::from_rgb(0x1E, 0x24, 0x36),
            button_background: Color32::from_rgb(0x2F, 0x6F, 0xC0),
            button_disabled: Color32::from_rgb(0x3A, 0x3F, 0x4C),
            header_size: 22.0,
            title_size: 44.0,
            body_size: 24.0,
            bold_size: 26.0,
            table_size: 19.0,
            panel_title_size: 28.0,
            panel_body_size: 22.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF7, 0xF8, 0xFC),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x1A, 0x6B, 0xB5),
            muted: Color32::from_rgb(0x6B, 0x72, 0x80),
            panel_background: Color32::WHITE,
            panel_border: Color32::from_rgb(0x1A, 0x6B, 0xB5),
            dim_overlay: Color32::from_rgb(0x0B, 0x0F, 0x1A),
            table_header: Color32::from_rgb(0xD6, 0xE6, 0xF8),
            table_row_alt: Color32::from_rgb(0xEE, 0xF1, 0xF7),
            button_background: Color32::from_rgb(0x1A, 0x6B, 0xB5),
            button_disabled: Color32::from_rgb(0xB8, 0xBE, 0xC9),
            header_size: 22.0,
            title_size: 44.0,
            body_size: 24.0,
            bold_size: 26.0,
            table_size: 19.0,
            panel_title_size: 28.0,
            panel_body_size: 22.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let opacity = opacity.clamp(0.0, 1.0);
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }

    /// Palette for illustration series and boxes.
    pub fn series_palette(&self) -> [Color32; 4] {
        if self.name == "dark" {
            [
                Color32::from_rgb(0x5C, 0xB8, 0xFF), // bright blue
                Color32::from_rgb(0xFF, 0x7E, 0x67), // coral
                Color32::from_rgb(0x5C, 0xDB, 0x95), // mint green
                Color32::from_rgb(0xE8, 0xA8, 0x38), // amber
            ]
        } else {
            [
                Color32::from_rgb(0x1A, 0x6B, 0xB5), // deep blue
                Color32::from_rgb(0xC7, 0x3E, 0x1D), // brick red
                Color32::from_rgb(0x1E, 0x8A, 0x5A), // forest green
                Color32::from_rgb(0xB8, 0x7B, 0x0A), // dark amber
            ]
        }
    }
}

/// Parse `#RRGGBB` (or `RRGGBB`) into a color.
pub fn parse_hex_color(s: &str) -> Option<Color32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#102030"),
            Some(Color32::from_rgb(0x10, 0x20, 0x30))
        );
        assert_eq!(
            parse_hex_color("ffffff"),
            Some(Color32::from_rgb(255, 255, 255))
        );
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_toggle_theme() {
        assert_eq!(Theme::dark().toggled().name, "light");
        assert_eq!(Theme::from_name("unknown").name, "light");
    }

    #[test]
    fn test_with_opacity_clamps() {
        let c = Theme::with_opacity(Color32::from_rgb(10, 20, 30), 2.0);
        assert_eq!(c.a(), 255);
    }
}
