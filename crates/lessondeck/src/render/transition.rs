use serde::{Deserialize, Serialize};

/// Horizontal distance the slide container travels while fading.
pub const SLIDE_SHIFT: f32 = 60.0;
pub const DEFAULT_HALF_DURATION: f32 = 0.18;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Fade plus a horizontal shift of the whole slide.
    #[default]
    Slide,
    Fade,
    None,
}

impl TransitionKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "fade" => Self::Fade,
            "none" => Self::None,
            _ => Self::Slide,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::Fade => "fade",
            Self::None => "none",
        }
    }

    pub fn cycled(&self) -> Self {
        match self {
            Self::Slide => Self::Fade,
            Self::Fade => Self::None,
            Self::None => Self::Slide,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDirection {
    Forward,
    Backward,
}

impl TransitionDirection {
    pub fn sign(&self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSettings {
    pub kind: TransitionKind,
    /// Seconds for each of the fade-out and fade-in halves.
    pub half_duration: f32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            kind: TransitionKind::Slide,
            half_duration: DEFAULT_HALF_DURATION,
        }
    }
}

pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ease_endpoints_and_symmetry() {
        assert_relative_eq!(ease_in_out(0.0), 0.0);
        assert_relative_eq!(ease_in_out(1.0), 1.0);
        assert_relative_eq!(ease_in_out(0.5), 0.5);
        for i in 0..=10 {
            let x = i as f32 / 10.0;
            assert_relative_eq!(ease_in_out(1.0 - x), 1.0 - ease_in_out(x), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_kind_names() {
        for kind in [TransitionKind::Slide, TransitionKind::Fade, TransitionKind::None] {
            assert_eq!(TransitionKind::from_name(kind.name()), kind);
        }
        assert_eq!(TransitionKind::from_name("spin"), TransitionKind::Slide);
        assert_eq!(TransitionKind::None.cycled(), TransitionKind::Slide);
    }
}
