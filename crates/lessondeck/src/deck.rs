use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeckError, Result};

/// An ordered set of slides presented as one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Level this deck introduces; used for progress tracking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default)]
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub elements: Vec<Element>,

    /// `#RRGGBB` background override.
    #[serde(
        default,
        alias = "backgroundColor",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One content block within a slide. The `type` tag selects the variant;
/// fields not used by that variant are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Element {
    Title {
        text: String,
    },
    Paragraph {
        text: String,
        #[serde(default)]
        align: Align,
    },
    Bullet {
        #[serde(default)]
        items: Vec<String>,
    },
    Bold {
        text: String,
        #[serde(default)]
        align: Align,
    },
    Icon {
        icon: String,
        #[serde(default)]
        size: Option<f32>,
        /// Horizontal center in canvas units; defaults to the content center.
        #[serde(default)]
        x: Option<f32>,
    },
    Diagram {
        #[serde(alias = "diagramType")]
        kind: Illustration,
        #[serde(default)]
        height: Option<f32>,
    },
    Graph {
        #[serde(alias = "graphType")]
        kind: Illustration,
        #[serde(default)]
        height: Option<f32>,
    },
    Image {
        #[serde(alias = "key")]
        path: String,
        #[serde(default)]
        x: Option<f32>,
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
    },
    Spacer {
        #[serde(default = "default_spacer_height")]
        height: f32,
    },
    Tooltip {
        text: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default, alias = "content")]
        body: Option<String>,
        #[serde(default)]
        items: Vec<String>,
    },
    Table {
        #[serde(default)]
        headers: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<String>>,
        #[serde(default)]
        width: Option<f32>,
    },
    /// Any unrecognized `type`. Draws nothing and takes no space.
    #[serde(other)]
    Unsupported,
}

fn default_spacer_height() -> f32 {
    20.0
}

impl Element {
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::Title { .. } => "title",
            Element::Paragraph { .. } => "paragraph",
            Element::Bullet { .. } => "bullet",
            Element::Bold { .. } => "bold",
            Element::Icon { .. } => "icon",
            Element::Diagram { .. } => "diagram",
            Element::Graph { .. } => "graph",
            Element::Image { .. } => "image",
            Element::Spacer { .. } => "spacer",
            Element::Tooltip { .. } => "tooltip",
            Element::Table { .. } => "table",
            Element::Unsupported => "unsupported",
        }
    }

    pub fn is_tooltip(&self) -> bool {
        matches!(self, Element::Tooltip { .. })
    }
}

/// Hand-composed illustrations drawn for `diagram` and `graph` elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Illustration {
    AiHierarchy,
    NeuralNetwork,
    Scatter,
    Accuracy,
    Loss,
    DecisionBoundary,
    Other(String),
}

impl From<String> for Illustration {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ai-hierarchy" => Illustration::AiHierarchy,
            "neural-network" => Illustration::NeuralNetwork,
            "scatter" => Illustration::Scatter,
            "accuracy" => Illustration::Accuracy,
            "loss" => Illustration::Loss,
            "decision-boundary" => Illustration::DecisionBoundary,
            _ => Illustration::Other(s),
        }
    }
}

impl From<Illustration> for String {
    fn from(kind: Illustration) -> Self {
        kind.name().to_string()
    }
}

impl Illustration {
    pub fn name(&self) -> &str {
        match self {
            Illustration::AiHierarchy => "ai-hierarchy",
            Illustration::NeuralNetwork => "neural-network",
            Illustration::Scatter => "scatter",
            Illustration::Accuracy => "accuracy",
            Illustration::Loss => "loss",
            Illustration::DecisionBoundary => "decision-boundary",
            Illustration::Other(name) => name,
        }
    }
}

impl Deck {
    /// Parse a deck from YAML. JSON documents are accepted as well.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| DeckError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Display title: explicit title, else the first slide's title.
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or_else(|| self.slides.first().map(|s| s.title.as_str()))
            .filter(|t| !t.is_empty())
    }
}
