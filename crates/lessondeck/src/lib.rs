//! Interactive lesson slides: deck model, slide layout, rendering, and the
//! navigation controller that presents a deck and reports completion.

pub mod activity;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod deck;
pub mod error;
pub mod layout;
pub mod presenter;
pub mod render;
pub mod store;
pub mod telemetry;
pub mod theme;
pub mod tooltip;

pub use deck::{Deck, Element, Slide};
pub use error::{DeckError, Result};
pub use presenter::{Presenter, PresenterState};
