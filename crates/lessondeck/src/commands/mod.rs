pub mod check;
pub mod completion;
pub mod config;
pub mod export;
pub mod progress;
pub mod version;
