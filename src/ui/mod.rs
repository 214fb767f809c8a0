pub mod editor;
pub mod input_metrics;
pub mod prompt;
pub mod render;
