#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod detection;
pub mod geometry;
pub mod id_generator;
pub mod mask;
pub mod page;
pub mod project;
pub mod renderer;
pub mod settings;
pub mod tools;

pub use app::StudymaskApp;
pub use command::{Command, CommandHistory};
pub use mask::{Mask, MaskId, MaskShape};
pub use page::{Page, PageId};
pub use project::Project;
pub use renderer::Renderer;
pub use settings::Settings;
pub use tools::{DrawingController, ToolMode};
