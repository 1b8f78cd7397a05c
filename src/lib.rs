pub mod assets;
pub mod capture;
pub mod cli;
pub mod config;
pub mod ecs;
pub mod events;
pub mod headless;
pub mod mesh;
pub mod projection;
pub mod scene;
pub mod selection;
pub mod time;
pub mod tree;
pub mod viewer;
pub mod visuals;

pub use headless::run_with_overrides;
pub use viewer::{FrameReport, Viewer};
