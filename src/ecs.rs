mod graph;
pub mod systems;
pub mod transform;
mod types;

pub use graph::SceneGraph;
pub use transform::{TransformPropagationScratch, TransformPropagationStats};
pub use types::*;
