mod animation;

pub use animation::*;
