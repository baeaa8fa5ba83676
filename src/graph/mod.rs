mod model;
mod ops;

pub use model::GraphModel;
pub use ops::{GraphChange, GraphEditor, Viewport};
