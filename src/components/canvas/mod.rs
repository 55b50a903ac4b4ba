//! The diagram engine and its Leptos component.
//!
//! Everything except `component`, `listener` and `render` is plain Rust and
//! runs without a browser.

mod component;
pub mod drop;
pub mod graph;
pub mod interaction;
pub mod layout;
mod listener;
mod render;
pub mod scene;
mod state;
pub mod text;
mod types;

pub use component::DiagramCanvas;
pub use listener::{LoopHandle, WindowListener};
pub use state::{CanvasState, HIT_SLOP, LINK_HIT_WIDTH};
pub use types::{
	DiagramType, ExtractedData, Keyword, Link, LinkId, Node, Point, Shape, Template,
	UnknownDiagramType,
};
