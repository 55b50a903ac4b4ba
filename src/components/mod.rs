//! Host UI pieces: the input area, keyword checklist, template controls
//! and the diagram canvas.

pub mod canvas;
mod control_panel;
mod input_area;
mod keyword_panel;
mod spinner;

pub use control_panel::ControlPanel;
pub use input_area::InputArea;
pub use keyword_panel::KeywordPanel;
pub use spinner::Spinner;
