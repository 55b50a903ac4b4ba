//! Drag-and-drop bridge between the keyword bank and the canvas.
//!
//! A dragged keyword travels as JSON under two MIME types; either one is
//! enough to complete the drop.

use log::{debug, error, warn};

use super::graph::{GraphError, GraphStore};
use super::layout::Layout;
use super::types::{Keyword, Point};

/// Primary transfer format.
pub const JSON_FORMAT: &str = "application/json";
/// Fallback transfer format for browsers that drop custom types.
pub const TEXT_FORMAT: &str = "text/plain";

/// Why a drop payload could not be read.
#[derive(Debug, thiserror::Error)]
pub enum DropError {
	/// Neither transfer format carried data.
	#[error("drop carried no keyword data")]
	MissingPayload,
	/// The data was not a keyword record.
	#[error("malformed keyword payload: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// The two transfer slots read from a drop event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferPayload {
	/// Contents under [`JSON_FORMAT`].
	pub json: Option<String>,
	/// Contents under [`TEXT_FORMAT`].
	pub text: Option<String>,
}

impl TransferPayload {
	/// Both slots carrying the same serialized keyword.
	pub fn of(keyword: &Keyword) -> Result<Self, serde_json::Error> {
		let data = start_drag(keyword)?;
		Ok(Self {
			json: Some(data.clone()),
			text: Some(data),
		})
	}

	fn data(&self) -> Option<&str> {
		[&self.json, &self.text]
			.into_iter()
			.flatten()
			.map(String::as_str)
			.find(|s| !s.trim().is_empty())
	}
}

/// Outcome of a completed drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
	/// A new node with this id was added.
	Placed(String),
	/// A node with this id already exists; nothing changed.
	AlreadyPlaced(String),
	/// The payload was unreadable; nothing changed.
	Ignored,
}

/// Serialize `keyword` as the drag payload.
pub fn start_drag(keyword: &Keyword) -> Result<String, serde_json::Error> {
	serde_json::to_string(keyword)
}

/// Read the keyword out of whichever transfer slot is populated.
pub fn decode(payload: &TransferPayload) -> Result<Keyword, DropError> {
	let data = payload.data().ok_or(DropError::MissingPayload)?;
	Ok(serde_json::from_str(data)?)
}

/// Place the dropped keyword at canvas-local `at`.
///
/// Unreadable payloads and duplicates are logged and otherwise ignored.
pub fn complete_drop(
	store: &mut GraphStore,
	layout: &Layout,
	payload: &TransferPayload,
	at: Point,
) -> DropOutcome {
	let keyword = match decode(payload) {
		Ok(keyword) => keyword,
		Err(DropError::MissingPayload) => {
			warn!("no keyword data found in drop");
			return DropOutcome::Ignored;
		}
		Err(e) => {
			error!("failed to parse dropped keyword: {}", e);
			return DropOutcome::Ignored;
		}
	};
	match store.add_node(&keyword, layout.place(Some(at))) {
		Ok(()) => DropOutcome::Placed(keyword.name),
		Err(GraphError::DuplicateNode(id)) => {
			debug!("`{}` is already on the canvas", id);
			DropOutcome::AlreadyPlaced(id)
		}
		Err(e) => {
			error!("drop rejected: {}", e);
			DropOutcome::Ignored
		}
	}
}
