use super::ServiceError;
use crate::components::canvas::{ExtractedData, Keyword};

/// The last extraction result and which of its keywords are selected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeywordSession {
	data: Option<ExtractedData>,
	selected: Vec<String>,
}

impl KeywordSession {
	/// Replace the result and pre-select every keyword.
	pub fn load(&mut self, data: ExtractedData) {
		self.selected = data.keywords.iter().map(|k| k.name.clone()).collect();
		self.data = Some(data);
	}

	/// Whether an extraction result is loaded.
	pub fn has_data(&self) -> bool {
		self.data.is_some()
	}

	/// All extracted keywords.
	pub fn keywords(&self) -> &[Keyword] {
		self.data
			.as_ref()
			.map(|d| d.keywords.as_slice())
			.unwrap_or_default()
	}

	/// Whether `name` is selected.
	pub fn is_selected(&self, name: &str) -> bool {
		self.selected.iter().any(|s| s == name)
	}

	/// Number of selected names.
	pub fn selected_count(&self) -> usize {
		self.selected.len()
	}

	/// Whether anything is selected.
	pub fn has_selection(&self) -> bool {
		!self.selected.is_empty()
	}

	/// Flip one keyword in or out of the selection.
	pub fn toggle(&mut self, name: &str) {
		if let Some(i) = self.selected.iter().position(|s| s == name) {
			self.selected.remove(i);
		} else {
			self.selected.push(name.to_string());
		}
	}

	/// Select every keyword.
	pub fn select_all(&mut self) {
		self.selected = self.keywords().iter().map(|k| k.name.clone()).collect();
	}

	/// Select nothing.
	pub fn deselect_all(&mut self) {
		self.selected.clear();
	}

	/// Selected keywords in extraction order.
	pub fn selected_keywords(&self) -> Vec<Keyword> {
		self.keywords()
			.iter()
			.filter(|k| self.is_selected(&k.name))
			.cloned()
			.collect()
	}
}

/// Allows one outstanding external request at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractionGate {
	in_flight: Option<String>,
}

impl ExtractionGate {
	/// Claim the gate, showing `message` while the request runs.
	pub fn begin(&mut self, message: impl Into<String>) -> Result<(), ServiceError> {
		if self.in_flight.is_some() {
			return Err(ServiceError::Busy);
		}
		self.in_flight = Some(message.into());
		Ok(())
	}

	/// Release the gate.
	pub fn finish(&mut self) {
		self.in_flight = None;
	}

	/// Whether a request is outstanding.
	pub fn is_busy(&self) -> bool {
		self.in_flight.is_some()
	}

	/// Spinner message for the outstanding request.
	pub fn message(&self) -> Option<&str> {
		self.in_flight.as_deref()
	}
}
