/// Failures at the external-call boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
	/// Submitted text was blank.
	#[error("input text is empty")]
	EmptyInput,
	/// Another request is still outstanding.
	#[error("a request is already in flight")]
	Busy,
	/// The request could not be sent or the transport failed.
	#[error("request failed: {0}")]
	Request(String),
	/// The service answered with a non-success status.
	#[error("service responded with status {0}")]
	Status(u16),
	/// The answer did not have the expected shape.
	#[error("could not parse response: {0}")]
	Parse(String),
	/// The uploaded document could not be read.
	#[error("could not parse document: {0}")]
	Document(String),
}

impl ServiceError {
	/// Banner text shown to the user.
	pub fn user_message(&self) -> &'static str {
		match self {
			ServiceError::EmptyInput => "Input text cannot be empty.",
			ServiceError::Busy => "Please wait for the current request to finish.",
			ServiceError::Document(_) => "Failed to process PDF file.",
			ServiceError::Request(_) | ServiceError::Status(_) | ServiceError::Parse(_) => {
				"Failed to extract keywords. Please check your API key and try again."
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn keyword_failures_share_one_message() {
		let messages: Vec<_> = [
			ServiceError::Request("offline".into()),
			ServiceError::Status(500),
			ServiceError::Parse("eof".into()),
		]
		.iter()
		.map(ServiceError::user_message)
		.collect();
		assert!(messages.windows(2).all(|w| w[0] == w[1]));
		assert_eq!(
			ServiceError::Document("bad xref".into()).user_message(),
			"Failed to process PDF file."
		);
	}
}
