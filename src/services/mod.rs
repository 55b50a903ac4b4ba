//! Adapters for the external keyword and document services, plus the host
//! state that sits between them and the canvas.

mod document;
mod error;
mod keywords;
mod session;

pub use document::{DocumentService, PdfJsDocumentService, join_pages, read_file, submit_document};
pub use error::ServiceError;
pub use keywords::{
	HttpKeywordService, KEYWORD_LIMIT, KeywordService, build_prompt, parse_keyword_response,
	submit_text,
};
pub use session::{ExtractionGate, KeywordSession};

/// Endpoints for the external services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
	/// URL that accepts `{"prompt": ...}` and answers with the model's text.
	pub keyword_endpoint: String,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			keyword_endpoint: "/api/keywords".to_string(),
		}
	}
}
