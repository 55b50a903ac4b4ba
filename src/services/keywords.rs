use log::{debug, error};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::ServiceError;
use crate::components::canvas::ExtractedData;

/// Upper bound on keywords requested per extraction.
pub const KEYWORD_LIMIT: usize = 100;

/// Extracts `{name, description}` records from raw text.
#[allow(async_fn_in_trait)]
pub trait KeywordService {
	/// Any failure is reported as a single error; callers do not retry.
	async fn extract_keywords(&self, text: &str) -> Result<ExtractedData, ServiceError>;
}

/// Prompt asking the model for a JSON keyword list.
pub fn build_prompt(text: &str) -> String {
	format!(
		"Analyze the following text and extract up to {KEYWORD_LIMIT} of the most important and \
		 relevant key concepts, topics, and entities.\n\
		 For each keyword, provide a brief, one-sentence description.\n\n\
		 Respond ONLY with a JSON object of the form \
		 {{\"keywords\": [{{\"name\": string, \"description\": string}}]}}.\n\n\
		 Text to analyze:\n---\n{text}\n---\n"
	)
}

/// Parse the model's answer, tolerating a Markdown code fence around it.
pub fn parse_keyword_response(raw: &str) -> Result<ExtractedData, ServiceError> {
	let mut body = raw.trim();
	body = body
		.strip_prefix("```json")
		.or_else(|| body.strip_prefix("```"))
		.unwrap_or(body);
	body = body.strip_suffix("```").unwrap_or(body).trim();
	serde_json::from_str(body).map_err(|e| {
		error!("failed to parse keyword response: {}", e);
		debug!("raw response: {}", raw);
		ServiceError::Parse(e.to_string())
	})
}

/// Validate `text` and hand it to `service`.
pub async fn submit_text<S: KeywordService + ?Sized>(
	service: &S,
	text: &str,
) -> Result<ExtractedData, ServiceError> {
	if text.trim().is_empty() {
		return Err(ServiceError::EmptyInput);
	}
	let data = service.extract_keywords(text).await?;
	debug!("extracted {} keywords", data.keywords.len());
	Ok(data)
}

/// Posts the prompt to an HTTP endpoint that fronts the language model.
#[derive(Clone, Debug)]
pub struct HttpKeywordService {
	endpoint: String,
}

#[derive(Serialize)]
struct PromptRequest<'a> {
	prompt: &'a str,
}

fn js_error(e: JsValue) -> ServiceError {
	ServiceError::Request(format!("{e:?}"))
}

impl HttpKeywordService {
	/// Service posting to `endpoint`.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
		}
	}

	async fn post(&self, body: &str) -> Result<String, ServiceError> {
		let window =
			web_sys::window().ok_or_else(|| ServiceError::Request("no window".to_string()))?;
		let init = RequestInit::new();
		init.set_method("POST");
		init.set_body(&JsValue::from_str(body));
		let request = Request::new_with_str_and_init(&self.endpoint, &init).map_err(js_error)?;
		request
			.headers()
			.set("Content-Type", "application/json")
			.map_err(js_error)?;

		let response: Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(js_error)?
			.dyn_into()
			.map_err(js_error)?;
		if !response.ok() {
			return Err(ServiceError::Status(response.status()));
		}
		JsFuture::from(response.text().map_err(js_error)?)
			.await
			.map_err(js_error)?
			.as_string()
			.ok_or_else(|| ServiceError::Parse("response body is not text".to_string()))
	}
}

impl KeywordService for HttpKeywordService {
	async fn extract_keywords(&self, text: &str) -> Result<ExtractedData, ServiceError> {
		let prompt = build_prompt(text);
		let body = serde_json::to_string(&PromptRequest { prompt: &prompt })
			.map_err(|e| ServiceError::Request(e.to_string()))?;
		let raw = self.post(&body).await?;
		parse_keyword_response(&raw)
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::canvas::Keyword;

	struct Canned(&'static str);

	impl KeywordService for Canned {
		async fn extract_keywords(&self, _text: &str) -> Result<ExtractedData, ServiceError> {
			parse_keyword_response(self.0)
		}
	}

	#[test]
	fn fenced_response_is_unwrapped() {
		let raw = "```json\n{\"keywords\":[{\"name\":\"fox\",\"description\":\"An animal\"}]}\n```";
		assert_eq!(
			parse_keyword_response(raw).unwrap().keywords,
			vec![Keyword::new("fox", "An animal")]
		);
	}

	#[test]
	fn response_without_keywords_is_a_parse_failure() {
		assert!(matches!(
			parse_keyword_response("{\"topics\": []}"),
			Err(ServiceError::Parse(_))
		));
		assert!(matches!(
			parse_keyword_response("Sorry, I can't help with that."),
			Err(ServiceError::Parse(_))
		));
	}

	#[test]
	fn blank_text_is_rejected_before_calling_out() {
		let service = Canned("not json");
		assert_eq!(
			block_on(submit_text(&service, "  \n\t")),
			Err(ServiceError::EmptyInput)
		);
	}

	#[test]
	fn prompt_embeds_the_text_and_limit() {
		let prompt = build_prompt("The quick brown fox");
		assert!(prompt.contains("---\nThe quick brown fox\n---"));
		assert!(prompt.contains("up to 100"));
	}
}
