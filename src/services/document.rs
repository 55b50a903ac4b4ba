//! PDF text extraction through the page's global `pdfjsLib`.

use js_sys::{Array, Reflect, Uint8Array};
use log::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::{KeywordService, ServiceError, submit_text};
use crate::components::canvas::ExtractedData;

/// Turns an uploaded document into plain text.
#[allow(async_fn_in_trait)]
pub trait DocumentService {
	/// Text of every page, in order.
	async fn extract_text(&self, bytes: &[u8]) -> Result<String, ServiceError>;
}

/// Join per-page text runs: runs separated by a space, one line per page.
pub fn join_pages(pages: &[Vec<String>]) -> String {
	pages.iter().map(|runs| runs.join(" ") + "\n").collect()
}

/// Extract a document's text and submit it for keyword extraction.
pub async fn submit_document<D, K>(
	documents: &D,
	keywords: &K,
	bytes: &[u8],
) -> Result<ExtractedData, ServiceError>
where
	D: DocumentService + ?Sized,
	K: KeywordService + ?Sized,
{
	let text = documents.extract_text(bytes).await?;
	submit_text(keywords, &text).await
}

/// Read an uploaded file's bytes.
pub async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, ServiceError> {
	let buffer = JsFuture::from(file.array_buffer())
		.await
		.map_err(|e| ServiceError::Document(format!("failed to read file: {e:?}")))?;
	Ok(Uint8Array::new(&buffer).to_vec())
}

#[wasm_bindgen]
extern "C" {
	type PdfLoadingTask;

	#[wasm_bindgen(catch, js_namespace = pdfjsLib, js_name = getDocument)]
	fn get_document(data: &Uint8Array) -> Result<PdfLoadingTask, JsValue>;

	#[wasm_bindgen(method, getter)]
	fn promise(this: &PdfLoadingTask) -> js_sys::Promise;

	type PdfDocument;

	#[wasm_bindgen(method, getter, js_name = numPages)]
	fn num_pages(this: &PdfDocument) -> u32;

	#[wasm_bindgen(method, js_name = getPage)]
	fn get_page(this: &PdfDocument, number: u32) -> js_sys::Promise;

	type PdfPage;

	#[wasm_bindgen(method, js_name = getTextContent)]
	fn get_text_content(this: &PdfPage) -> js_sys::Promise;
}

/// pdf.js-backed extraction. The page must load pdf.js before use.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfJsDocumentService;

fn document_error(e: JsValue) -> ServiceError {
	error!("error parsing PDF: {:?}", e);
	ServiceError::Document(format!("{e:?}"))
}

fn text_runs(content: &JsValue) -> Result<Vec<String>, ServiceError> {
	let items: Array = Reflect::get(content, &JsValue::from_str("items"))
		.map_err(document_error)?
		.dyn_into()
		.map_err(document_error)?;
	Ok(items
		.iter()
		.filter_map(|item| Reflect::get(&item, &JsValue::from_str("str")).ok()?.as_string())
		.collect())
}

impl DocumentService for PdfJsDocumentService {
	async fn extract_text(&self, bytes: &[u8]) -> Result<String, ServiceError> {
		let task = get_document(&Uint8Array::from(bytes)).map_err(document_error)?;
		let pdf: PdfDocument = JsFuture::from(task.promise())
			.await
			.map_err(document_error)?
			.unchecked_into();
		let mut pages = Vec::with_capacity(pdf.num_pages() as usize);
		for number in 1..=pdf.num_pages() {
			let page: PdfPage = JsFuture::from(pdf.get_page(number))
				.await
				.map_err(document_error)?
				.unchecked_into();
			let content = JsFuture::from(page.get_text_content())
				.await
				.map_err(document_error)?;
			pages.push(text_runs(&content)?);
		}
		Ok(join_pages(&pages))
	}
}
