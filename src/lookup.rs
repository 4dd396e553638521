use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use folio_core::{decode_preview, preview_url, LookupError, PreviewPayload};

use crate::dom::js_err;

pub(crate) async fn fetch_preview(endpoint: &str, path: &str) -> Result<PreviewPayload, LookupError> {
    let window =
        web_sys::window().ok_or_else(|| LookupError::Network("missing window".to_string()))?;
    let url = preview_url(endpoint, path);
    let value = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(|err| LookupError::Network(js_err(err)))?;
    let response: Response = value
        .dyn_into()
        .map_err(|err| LookupError::Network(js_err(err)))?;
    if !response.ok() {
        return Err(LookupError::Status(response.status()));
    }
    let content_type = response.headers().get("content-type").ok().flatten();
    let text = response
        .text()
        .map_err(|err| LookupError::Decode(js_err(err)))?;
    let body = JsFuture::from(text)
        .await
        .map_err(|err| LookupError::Decode(js_err(err)))?
        .as_string()
        .ok_or_else(|| LookupError::Decode("response body is not text".to_string()))?;
    decode_preview(path, content_type.as_deref(), &body)
}
