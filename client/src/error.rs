use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing window")]
    MissingWindow,
    #[error("missing document")]
    MissingDocument,
    #[error("missing element: {0}")]
    MissingElement(String),
    #[error("invalid element type: {0}")]
    InvalidElement(String),
    #[error("canvas has no 2d context")]
    MissingContext,
    #[error("websocket is not open")]
    NotOpen,
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for ClientError {
    fn from(value: JsValue) -> Self {
        ClientError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<ClientError> for JsValue {
    fn from(error: ClientError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}
