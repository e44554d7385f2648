use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::config::WS_PATH;

pub fn websocket_url(window: &Window) -> Result<String, JsValue> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    Ok(websocket_url_for(&protocol, &host))
}

/// Same-origin websocket endpoint, secure when the page itself is.
pub fn websocket_url_for(protocol: &str, host: &str) -> String {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    format!("{scheme}://{host}{WS_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_page_uses_ws() {
        assert_eq!(
            websocket_url_for("http:", "localhost:3000"),
            "ws://localhost:3000/ws"
        );
    }

    #[test]
    fn secure_page_uses_wss() {
        assert_eq!(
            websocket_url_for("https:", "viz.example.org"),
            "wss://viz.example.org/ws"
        );
    }
}
