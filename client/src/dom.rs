use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::error::ClientError;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, ClientError> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| ClientError::MissingElement(id.to_string()))?;
    element
        .dyn_into::<T>()
        .map_err(|_| ClientError::InvalidElement(id.to_string()))
}

/// `document.readyState` once every subresource has loaded.
pub fn document_is_loaded(ready_state: &str) -> bool {
    ready_state == "complete"
}

pub fn create_element<T: JsCast>(document: &Document, tag: &str) -> Result<T, ClientError> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| ClientError::InvalidElement(tag.to_string()))
}

pub fn set_text(element: &Element, text: &str) {
    element.set_text_content(Some(text));
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        log::warn!("set_style {property}={value} failed: {err:?}");
    }
}

pub fn set_status(status_el: &Element, class: &str, text: &str) {
    status_el.set_class_name(class);
    set_text(status_el, text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_complete_counts_as_loaded() {
        assert!(document_is_loaded("complete"));
        assert!(!document_is_loaded("interactive"));
        assert!(!document_is_loaded("loading"));
    }
}
