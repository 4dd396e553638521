use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use folio_core::{place_overlay, PlacementConfig, PreviewPayload, Side};

use crate::dom;

const ACTIVE_CLASS: &str = "active";
const LOADING_HTML: &str = r#"<div class="preview-loading">Loading...</div>"#;
const ERROR_HTML: &str = r#"<div class="preview-error">Failed to load preview</div>"#;

/// Owns the one floating preview element. The element is created on first
/// use and reused afterwards; `destroy` detaches it from the document.
pub(crate) struct OverlayPresenter {
    class_name: String,
    placement: PlacementConfig,
    element: Option<HtmlElement>,
    anchor: Option<Element>,
}

impl OverlayPresenter {
    pub(crate) fn new(class_name: &str, placement: PlacementConfig) -> Self {
        Self {
            class_name: class_name.to_string(),
            placement,
            element: None,
            anchor: None,
        }
    }

    pub(crate) fn element(&self) -> Option<&Element> {
        self.element.as_deref()
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.element
            .as_ref()
            .is_some_and(|element| element.is_connected())
    }

    pub(crate) fn contains(&self, target: &Element) -> bool {
        match self.element() {
            Some(element) if self.is_attached() => dom::contains(element, target),
            _ => false,
        }
    }

    pub(crate) fn show(&mut self, anchor: &Element) {
        let Some(element) = self.ensure_element() else {
            gloo::console::warn!("hover preview: cannot create overlay element");
            return;
        };
        if !element.is_connected() {
            let Some(body) = dom::body() else {
                return;
            };
            if let Err(err) = body.append_child(&element) {
                gloo::console::warn!("hover preview: attach failed", dom::js_err(err));
                return;
            }
        }
        let _ = element.class_list().add_1(ACTIVE_CLASS);
        self.anchor = Some(anchor.clone());
        self.reposition(anchor);
    }

    pub(crate) fn render_loading(&mut self) {
        if let Some(element) = self.element.as_ref() {
            element.set_inner_html(LOADING_HTML);
        }
        self.reposition_current();
    }

    pub(crate) fn render_content(&mut self, payload: &PreviewPayload) {
        let (Some(element), Some(document)) = (self.element.as_ref(), dom::document()) else {
            return;
        };
        element.set_inner_html("");
        let built = (|| -> Result<(), wasm_bindgen::JsValue> {
            let header = document.create_element("div")?;
            header.set_class_name("preview-header");
            let title = document.create_element("span")?;
            title.set_class_name("preview-title");
            title.set_text_content(Some(&payload.title));
            header.append_child(&title)?;

            let content = document.create_element("div")?;
            content.set_class_name("preview-content markdown-body");
            content.set_inner_html(&payload.content);

            element.append_child(&header)?;
            element.append_child(&content)?;
            Ok(())
        })();
        if let Err(err) = built {
            gloo::console::warn!("hover preview: render failed", dom::js_err(err));
            element.set_inner_html(ERROR_HTML);
        }
        self.reposition_current();
    }

    pub(crate) fn render_error(&mut self) {
        if let Some(element) = self.element.as_ref() {
            element.set_inner_html(ERROR_HTML);
        }
        self.reposition_current();
    }

    pub(crate) fn reposition(&self, anchor: &Element) {
        let Some(element) = self.element.as_ref() else {
            return;
        };
        let Some(viewport) = dom::viewport() else {
            return;
        };
        let size = element.get_bounding_client_rect();
        let placed = place_overlay(
            dom::rect_of(anchor),
            size.width(),
            size.height(),
            viewport,
            self.placement,
        );
        let style = element.style();
        let _ = style.set_property("top", &format!("{}px", placed.top));
        let _ = style.set_property("left", &format!("{}px", placed.left));
        let side = match placed.side {
            Side::Above => "above",
            Side::Below => "below",
        };
        let _ = element.set_attribute("data-placement", side);
    }

    pub(crate) fn destroy(&mut self) {
        if let Some(element) = self.element.as_ref() {
            element.remove();
            let _ = element.class_list().remove_1(ACTIVE_CLASS);
            element.set_inner_html("");
        }
        self.anchor = None;
    }

    fn reposition_current(&self) {
        if let Some(anchor) = self.anchor.as_ref() {
            self.reposition(anchor);
        }
    }

    fn ensure_element(&mut self) -> Option<HtmlElement> {
        if let Some(element) = self.element.as_ref() {
            return Some(element.clone());
        }
        let document = dom::document()?;
        let element = document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        element.set_class_name(&self.class_name);
        let _ = element.style().set_property("position", "absolute");
        element.set_inner_html(LOADING_HTML);
        self.element = Some(element.clone());
        Some(element)
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn anchor_at(top: f64, left: f64) -> Element {
        let document = dom::document().expect("document available");
        let anchor = document.create_element("a").expect("create anchor");
        anchor.set_text_content(Some("link"));
        let html: &HtmlElement = anchor.dyn_ref().expect("html anchor");
        let style = html.style();
        style.set_property("position", "fixed").expect("position");
        style.set_property("top", &format!("{top}px")).expect("top");
        style.set_property("left", &format!("{left}px")).expect("left");
        dom::body()
            .expect("body available")
            .append_child(&anchor)
            .expect("append anchor");
        anchor
    }

    fn sized_presenter() -> OverlayPresenter {
        let mut presenter = OverlayPresenter::new("preview-tooltip", PlacementConfig::default());
        let element = presenter.ensure_element().expect("overlay element");
        let style = element.style();
        style.set_property("width", "300px").expect("width");
        style.set_property("height", "120px").expect("height");
        style.set_property("overflow", "hidden").expect("overflow");
        presenter
    }

    fn placement_of(presenter: &OverlayPresenter) -> Option<String> {
        presenter.element()?.get_attribute("data-placement")
    }

    #[wasm_bindgen_test]
    fn lifecycle_reuses_single_element() {
        let anchor = anchor_at(400.0, 50.0);
        let mut presenter = sized_presenter();
        presenter.show(&anchor);
        assert!(presenter.is_attached());
        presenter.render_content(&PreviewPayload {
            title: "<b>X</b>".to_string(),
            content: "<p>hi</p>".to_string(),
        });
        let element = presenter.element().cloned().expect("element");
        let title = element
            .query_selector(".preview-title")
            .expect("selector")
            .expect("title present");
        assert_eq!(title.text_content().as_deref(), Some("<b>X</b>"));
        assert!(element.query_selector(".preview-content p").expect("selector").is_some());

        presenter.destroy();
        assert!(!presenter.is_attached());
        presenter.show(&anchor);
        presenter.render_error();
        assert_eq!(presenter.element().cloned(), Some(element.clone()));
        assert!(element.query_selector(".preview-error").expect("selector").is_some());
        presenter.destroy();
        anchor.remove();
    }

    #[wasm_bindgen_test]
    fn flips_below_anchor_near_top() {
        let anchor = anchor_at(5.0, 50.0);
        let mut presenter = sized_presenter();
        presenter.show(&anchor);
        assert_eq!(placement_of(&presenter).as_deref(), Some("below"));
        presenter.destroy();
        anchor.remove();
    }

    #[wasm_bindgen_test]
    fn places_above_anchor_with_room() {
        let anchor = anchor_at(400.0, 50.0);
        let mut presenter = sized_presenter();
        presenter.show(&anchor);
        assert_eq!(placement_of(&presenter).as_deref(), Some("above"));
        presenter.destroy();
        anchor.remove();
    }
}
