use web_sys::Element;

use folio_core::{document_path, resolve_link, PreviewConfig};

use crate::dom;

const LINK_SELECTOR: &str = "a[href]";

#[derive(Clone, Debug)]
pub(crate) struct LinkTarget {
    pub(crate) element: Element,
    pub(crate) path: String,
    pub(crate) in_overlay: bool,
}

/// Finds the qualifying link around `target`, if any. Links inside the
/// overlay resolve relative hrefs against the previewed document instead of
/// the page.
pub(crate) fn qualifying_link(
    target: &Element,
    overlay: Option<&Element>,
    overlay_path: Option<&str>,
    config: &PreviewConfig,
) -> Option<LinkTarget> {
    let link = dom::closest(target, LINK_SELECTOR)?;
    let in_overlay = overlay.is_some_and(|overlay| dom::contains(overlay, &link));
    if !in_preview_scope(&link, in_overlay, config) {
        return None;
    }
    let href = link.get_attribute("href")?;
    let base = if in_overlay {
        overlay_path.map(str::to_string)
    } else {
        current_document_path(config)
    };
    let path = resolve_link(&href, base.as_deref(), &config.links).ok()?;
    Some(LinkTarget {
        element: link,
        path,
        in_overlay,
    })
}

pub(crate) fn current_document_path(config: &PreviewConfig) -> Option<String> {
    let pathname = web_sys::window()?.location().pathname().ok()?;
    document_path(&pathname, &config.links)
}

fn in_preview_scope(link: &Element, in_overlay: bool, config: &PreviewConfig) -> bool {
    let excluded = config
        .excluded_selectors
        .iter()
        .any(|selector| dom::closest(link, selector).is_some());
    if excluded {
        return false;
    }
    in_overlay || dom::closest(link, &config.content_selector).is_some()
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount(html: &str) -> Element {
        let document = dom::document().expect("document available");
        let root = document.create_element("div").expect("create test root");
        root.set_inner_html(html);
        document
            .body()
            .expect("body available")
            .append_child(&root)
            .expect("append test root");
        root
    }

    fn find(root: &Element, selector: &str) -> Element {
        root.query_selector(selector)
            .expect("valid selector")
            .expect("element present")
    }

    #[wasm_bindgen_test]
    fn content_links_qualify() {
        let root = mount(
            r#"<div class="markdown-body"><p><a id="in" href="/view/notes/x"><em>x</em></a></p></div>"#,
        );
        let config = PreviewConfig::default();
        let inner = find(&root, "#in em");
        let link = qualifying_link(&inner, None, None, &config).expect("qualifies");
        assert_eq!(link.path, "notes/x");
        assert_eq!(link.element, find(&root, "#in"));
        assert!(!link.in_overlay);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn excluded_regions_and_outside_links_do_not_qualify() {
        let root = mount(concat!(
            r#"<div class="markdown-body"><ul class="toc-tree"><li><a id="toc" href="/view/a">a</a></li></ul>"#,
            r##"<a id="ext" href="https://example.org/x">x</a><a id="anchor" href="#top">top</a></div>"##,
            r#"<nav><a id="nav" href="/view/b">b</a></nav>"#,
            r#"<div id="settings-modal" class="markdown-body"><a id="cfg" href="/view/c">c</a></div>"#,
        ));
        let config = PreviewConfig::default();
        for id in ["#toc", "#ext", "#anchor", "#nav", "#cfg"] {
            let element = find(&root, id);
            assert!(
                qualifying_link(&element, None, None, &config).is_none(),
                "{id} should not qualify"
            );
        }
        root.remove();
    }

    #[wasm_bindgen_test]
    fn overlay_links_resolve_against_previewed_document() {
        let root = mount(r#"<div class="preview-tooltip"><a id="rel" href="sibling.md">s</a></div>"#);
        let overlay = find(&root, ".preview-tooltip");
        let config = PreviewConfig::default();
        let element = find(&root, "#rel");
        let link = qualifying_link(&element, Some(&overlay), Some("notes/deep/x.md"), &config)
            .expect("qualifies inside overlay");
        assert_eq!(link.path, "notes/deep/sibling.md");
        assert!(link.in_overlay);
        root.remove();
    }
}
