use std::cell::RefCell;

use gloo::events::EventListener;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, HtmlInputElement, HtmlSelectElement};

use folio_core::settings::{code_line_count, LINE_NUMBERS_CLASS, READABLE_WIDTH_CLASS};
use folio_core::{FontSize, ReaderSettings, ThemeMode};

use crate::dom;

const FONT_SIZE_CONTROL: &str = "setting-font-size";
const READABLE_WIDTH_CONTROL: &str = "setting-readable-width";
const LINE_NUMBERS_CONTROL: &str = "setting-line-numbers";
const THEME_MODE_CONTROL: &str = "setting-theme-mode";
const MERMAID_THEME_CONTROL: &str = "setting-mermaid-theme";

const SETTINGS_MODAL: &str = "settings-modal";
const OPEN_BUTTON: &str = "settings-open-btn";
const CLOSE_BUTTON: &str = "close-settings-modal";
const MODAL_ACTIVE_CLASS: &str = "active";
const NO_SCROLL_CLASS: &str = "no-scroll";
const LINE_NUMBER_ROWS_CLASS: &str = "line-number-rows";

thread_local! {
    static SETTINGS: RefCell<ReaderSettings> = RefCell::new(ReaderSettings::default());
    static LISTENERS: RefCell<Vec<EventListener>> = RefCell::new(Vec::new());
}

pub(crate) fn load_settings() -> ReaderSettings {
    let Some(storage) = dom::local_storage() else {
        return ReaderSettings::default();
    };
    ReaderSettings::from_stored(|key| storage.get_item(key).ok().flatten())
}

pub(crate) fn save_settings(settings: &ReaderSettings) {
    let Some(storage) = dom::local_storage() else {
        return;
    };
    for (key, value) in settings.stored_pairs() {
        if let Err(err) = storage.set_item(key, &value) {
            gloo::console::warn!("settings: save failed", key, dom::js_err(err));
        }
    }
}

pub(crate) fn apply_settings(settings: &ReaderSettings) {
    let Some(document) = dom::document() else {
        return;
    };
    if let Some(root) = document.document_element() {
        let _ = root.set_attribute("data-theme", settings.theme.as_str());
    }
    if let Some(body) = document.body() {
        let classes = body.class_list();
        for size in FontSize::ALL {
            let _ = classes.remove_1(size.class_name());
        }
        let _ = classes.add_1(settings.font_size.class_name());
        let _ = classes.toggle_with_force(READABLE_WIDTH_CLASS, settings.readable_width);
    }
    if let Err(err) = apply_line_numbers(settings.line_numbers) {
        gloo::console::warn!("settings: line numbers failed", dom::js_err(err));
    }
}

fn apply_line_numbers(enabled: bool) -> Result<(), JsValue> {
    let Some(document) = dom::document() else {
        return Ok(());
    };
    let codes = document.query_selector_all("pre code")?;
    for index in 0..codes.length() {
        let Some(code) = codes.item(index) else {
            continue;
        };
        let Some(pre) = code.parent_element() else {
            continue;
        };
        let existing = pre.query_selector(&format!(".{LINE_NUMBER_ROWS_CLASS}"))?;
        if enabled {
            pre.class_list().add_1(LINE_NUMBERS_CLASS)?;
            if existing.is_none() {
                let text = code.text_content().unwrap_or_default();
                let rows = document.create_element("span")?;
                rows.set_class_name(LINE_NUMBER_ROWS_CLASS);
                rows.set_inner_html(&"<span></span>".repeat(code_line_count(&text)));
                pre.append_child(&rows)?;
            }
        } else {
            pre.class_list().remove_1(LINE_NUMBERS_CLASS)?;
            if let Some(rows) = existing {
                rows.remove();
            }
        }
    }
    Ok(())
}

/// Populates the settings form and wires change listeners. Missing controls
/// are skipped.
pub(crate) fn install(settings: ReaderSettings) {
    let Some(document) = dom::document() else {
        return;
    };
    let mut listeners = Vec::new();

    if let Some(select) = select_control(&document, FONT_SIZE_CONTROL) {
        select.set_value(settings.font_size.as_str());
        listeners.push(EventListener::new(&select, "change", move |event| {
            let Some(value) = event_select_value(event) else {
                return;
            };
            match FontSize::parse(&value) {
                Some(size) => update(|settings| settings.font_size = size),
                None => gloo::console::warn!("settings: unknown font size", value),
            }
        }));
    }
    if let Some(select) = select_control(&document, THEME_MODE_CONTROL) {
        select.set_value(settings.theme.as_str());
        listeners.push(EventListener::new(&select, "change", move |event| {
            let Some(value) = event_select_value(event) else {
                return;
            };
            match ThemeMode::parse(&value) {
                Some(theme) => update(|settings| settings.theme = theme),
                None => gloo::console::warn!("settings: unknown theme", value),
            }
        }));
    }
    if let Some(select) = select_control(&document, MERMAID_THEME_CONTROL) {
        select.set_value(&settings.mermaid_theme);
        listeners.push(EventListener::new(&select, "change", move |event| {
            let Some(value) = event_select_value(event) else {
                return;
            };
            if !value.trim().is_empty() {
                update(|settings| settings.mermaid_theme = value.trim().to_string());
            }
        }));
    }
    if let Some(check) = checkbox_control(&document, READABLE_WIDTH_CONTROL) {
        check.set_checked(settings.readable_width);
        listeners.push(EventListener::new(&check, "change", move |event| {
            if let Some(checked) = event_checked(event) {
                update(|settings| settings.readable_width = checked);
            }
        }));
    }
    if let Some(check) = checkbox_control(&document, LINE_NUMBERS_CONTROL) {
        check.set_checked(settings.line_numbers);
        listeners.push(EventListener::new(&check, "change", move |event| {
            if let Some(checked) = event_checked(event) {
                update(|settings| settings.line_numbers = checked);
            }
        }));
    }
    listeners.extend(modal_listeners(&document));

    SETTINGS.with(|slot| *slot.borrow_mut() = settings);
    LISTENERS.with(|slot| *slot.borrow_mut() = listeners);
}

fn update(change: impl FnOnce(&mut ReaderSettings)) {
    let settings = SETTINGS.with(|slot| {
        let mut settings = slot.borrow_mut();
        change(&mut settings);
        settings.clone()
    });
    save_settings(&settings);
    apply_settings(&settings);
}

fn modal_listeners(document: &web_sys::Document) -> Vec<EventListener> {
    let Some(modal) = document.get_element_by_id(SETTINGS_MODAL) else {
        return Vec::new();
    };
    let mut listeners = Vec::new();
    if let Some(open) = document.get_element_by_id(OPEN_BUTTON) {
        let modal = modal.clone();
        listeners.push(EventListener::new(&open, "click", move |_| {
            set_modal_open(&modal, true);
        }));
    }
    if let Some(close) = document.get_element_by_id(CLOSE_BUTTON) {
        let modal = modal.clone();
        listeners.push(EventListener::new(&close, "click", move |_| {
            set_modal_open(&modal, false);
        }));
    }
    let backdrop = modal.clone();
    listeners.push(EventListener::new(&modal, "click", move |event| {
        let on_backdrop = dom::event_element(event.target()).is_some_and(|target| target == backdrop);
        if on_backdrop {
            set_modal_open(&backdrop, false);
        }
    }));
    listeners
}

fn set_modal_open(modal: &Element, open: bool) {
    let _ = modal.class_list().toggle_with_force(MODAL_ACTIVE_CLASS, open);
    if let Some(body) = dom::body() {
        let _ = body.class_list().toggle_with_force(NO_SCROLL_CLASS, open);
    }
}

fn select_control(document: &web_sys::Document, id: &str) -> Option<HtmlSelectElement> {
    document.get_element_by_id(id)?.dyn_into().ok()
}

fn checkbox_control(document: &web_sys::Document, id: &str) -> Option<HtmlInputElement> {
    document.get_element_by_id(id)?.dyn_into().ok()
}

fn event_select_value(event: &Event) -> Option<String> {
    Some(event.target()?.dyn_into::<HtmlSelectElement>().ok()?.value())
}

fn event_checked(event: &Event) -> Option<bool> {
    Some(event.target()?.dyn_into::<HtmlInputElement>().ok()?.checked())
}
