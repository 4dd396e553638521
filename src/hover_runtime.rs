use std::cell::RefCell;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, MouseEvent};

use folio_core::{HoverCommand, HoverController, PreviewConfig, RequestId};

use crate::dom;
use crate::link_target;
use crate::lookup;
use crate::overlay::OverlayPresenter;

struct HoverRuntime {
    config: PreviewConfig,
    controller: HoverController<Element>,
    overlay: OverlayPresenter,
    intent_timer: Option<Timeout>,
    hide_timer: Option<Timeout>,
    _listeners: Vec<EventListener>,
}

thread_local! {
    static STATE: RefCell<Option<HoverRuntime>> = RefCell::new(None);
}

pub(crate) fn install(config: PreviewConfig) {
    let Some(document) = dom::document() else {
        gloo::console::warn!("hover preview: no document, not installing");
        return;
    };
    let listeners = vec![
        EventListener::new(&document, "mouseover", on_mouseover),
        EventListener::new(&document, "mouseout", on_mouseout),
    ];
    let runtime = HoverRuntime {
        controller: HoverController::new(config.timing),
        overlay: OverlayPresenter::new(&config.overlay_class, config.placement),
        intent_timer: None,
        hide_timer: None,
        _listeners: listeners,
        config,
    };
    let endpoint = runtime.config.endpoint.clone();
    STATE.with(|slot| {
        *slot.borrow_mut() = Some(runtime);
    });
    gloo::console::log!("hover preview: installed", endpoint);
}

fn with_runtime<R>(action: impl FnOnce(&mut HoverRuntime) -> R) -> Option<R> {
    STATE.with(|slot| slot.borrow_mut().as_mut().map(action))
}

fn on_mouseover(event: &Event) {
    let Some(target) = dom::event_element(event.target()) else {
        return;
    };
    with_runtime(|runtime| {
        let mut commands = Vec::new();
        if runtime.overlay.contains(&target) {
            commands.extend(runtime.controller.pointer_enter_overlay());
        }
        let link = link_target::qualifying_link(
            &target,
            runtime.overlay.element(),
            runtime.controller.overlay_path(),
            &runtime.config,
        );
        if let Some(link) = link {
            let entered = if link.in_overlay {
                runtime
                    .controller
                    .pointer_enter_overlay_link(link.element, link.path)
            } else {
                runtime.controller.pointer_enter_link(link.element, link.path)
            };
            commands.extend(entered);
        }
        runtime.run(commands);
    });
}

fn on_mouseout(event: &Event) {
    let Some(target) = dom::event_element(event.target()) else {
        return;
    };
    let related = event
        .dyn_ref::<MouseEvent>()
        .and_then(|mouse| dom::event_element(mouse.related_target()));
    with_runtime(|runtime| {
        let mut commands = Vec::new();
        if let Some(link) = dom::closest(&target, "a[href]") {
            let still_inside = related
                .as_ref()
                .is_some_and(|related| dom::contains(&link, related));
            if !still_inside {
                commands.extend(runtime.controller.pointer_leave_link(&link));
            }
        }
        if runtime.overlay.contains(&target) {
            let still_inside = related
                .as_ref()
                .is_some_and(|related| runtime.overlay.contains(related));
            if !still_inside {
                commands.extend(runtime.controller.pointer_leave_overlay());
            }
        }
        runtime.run(commands);
    });
}

fn on_intent_elapsed() {
    with_runtime(|runtime| {
        runtime.intent_timer.take();
        let commands = runtime.controller.intent_elapsed();
        runtime.run(commands);
    });
}

fn on_hide_elapsed() {
    with_runtime(|runtime| {
        runtime.hide_timer.take();
        let commands = runtime.controller.hide_elapsed();
        runtime.run(commands);
    });
}

fn spawn_fetch(endpoint: String, path: String, request: RequestId) {
    gloo::console::log!("hover preview: fetch", path.as_str(), request.value() as f64);
    spawn_local(async move {
        let outcome = lookup::fetch_preview(&endpoint, &path).await;
        if let Err(err) = outcome.as_ref() {
            gloo::console::warn!("hover preview: lookup failed", path.as_str(), err.to_string());
        }
        with_runtime(|runtime| {
            if !runtime.controller.accepts_response(request, &path) {
                gloo::console::log!("hover preview: discarding stale response", path.as_str());
            }
            let commands = runtime.controller.fetch_resolved(request, &path, outcome);
            runtime.run(commands);
        });
    });
}

impl HoverRuntime {
    fn run(&mut self, commands: Vec<HoverCommand<Element>>) {
        for command in commands {
            match command {
                HoverCommand::ArmIntent { delay_ms } => {
                    // Replacing the slot drops and clears any earlier timer.
                    self.intent_timer = Some(Timeout::new(delay_ms, on_intent_elapsed));
                }
                HoverCommand::CancelIntent => {
                    self.intent_timer.take();
                }
                HoverCommand::ArmHide { delay_ms } => {
                    self.hide_timer = Some(Timeout::new(delay_ms, on_hide_elapsed));
                }
                HoverCommand::CancelHide => {
                    self.hide_timer.take();
                }
                HoverCommand::Fetch { path, request } => {
                    spawn_fetch(self.config.endpoint.clone(), path, request);
                }
                HoverCommand::Show { anchor } => self.overlay.show(&anchor),
                HoverCommand::RenderLoading => self.overlay.render_loading(),
                HoverCommand::RenderContent(payload) => self.overlay.render_content(&payload),
                HoverCommand::RenderError => self.overlay.render_error(),
                HoverCommand::Destroy => self.overlay.destroy(),
            }
        }
    }
}
