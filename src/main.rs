#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod app_config;
mod dom;
mod hover_runtime;
mod link_target;
mod lookup;
mod overlay;
mod settings_runtime;

#[cfg(target_arch = "wasm32")]
fn boot() {
    let settings = settings_runtime::load_settings();
    settings_runtime::apply_settings(&settings);
    settings_runtime::install(settings);

    let config = app_config::load_preview_config();
    hover_runtime::install(config);
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    boot();
}
