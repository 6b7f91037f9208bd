//! Browser build support. Routes panic messages to the developer console instead of a bare
//! `unreachable` trap.

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
