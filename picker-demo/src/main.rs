#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    picker_demo::run_native()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    picker_demo::run_web();
}
