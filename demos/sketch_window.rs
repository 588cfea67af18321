//! Interactive polygon sketching in a desktop window.
//!
//! Click to place vertices, Enter/C to close the polygon, D to copy it
//! (move the mouse, click to drop), R/Escape to reset.
//! Run with: cargo run --example sketch_window --features render-wgpu [config.json]

#[cfg(feature = "render-wgpu")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    use theta_sketch::engine::SketchConfig;
    use theta_sketch::render::window::{WindowApp, WindowAppTrait, WindowConfig, WindowEventLoop};

    let sketch = match std::env::args().nth(1) {
        Some(path) => SketchConfig::load(path)?,
        None => SketchConfig::default(),
    };
    let config = WindowConfig {
        title: "Theta Sketch".to_string(),
        width: sketch.viewport.width,
        height: sketch.viewport.height,
        ..Default::default()
    };

    let event_loop = WindowEventLoop::new()?;
    event_loop.run(move |event_loop| {
        WindowApp::new(event_loop, config.clone(), sketch.clone())
            .map(|app| Box::new(app) as Box<dyn WindowAppTrait>)
    })?;

    Ok(())
}

#[cfg(not(feature = "render-wgpu"))]
fn main() {
    eprintln!("This example requires the 'render-wgpu' feature.");
    eprintln!("Run with: cargo run --example sketch_window --features render-wgpu");
    std::process::exit(1);
}
