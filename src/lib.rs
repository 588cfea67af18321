pub mod camera;
pub mod editor;
pub mod engine;
pub mod render;
pub mod scene;

/// Runs a headless sketch session with the default configuration.
pub fn run() {
    let mut engine = engine::Engine::default();
    engine.run();
}
