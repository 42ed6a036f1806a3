//! Arkanoid entry point
//!
//! Plays in the terminal. Logging goes to stderr (`RUST_LOG`), so redirect
//! it when running with logging enabled: `RUST_LOG=info arkanoid 2> log.txt`.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::io::Result<()> {
    use arkanoid::platform::terminal::TerminalPlatform;
    use arkanoid::renderer::terminal::TerminalCanvas;
    use arkanoid::{Config, Session};

    env_logger::init();
    log::info!("Arkanoid starting...");

    let config = Config::load();
    let mut session = Session::new(config.clone());

    // Canvas drops before the platform, restoring the screen before raw mode
    let mut platform = TerminalPlatform::new()?;
    let mut canvas = TerminalCanvas::new(config.arena_width, config.arena_height)?;

    session.run(&mut platform, &mut canvas)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser frontend
}
