/// pShape Terminal Demo - Rotating Prism
///
/// Usage: pshape-terminal [options.json]
///
/// Without an options file the default 14-sided prism is sized to the
/// terminal. Image paths in the options resolve relative to the file.
/// Controls:
///   - Q/ESC: Quit
///
/// Logs go to stderr; set RUST_LOG and redirect stderr to see them.

use std::env;
use std::io;
use std::path::Path;

use pshape_core::ShapeConfig;
use pshape_terminal::TerminalApp;

fn main() -> io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let (config, asset_dir, fit) = match args.get(1) {
        Some(path) => {
            println!("Loading shape options: {}", path);
            let config = ShapeConfig::from_file(path)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
            let dir = Path::new(path).parent().unwrap_or(Path::new(".")).to_path_buf();
            (config, dir, false)
        }
        None => (ShapeConfig::default(), Path::new(".").to_path_buf(), true),
    };

    println!("pShape Terminal Renderer - Loading textures...");
    let mut app = TerminalApp::new(config, asset_dir, fit)?;

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    app.run()?;

    println!("Thank you for using pShape!");
    Ok(())
}
