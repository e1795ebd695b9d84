mod app;
mod rendering;

use gpu_cloth::ClothConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    // Optional JSON config overriding the built-in scenes
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let config = ClothConfig::from_json_file(&path)?;
            log::info!("Loaded cloth config from {path}");
            Some(config)
        }
        None => None,
    };

    app::run(config)?;
    Ok(())
}
