use std::path::Path;
use std::time::Instant;

use voiceline_render::{
    batch::{BatchConfig, BatchDriver, RenderContext},
    catalog::Catalog,
    engines::zonos::{ZonosEngine, ZonosModelParams},
    SynthesisEngine,
};

const MODEL_DIR: &str = "models/zonos";
const REFERENCE_WAV: &str = "assets/me.wav";
const CATALOG_OVERRIDE: &str = "voice_lines.json";

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let catalog_path = Path::new(CATALOG_OVERRIDE);
    let catalog = if catalog_path.exists() {
        Catalog::from_path(catalog_path)?
    } else {
        Catalog::builtin()?
    };

    let mut engine = ZonosEngine::new();
    let load_start = Instant::now();
    engine.load_model_with_params(Path::new(MODEL_DIR), ZonosModelParams::default())?;
    log::info!("Model loaded in {:.2?}", load_start.elapsed());

    let context = RenderContext::initialize(engine, Path::new(REFERENCE_WAV))?;
    let mut driver = BatchDriver::new(context, BatchConfig::default());

    let report = driver.run(&catalog, &mut std::io::stdout().lock())?;
    log::info!(
        "{} generated, {} disabled, {} failed",
        report.generated.len(),
        report.skipped.len(),
        report.failed.len()
    );

    Ok(())
}
