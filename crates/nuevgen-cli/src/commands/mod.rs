pub mod check;
pub mod fiducial;
pub mod flux;

use crate::error::Result;
use nuevgen::core::flux::{FluxError, FluxFiles, FluxPipeline, build_flux_pipeline, resolve_flux_files};
use nuevgen::engine::config::{DebugFlags, GeneratorConfig};
use nuevgen::engine::environment::ResolvedEnvironment;
use nuevgen::engine::error::EngineError;
use nuevgen::engine::progress::{Progress, ProgressReporter};
use tracing::info;

/// A flux sampler built from a configuration without any geometry or event source attached.
pub struct FluxSetup {
    pub files: FluxFiles,
    pub environment: ResolvedEnvironment,
    pub pipeline: FluxPipeline,
}

pub fn setup_flux(config: &GeneratorConfig, reporter: &ProgressReporter) -> Result<FluxSetup> {
    reporter.report(Progress::StageStart { name: "Flux files" });
    let files = resolve_flux_files(&config.flux_search_path, &config.flux_files).map_err(FluxError::from)?;
    info!(count = files.len(), "Flux files resolved");
    reporter.report(Progress::StageFinish);

    let environment = ResolvedEnvironment::resolve(&config.environment, &config.flux_search_path)
        .map_err(EngineError::from)?;

    reporter.report(Progress::StageStart { name: "Flux" });
    let pipeline = build_flux_pipeline(
        &config.flux_spec(files.clone()),
        &config.mixer,
        config.debug.contains(DebugFlags::MIXER_CONFIG),
        environment.seed,
    )?;
    reporter.report(Progress::StageFinish);

    Ok(FluxSetup {
        files,
        environment,
        pipeline,
    })
}
