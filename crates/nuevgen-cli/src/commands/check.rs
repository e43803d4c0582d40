use super::fiducial::describe;
use super::setup_flux;
use crate::cli::CheckArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use nuevgen::core::fiducial::parse_fiducial_cut;
use nuevgen::core::flux::effective_events_per_spill;
use nuevgen::engine::error::EngineError;
use nuevgen::engine::geometry::parse_geom_scan;
use nuevgen::engine::progress::ProgressReporter;
use nuevgen::engine::services::ScannerDefaults;
use tracing::info;

/// Resolutions assumed when the scan string is checked without a geometry engine.
const SCANNER_DEFAULTS: ScannerDefaults = ScannerDefaults {
    points: 200,
    rays: 200,
    particles: 10000,
};

pub fn run(args: CheckArgs) -> Result<()> {
    info!("Building the generator configuration...");
    let config = build_config(&args.config)?;

    let events_per_spill = effective_events_per_spill(config.flux_type, config.events_per_spill)?;
    let fiducial = parse_fiducial_cut(&config.fiducial_cut)?;
    let scan = parse_geom_scan(&config.geom_scan, &SCANNER_DEFAULTS).map_err(EngineError::from)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let setup = setup_flux(&config, &reporter)?;
    let driver = setup.pipeline.driver();

    println!("Flux type:        {}", config.flux_type);
    let flavors: Vec<String> = driver.flux_particles().iter().map(i32::to_string).collect();
    println!("Flavors:          {}", flavors.join(", "));
    println!("Flux files:       {}", setup.files.display_entries().join(", "));
    println!("Max energy:       {:.3} GeV", driver.max_energy());
    if config.flux_type.has_histograms() {
        println!(
            "Total flux:       {:.6e}",
            setup.pipeline.sampler().total_hist_flux()
        );
    }
    if events_per_spill > 0.0 {
        println!("Events per spill: {}", events_per_spill);
    } else {
        println!("POT per spill:    {:.3e}", config.pot_per_spill);
    }
    println!("Mixer:            {}", config.mixer.config);
    println!("{}", describe(fiducial.as_ref()));
    println!("Geometry scan:    {:?}", scan);
    println!("Seed:             {}", setup.environment.seed);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;
    use crate::error::CliError;

    fn mono_args() -> ConfigArgs {
        ConfigArgs {
            flux_type: Some("mono".to_string()),
            flavors: vec!["14".to_string()],
            seed: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn mono_configuration_checks_out() {
        let args = CheckArgs { config: mono_args() };
        run(args).unwrap();
    }

    #[test]
    fn bad_geometry_scan_fails_the_check() {
        let mut config = mono_args();
        config.set_values = vec!["geometry.geom-scan=cube 3".to_string()];
        let result = run(CheckArgs { config });
        assert!(matches!(result, Err(CliError::Engine(_))));
    }

    #[test]
    fn ntuple_without_files_fails_the_check() {
        let mut config = mono_args();
        config.flux_type = Some("ntuple".to_string());
        let result = run(CheckArgs { config });
        assert!(matches!(result, Err(CliError::Flux(_))));
    }
}
