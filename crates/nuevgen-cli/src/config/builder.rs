use super::file::{FileConfig, FileFlavor};
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::{self, ParseError};
use nalgebra::{Point3, Vector3};
use nuevgen::core::flux::FluxType;
use nuevgen::core::flux::spec::UnknownFluxType;
use nuevgen::core::flux::flavor::is_neutrino;
use nuevgen::engine::config::{EnvironmentSettings, GeneratorConfig, GeneratorConfigBuilder};
use nuevgen::engine::error::EngineError;
use std::collections::BTreeSet;
use tracing::debug;

/// Merges command-line overrides, the configuration file and built-in defaults, in that order.
pub fn build_config(args: &ConfigArgs) -> Result<GeneratorConfig> {
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let flux_file = file_config.flux.take().unwrap_or_default();
    let geometry_file = file_config.geometry.take().unwrap_or_default();
    let timing_file = file_config.timing.take().unwrap_or_default();
    let env_file = file_config.environment.take().unwrap_or_default();

    let flux_type_name = args
        .flux_type
        .as_deref()
        .or(flux_file.flux_type.as_deref())
        .ok_or_else(|| {
            CliError::Config("No flux type given; use --flux-type or `[flux] type`".to_string())
        })?;
    let flux_type: FluxType = flux_type_name
        .parse()
        .map_err(|e: UnknownFluxType| CliError::Config(e.to_string()))?;

    let flavors = if args.flavors.is_empty() {
        resolve_file_flavors(flux_file.flavors.as_deref().unwrap_or_default())?
    } else {
        args.flavors
            .iter()
            .map(|token| parser::parse_flavor(token))
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(argument_error)?
    };

    let mut search_path = args.search_dirs.clone();
    search_path.extend(flux_file.search_path.unwrap_or_default());

    let environment = EnvironmentSettings {
        seed: args.seed.or(env_file.seed),
        xml_path: env_file.xml_path,
        spline_file: env_file.spline_file,
        extra: env_file.extra,
    };

    let mut builder = GeneratorConfigBuilder::new()
        .flux_type(flux_type)
        .flavors(flavors)
        .flux_files(flux_file.files.unwrap_or_default())
        .flux_search_path(search_path)
        .environment(environment);

    if let Some(name) = flux_file.beam_name {
        builder = builder.beam_name(name);
    }
    if let Some(location) = flux_file.detector_location {
        builder = builder.detector_location(location);
    }
    if let Some(z) = flux_file.upstream_z {
        builder = builder.flux_upstream_z(z);
    }
    if let Some(energy) = flux_file.mono_energy {
        builder = builder.mono_energy(energy);
    }
    if let Some(pot) = flux_file.pot_per_spill {
        builder = builder.pot_per_spill(pot);
    }
    if let Some(events) = flux_file.events_per_spill {
        builder = builder.events_per_spill(events);
    }
    if let Some(beam) = flux_file.beam {
        if let Some([x, y, z]) = beam.direction {
            builder = builder.beam_direction(Vector3::new(x, y, z));
        }
        if let Some([x, y, z]) = beam.center {
            builder = builder.beam_center(Point3::new(x, y, z));
        }
        if let Some(radius) = beam.radius {
            builder = builder.beam_radius(radius);
        }
    }
    if let Some(atmo) = flux_file.atmo {
        if atmo.e_min.is_some() || atmo.e_max.is_some() {
            builder = builder.atmo_energy_range(atmo.e_min.unwrap_or(0.1), atmo.e_max.unwrap_or(10.0));
        }
        if atmo.r_l.is_some() || atmo.r_t.is_some() {
            builder = builder.atmo_radii(atmo.r_l.unwrap_or(20.0), atmo.r_t.unwrap_or(20.0));
        }
    }
    if let Some(mixer) = flux_file.mixer {
        if let Some(config) = mixer.config {
            builder = builder.mixer_config(config);
        }
        if let Some(baseline) = mixer.baseline {
            builder = builder.mixer_baseline(baseline);
        }
    }

    if let Some(volume) = geometry_file.top_volume {
        builder = builder.top_volume(volume);
    }
    if let Some(cut) = geometry_file.fiducial_cut {
        builder = builder.fiducial_cut(cut);
    }
    if let Some(scan) = geometry_file.geom_scan {
        builder = builder.geom_scan(scan);
    }
    if let Some(mass) = geometry_file.surrounding_mass {
        builder = builder.surrounding_mass(mass);
    }

    if let Some(offset) = timing_file.global_offset {
        builder = builder.global_time_offset(offset);
    }
    if let Some(offset) = timing_file.random_offset {
        builder = builder.random_time_offset(offset);
    }
    if let Some(flags) = file_config.debug_flags {
        builder = builder.debug_flags(flags);
    }

    let config = builder.build().map_err(EngineError::from)?;
    debug!(flux_type = %config.flux_type, flavors = ?config.flavors, "Generator configuration built");
    Ok(config)
}

fn resolve_file_flavors(flavors: &[FileFlavor]) -> Result<BTreeSet<i32>> {
    flavors
        .iter()
        .map(|flavor| match flavor {
            FileFlavor::Code(code) if is_neutrino(*code) => Ok(*code),
            FileFlavor::Code(code) => Err(argument_error(ParseError::UnknownFlavor(code.to_string()))),
            FileFlavor::Name(name) => parser::parse_flavor(name).map_err(argument_error),
        })
        .collect()
}

fn argument_error(e: ParseError) -> CliError {
    CliError::Argument(e.to_string())
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) = parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;
        let float = || parser::parse_number::<f64>("float", key, value).map_err(|e| CliError::Config(e.to_string()));

        match key {
            "flux.type" => {
                config.flux.get_or_insert_with(Default::default).flux_type = Some(value.to_string());
            }
            "flux.detector-location" => {
                config.flux.get_or_insert_with(Default::default).detector_location = Some(value.to_string());
            }
            "flux.beam-name" => {
                config.flux.get_or_insert_with(Default::default).beam_name = Some(value.to_string());
            }
            "flux.mono-energy" => {
                config.flux.get_or_insert_with(Default::default).mono_energy = Some(float()?);
            }
            "flux.pot-per-spill" => {
                config.flux.get_or_insert_with(Default::default).pot_per_spill = Some(float()?);
            }
            "flux.events-per-spill" => {
                config.flux.get_or_insert_with(Default::default).events_per_spill = Some(float()?);
            }
            "flux.upstream-z" => {
                config.flux.get_or_insert_with(Default::default).upstream_z = Some(float()?);
            }
            "flux.beam.radius" => {
                config
                    .flux
                    .get_or_insert_with(Default::default)
                    .beam
                    .get_or_insert_with(Default::default)
                    .radius = Some(float()?);
            }
            "flux.mixer.config" => {
                config
                    .flux
                    .get_or_insert_with(Default::default)
                    .mixer
                    .get_or_insert_with(Default::default)
                    .config = Some(value.to_string());
            }
            "flux.mixer.baseline" => {
                config
                    .flux
                    .get_or_insert_with(Default::default)
                    .mixer
                    .get_or_insert_with(Default::default)
                    .baseline = Some(float()?);
            }
            "geometry.top-volume" => {
                config.geometry.get_or_insert_with(Default::default).top_volume = Some(value.to_string());
            }
            "geometry.fiducial-cut" => {
                config.geometry.get_or_insert_with(Default::default).fiducial_cut = Some(value.to_string());
            }
            "geometry.geom-scan" => {
                config.geometry.get_or_insert_with(Default::default).geom_scan = Some(value.to_string());
            }
            "geometry.surrounding-mass" => {
                config.geometry.get_or_insert_with(Default::default).surrounding_mass = Some(float()?);
            }
            "timing.global-offset" => {
                config.timing.get_or_insert_with(Default::default).global_offset = Some(float()?);
            }
            "timing.random-offset" => {
                config.timing.get_or_insert_with(Default::default).random_offset = Some(float()?);
            }
            "environment.seed" => {
                config.environment.get_or_insert_with(Default::default).seed = Some(
                    parser::parse_number("integer", key, value).map_err(|e| CliError::Config(e.to_string()))?,
                );
            }
            "debug-flags" => {
                config.debug_flags = Some(
                    parser::parse_number("integer", key, value).map_err(|e| CliError::Config(e.to_string()))?,
                );
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
