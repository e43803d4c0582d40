use super::atmo::{AtmoTable, AtmosphericFlux};
use super::driver::{FluxDriver, FluxError};
use super::histogram::{EnergySpectrum, HistogramFlux, load_spectra};
use super::mixer::{FlavorMap, FlavorMixer, FluxBlender};
use super::mono::MonoFlux;
use super::ntuple::{DetectorLocation, NtupleFlux, SimpleNtupleFlux, upstream_override};
use super::spec::{FluxSpec, FluxType};
use crate::core::constants::NO_HISTOGRAM_FLUX;
use crate::core::event::FourVector;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

/// One configured flux sampler of any supported type.
#[derive(Debug)]
pub enum FluxSampler {
    Mono(MonoFlux),
    Ntuple(NtupleFlux),
    SimpleNtuple(SimpleNtupleFlux),
    Histogram(HistogramFlux),
    Atmospheric(AtmosphericFlux),
}

impl FluxSampler {
    fn driver(&self) -> &dyn FluxDriver {
        match self {
            Self::Mono(d) => d,
            Self::Ntuple(d) => d,
            Self::SimpleNtuple(d) => d,
            Self::Histogram(d) => d,
            Self::Atmospheric(d) => d,
        }
    }

    fn driver_mut(&mut self) -> &mut dyn FluxDriver {
        match self {
            Self::Mono(d) => d,
            Self::Ntuple(d) => d,
            Self::SimpleNtuple(d) => d,
            Self::Histogram(d) => d,
            Self::Atmospheric(d) => d,
        }
    }

    /// Protons on target consumed by ntuple-backed samplers.
    pub fn used_pots(&self) -> Option<f64> {
        match self {
            Self::Ntuple(d) => Some(d.used_pots()),
            Self::SimpleNtuple(d) => Some(d.used_pots()),
            _ => None,
        }
    }

    /// Neutrinos thrown by the atmospheric sampler.
    pub fn n_flux_neutrinos(&self) -> Option<u64> {
        match self {
            Self::Atmospheric(d) => Some(d.n_flux_neutrinos()),
            _ => None,
        }
    }

    /// Sum of the histogram integrals; `-999` for samplers that are not histogram based and
    /// zero for the atmospheric ones.
    pub fn total_hist_flux(&self) -> f64 {
        match self {
            Self::Histogram(d) => d.total_flux(),
            Self::Atmospheric(_) => 0.0,
            _ => NO_HISTOGRAM_FLUX,
        }
    }

    pub fn histograms(&self) -> &[(i32, EnergySpectrum)] {
        match self {
            Self::Histogram(d) => d.spectra(),
            _ => &[],
        }
    }
}

impl FluxDriver for FluxSampler {
    fn flux_particles(&self) -> &BTreeSet<i32> {
        self.driver().flux_particles()
    }

    fn max_energy(&self) -> f64 {
        self.driver().max_energy()
    }

    fn generate_next(&mut self) -> Result<bool, FluxError> {
        self.driver_mut().generate_next()
    }

    fn pdg_code(&self) -> i32 {
        self.driver().pdg_code()
    }

    fn weight(&self) -> f64 {
        self.driver().weight()
    }

    fn momentum(&self) -> FourVector {
        self.driver().momentum()
    }

    fn position(&self) -> FourVector {
        self.driver().position()
    }

    fn end_of_flux(&self) -> bool {
        self.driver().end_of_flux()
    }

    fn decay_distance(&self) -> Option<f64> {
        self.driver().decay_distance()
    }
}

/// The sampler handed to the event source: either bare or behind a flavor blender.
#[derive(Debug)]
pub enum FluxPipeline {
    Direct(FluxSampler),
    Mixed(FluxBlender<FluxSampler>),
}

impl FluxPipeline {
    pub fn sampler(&self) -> &FluxSampler {
        match self {
            Self::Direct(s) => s,
            Self::Mixed(b) => b.inner(),
        }
    }

    pub fn blender(&self) -> Option<&FluxBlender<FluxSampler>> {
        match self {
            Self::Direct(_) => None,
            Self::Mixed(b) => Some(b),
        }
    }

    pub fn driver(&self) -> &dyn FluxDriver {
        match self {
            Self::Direct(s) => s,
            Self::Mixed(b) => b,
        }
    }

    pub fn driver_mut(&mut self) -> &mut dyn FluxDriver {
        match self {
            Self::Direct(s) => s,
            Self::Mixed(b) => b,
        }
    }
}

/// Flavor mixing applied on top of the sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct MixerSettings {
    /// `none`, or a keyword (`map`, `swap`, `fixedfrac`) followed by its arguments.
    pub config: String,
    /// Decay-to-detector distance in meters used when the sampler reports none.
    pub baseline: f64,
}

impl Default for MixerSettings {
    fn default() -> Self {
        Self {
            config: "none".to_string(),
            baseline: 0.0,
        }
    }
}

/// Checks the events-per-spill setting against the flux type; mono always runs one event per
/// spill.
pub fn effective_events_per_spill(flux_type: FluxType, events_per_spill: f64) -> Result<f64, FluxError> {
    match flux_type {
        FluxType::Mono => Ok(1.0),
        FluxType::Atmospheric(_) if events_per_spill != 1.0 => {
            Err(FluxError::AtmosphericEventsPerSpill(events_per_spill))
        }
        _ => Ok(events_per_spill),
    }
}

/// Builds the sampler described by `spec`, wrapped in a flavor blender unless the mixer is
/// `none`.
#[instrument(skip_all, name = "flux_factory", fields(flux_type = %spec.flux_type))]
pub fn build_flux_pipeline(
    spec: &FluxSpec,
    mixer: &MixerSettings,
    print_config: bool,
    seed: u64,
) -> Result<FluxPipeline, FluxError> {
    let sampler = build_sampler(spec, seed)?;

    let keyword = mixer
        .config
        .split_whitespace()
        .next()
        .unwrap_or("none")
        .to_lowercase();
    if keyword == "none" {
        return Ok(FluxPipeline::Direct(sampler));
    }

    let flavor_mixer: Option<Box<dyn FlavorMixer>> = match keyword.as_str() {
        "map" | "swap" | "fixedfrac" => Some(Box::new(FlavorMap::parse(&mixer.config)?)),
        other => {
            warn!(keyword = other, "Unknown flavor mixer; neutrinos will pass through unmixed");
            None
        }
    };
    let blender = FluxBlender::new(sampler, flavor_mixer, mixer.baseline, seed.wrapping_add(1));
    if print_config {
        blender.log_config();
    }
    Ok(FluxPipeline::Mixed(blender))
}

fn build_sampler(spec: &FluxSpec, seed: u64) -> Result<FluxSampler, FluxError> {
    if spec.flavors.is_empty() {
        return Err(FluxError::NoFlavors);
    }
    if spec.flux_type != FluxType::Mono && spec.files.is_empty() {
        return Err(FluxError::NoFluxFiles {
            flux_type: spec.flux_type.to_string(),
            pattern: spec.files.display_entries(),
        });
    }
    let paths = spec.files.paths();

    let sampler = match spec.flux_type {
        FluxType::Mono => {
            let mut flux = MonoFlux::new(spec.mono_energy, &spec.flavors, seed)?;
            flux.set_direction_cos(spec.beam.direction);
            flux.set_ray_origin(spec.beam.center);
            FluxSampler::Mono(flux)
        }
        FluxType::Ntuple => {
            let location: DetectorLocation = spec.detector_location.parse()?;
            let mut flux = NtupleFlux::load(&paths, location, &spec.flavors, seed)?;
            if let Some(z) = upstream_override(spec.upstream_z) {
                flux.set_upstream_z(z);
            }
            FluxSampler::Ntuple(flux)
        }
        FluxType::SimpleNtuple => {
            let mut flux = SimpleNtupleFlux::load(&paths, &spec.flavors, seed)?;
            if let Some(z) = upstream_override(spec.upstream_z) {
                flux.set_upstream_z(z);
            }
            FluxSampler::SimpleNtuple(flux)
        }
        FluxType::Histogram => {
            let spectra = load_spectra(paths[0], &spec.flavors)?;
            FluxSampler::Histogram(HistogramFlux::new(spectra, spec.beam, seed)?)
        }
        FluxType::Atmospheric(model) => {
            if spec.flavors.len() != paths.len() {
                return Err(FluxError::FlavorFileMismatch {
                    flavors: spec.flavors.len(),
                    files: paths.len(),
                });
            }
            let tables = spec
                .flavors
                .iter()
                .zip(&paths)
                .map(|(&pdg, path)| {
                    info!(pdg, path = %path.display(), "Atmospheric flux file");
                    AtmoTable::load(path, model, spec.atmo.e_min, spec.atmo.e_max).map(|t| (pdg, t))
                })
                .collect::<Result<Vec<_>, _>>()?;
            FluxSampler::Atmospheric(AtmosphericFlux::new(model, tables, spec.atmo, seed)?)
        }
    };
    info!(flavors = ?spec.flavors, files = paths.len(), "Flux sampler built");
    Ok(sampler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flux::spec::{AtmoBounds, AtmoModel, BeamSpec, FluxFiles};
    use nalgebra::{Point3, Vector3};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn spec(flux_type: FluxType, flavors: &[i32], files: &[PathBuf]) -> FluxSpec {
        FluxSpec {
            flux_type,
            flavors: flavors.iter().copied().collect(),
            files: FluxFiles::Explicit(files.iter().cloned().collect()),
            beam: BeamSpec {
                direction: Vector3::new(0.0, 0.0, 1.0),
                center: Point3::new(0.0, 0.0, -5.0),
                radius: 3.0,
            },
            mono_energy: 2.0,
            detector_location: "NearDet".to_string(),
            upstream_z: -2e30,
            atmo: AtmoBounds {
                e_min: 0.1,
                e_max: 10.0,
                r_l: 20.0,
                r_t: 20.0,
            },
        }
    }

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    mod events_per_spill {
        use super::*;

        #[test]
        fn mono_forces_one_event_per_spill() {
            assert_eq!(effective_events_per_spill(FluxType::Mono, 0.0).unwrap(), 1.0);
            assert_eq!(effective_events_per_spill(FluxType::Mono, 7.0).unwrap(), 1.0);
        }

        #[test]
        fn atmospheric_requires_exactly_one() {
            let t = FluxType::Atmospheric(AtmoModel::Bartol);
            assert_eq!(effective_events_per_spill(t, 1.0).unwrap(), 1.0);
            assert!(matches!(
                effective_events_per_spill(t, 0.0),
                Err(FluxError::AtmosphericEventsPerSpill(_))
            ));
        }

        #[test]
        fn other_types_keep_their_setting() {
            assert_eq!(effective_events_per_spill(FluxType::Ntuple, 0.0).unwrap(), 0.0);
            assert_eq!(effective_events_per_spill(FluxType::Histogram, 3.0).unwrap(), 3.0);
        }
    }

    mod samplers {
        use super::*;

        #[test]
        fn mono_uses_beam_direction_and_center() {
            let s = spec(FluxType::Mono, &[12, 14], &[]);
            let mut pipeline = build_flux_pipeline(&s, &MixerSettings::default(), false, 1).unwrap();
            assert!(pipeline.blender().is_none());
            assert_eq!(pipeline.sampler().total_hist_flux(), NO_HISTOGRAM_FLUX);
            let driver = pipeline.driver_mut();
            assert!(driver.generate_next().unwrap());
            assert_eq!(driver.momentum(), FourVector::new(0.0, 0.0, 2.0, 2.0));
            assert_eq!(driver.position(), FourVector::new(0.0, 0.0, -5.0, 0.0));
        }

        #[test]
        fn pot_driven_type_without_files_is_fatal() {
            let s = spec(FluxType::Ntuple, &[14], &[]);
            let err = build_flux_pipeline(&s, &MixerSettings::default(), false, 1).unwrap_err();
            assert!(matches!(err, FluxError::NoFluxFiles { .. }));
        }

        #[test]
        fn histogram_reports_total_flux_and_spectra() {
            let file = write("[numu]\nedges = [0.0, 1.0, 2.0]\ncontents = [2.0, 3.0]\n");
            let s = spec(FluxType::Histogram, &[14], &[file.path().to_path_buf()]);
            let pipeline = build_flux_pipeline(&s, &MixerSettings::default(), false, 1).unwrap();
            assert!((pipeline.sampler().total_hist_flux() - 5.0).abs() < 1e-12);
            assert_eq!(pipeline.sampler().histograms().len(), 1);
            assert_eq!(pipeline.sampler().used_pots(), None);
        }

        #[test]
        fn atmospheric_needs_one_file_per_flavor() {
            let file = write("0.95,1.0,10.0\n");
            let s = spec(
                FluxType::Atmospheric(AtmoModel::Fluka),
                &[12, 14],
                &[file.path().to_path_buf()],
            );
            let err = build_flux_pipeline(&s, &MixerSettings::default(), false, 1).unwrap_err();
            assert!(matches!(err, FluxError::FlavorFileMismatch { flavors: 2, files: 1 }));
        }

        #[test]
        fn atmospheric_counts_thrown_neutrinos() {
            let file = write("0.95,1.0,10.0\n");
            let s = spec(
                FluxType::Atmospheric(AtmoModel::Fluka),
                &[14],
                &[file.path().to_path_buf()],
            );
            let mut pipeline = build_flux_pipeline(&s, &MixerSettings::default(), false, 1).unwrap();
            for _ in 0..3 {
                assert!(pipeline.driver_mut().generate_next().unwrap());
            }
            assert_eq!(pipeline.sampler().n_flux_neutrinos(), Some(3));
            assert_eq!(pipeline.sampler().total_hist_flux(), 0.0);
        }

        #[test]
        fn ntuple_rejects_unknown_detector_location() {
            let file = write("run,evtno,ntype\n1,1,14\n");
            let mut s = spec(FluxType::Ntuple, &[14], &[file.path().to_path_buf()]);
            s.detector_location = "MiddleDet".to_string();
            let err = build_flux_pipeline(&s, &MixerSettings::default(), false, 1).unwrap_err();
            assert!(matches!(err, FluxError::UnknownDetectorLocation(_)));
        }
    }

    mod mixing {
        use super::*;

        #[test]
        fn known_keyword_installs_mixer() {
            let s = spec(FluxType::Mono, &[14], &[]);
            let mixer = MixerSettings {
                config: "  swap 14:16".to_string(),
                baseline: 735.0,
            };
            let mut pipeline = build_flux_pipeline(&s, &mixer, true, 1).unwrap();
            let blender = pipeline.blender().unwrap();
            assert!(blender.has_mixer());
            assert_eq!(blender.baseline(), 735.0);
            assert!(pipeline.driver_mut().generate_next().unwrap());
            assert_eq!(pipeline.driver().pdg_code(), 16);
            assert_eq!(pipeline.sampler().pdg_code(), 14);
        }

        #[test]
        fn unknown_keyword_installs_blender_without_mixer() {
            let s = spec(FluxType::Mono, &[14], &[]);
            let mixer = MixerSettings {
                config: "oscillate 1 2".to_string(),
                baseline: 1.0,
            };
            let mut pipeline = build_flux_pipeline(&s, &mixer, false, 1).unwrap();
            assert!(!pipeline.blender().unwrap().has_mixer());
            assert!(pipeline.driver_mut().generate_next().unwrap());
            assert_eq!(pipeline.driver().pdg_code(), 14);
        }

        #[test]
        fn malformed_known_mixer_is_fatal() {
            let s = spec(FluxType::Mono, &[14], &[]);
            let mixer = MixerSettings {
                config: "swap 14-16".to_string(),
                baseline: 1.0,
            };
            assert!(matches!(
                build_flux_pipeline(&s, &mixer, false, 1),
                Err(FluxError::InvalidMixer { .. })
            ));
        }
    }
}
