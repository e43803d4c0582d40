use crate::core::event::InteractionRecord;
use crate::core::flux::spec::FluxFiles;
use crate::core::flux::{
    EnergySpectrum, FluxError, FluxPipeline, FluxType, build_flux_pipeline,
    effective_events_per_spill, resolve_flux_files,
};
use crate::core::records::{FluxRecord, GeneratorTruth, TruthRecord};
use crate::engine::config::{DebugFlags, GeneratorConfig};
use crate::engine::environment::ResolvedEnvironment;
use crate::engine::error::EngineError;
use crate::engine::geometry::{GeometryAdapter, ScanProvenance};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::services::{EventSource, GeometryService};
use crate::engine::spill::{SpillAccountant, SpillPolicy};
use crate::engine::translate::{EventTranslator, pack_beam_flux, pack_histogram_flux, pack_ray};
use std::path::Path;
use tracing::{info, instrument};

/// File the maximum path lengths are written to by [`EventGenerator::finish`].
pub const MAX_PATH_LENGTH_FILE: &str = "maxpathlength.xml";

/// Guards the exposure correction against a vanishing probability scale.
const MIN_PROB_SCALE: f64 = 1.0e-100;

/// Drives an external [`EventSource`] through a configured flux and detector geometry, one
/// interaction per [`sample`](EventGenerator::sample), and keeps the spill accounting.
pub struct EventGenerator<S: EventSource, G: GeometryService> {
    config: GeneratorConfig,
    source: S,
    geometry: GeometryAdapter<G>,
    flux: FluxPipeline,
    flux_files: FluxFiles,
    events_per_spill: f64,
    environment: ResolvedEnvironment,
    provenance: Option<ScanProvenance>,
    spill: SpillAccountant,
    translator: EventTranslator,
    current: Option<Box<dyn InteractionRecord>>,
}

impl<S: EventSource, G: GeometryService> EventGenerator<S, G> {
    /// Sets up geometry, flux and event source from `config`.
    ///
    /// Fails on anything that makes generation impossible: unresolvable flux files, a
    /// malformed geometry scan, a missing spline file or an event source that refuses the
    /// configuration.
    #[instrument(skip_all, name = "generator_initialize", fields(flux_type = %config.flux_type))]
    pub fn initialize(
        config: GeneratorConfig,
        mut source: S,
        geometry: G,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError> {
        reporter.report(Progress::StageStart { name: "Flux files" });
        let flux_files = resolve_flux_files(&config.flux_search_path, &config.flux_files)
            .map_err(FluxError::from)?;
        info!(files = ?flux_files.display_entries(), "Flux files resolved");
        let events_per_spill = effective_events_per_spill(config.flux_type, config.events_per_spill)?;
        reporter.report(Progress::StageFinish);

        reporter.report(Progress::StageStart { name: "Geometry" });
        let mut geometry = GeometryAdapter::bind(geometry, &config.top_volume, &config.fiducial_cut)?;
        reporter.report(Progress::StageFinish);

        let environment = ResolvedEnvironment::resolve(&config.environment, &config.flux_search_path)?;

        reporter.report(Progress::StageStart { name: "Flux" });
        let spec = config.flux_spec(flux_files.clone());
        let mut flux = build_flux_pipeline(
            &spec,
            &config.mixer,
            config.debug.contains(DebugFlags::MIXER_CONFIG),
            environment.seed,
        )?;
        reporter.report(Progress::StageFinish);

        reporter.report(Progress::StageStart { name: "Geometry scan" });
        let write_path_lengths = geometry.configure_scan(&config.geom_scan)?.write;
        let provenance = write_path_lengths.then(|| ScanProvenance {
            flux_type: config.flux_type.to_string(),
            beam_name: config.beam_name.clone(),
            flux_files: flux_files.display_entries(),
            detector_location: config.detector_location.clone(),
            geometry_file: geometry.geometry_file(),
            world_volume: geometry.world_volume().to_string(),
            top_volume: geometry.top_volume().to_string(),
            fiducial_cut: config.fiducial_cut.clone(),
            geom_scan: config.geom_scan.clone(),
        });
        reporter.report(Progress::StageFinish);

        reporter.report(Progress::StageStart { name: "Event source" });
        source.configure(&environment, flux.driver_mut(), geometry.service_mut())?;
        reporter.report(Progress::StageFinish);

        let target_mass = geometry.detector_mass() + config.surrounding_mass;
        let policy = SpillPolicy::new(
            config.flux_type,
            events_per_spill,
            config.pot_per_spill,
            target_mass,
            flux.sampler().total_hist_flux(),
            config.atmo.r_t,
        );
        let spill = SpillAccountant::new(policy, environment.seed.wrapping_add(3));
        let translator = EventTranslator::new(config.timing, environment.seed.wrapping_add(2));

        info!(
            events_per_spill,
            pot_per_spill = config.pot_per_spill,
            target_mass_kg = target_mass,
            "Generator initialized"
        );
        Ok(Self {
            config,
            source,
            geometry,
            flux,
            flux_files,
            events_per_spill,
            environment,
            provenance,
            spill,
            translator,
            current: None,
        })
    }

    /// Asks the event source for one interaction and, when one was produced, overwrites the
    /// three records with it. `Ok(false)` when no viable interaction came out.
    ///
    /// `flux` is cleared on every call. Ntuple-backed fluxes refill it and update the spill
    /// exposure even when no interaction was produced.
    pub fn sample(
        &mut self,
        truth: &mut TruthRecord,
        flux: &mut FluxRecord,
        gtruth: &mut GeneratorTruth,
    ) -> Result<bool, EngineError> {
        self.geometry.enter_top_volume()?;
        let outcome = self.draw(truth, flux, gtruth);
        let restored = self.geometry.restore_world_volume();
        let viable = outcome?;
        restored?;
        Ok(viable)
    }

    fn draw(
        &mut self,
        truth: &mut TruthRecord,
        flux: &mut FluxRecord,
        gtruth: &mut GeneratorTruth,
    ) -> Result<bool, EngineError> {
        self.current = None;
        flux.reset();
        self.current = self
            .source
            .generate_event(self.flux.driver_mut(), self.geometry.service_mut())?;

        if let Some(used_pots) = self.flux.sampler().used_pots() {
            self.spill
                .record_used_pots(used_pots, self.source.glob_prob_scale());
            pack_beam_flux(self.flux.sampler(), flux);
        }

        let Some(record) = self.current.as_deref() else {
            return Ok(false);
        };

        self.translator.fill_truth(record, truth);
        self.translator.fill_generator_truth(record, gtruth);
        self.spill.count_event();

        let energy = record.probe().map(|p| p.energy()).unwrap_or_default();
        pack_histogram_flux(self.flux.sampler(), energy, flux);

        let vertex = record.vertex();
        pack_ray(&self.flux, &vertex, flux);

        if self.config.debug.contains(DebugFlags::BLENDER_STATE) {
            if let Some(blender) = self.flux.blender() {
                blender.log_state();
            }
        }
        if self.config.debug.contains(DebugFlags::VERTEX_RAY) {
            info!(
                vertex = ?vertex.xyz(),
                ray_start = ?flux.gen_point,
                ray_to_vertex = flux.gen_to_vertex,
                decay_to_ray = flux.decay_to_gen,
                "Interaction vertex"
            );
        }
        Ok(true)
    }

    /// Whether the current spill is complete; a complete spill is folded into the lifetime
    /// exposure and a new one begins.
    pub fn stop(&mut self) -> bool {
        self.spill.stop(self.flux.sampler().n_flux_neutrinos())
    }

    /// Writes the maximum path-length table into `output_dir` when one was requested, and
    /// logs the exposure summary.
    #[instrument(skip_all, name = "generator_finish")]
    pub fn finish(&self, output_dir: &Path) -> Result<(), EngineError> {
        if let Some(provenance) = &self.provenance {
            let path = output_dir.join(MAX_PATH_LENGTH_FILE);
            self.geometry
                .write_max_path_lengths(&path, &provenance.render())?;
        }

        let prob_scale = self.source.glob_prob_scale();
        info!(
            exposure = self.spill.total_exposure(),
            prob_scale,
            "Generation finished"
        );
        if let Some(raw) = self.flux.sampler().used_pots() {
            info!(
                raw_pots = raw,
                corrected_pots = raw / prob_scale.max(MIN_PROB_SCALE),
                "Protons on target used by the flux"
            );
        }
        Ok(())
    }

    /// Lifetime exposure of all completed spills: protons on target, or seconds for
    /// atmospheric fluxes.
    pub fn pot_used(&self) -> f64 {
        self.spill.total_exposure()
    }

    pub fn flux_type(&self) -> FluxType {
        self.config.flux_type
    }

    pub fn detector_location(&self) -> &str {
        &self.config.detector_location
    }

    /// Interacting mass in kg: the top volume plus the configured surrounding mass.
    pub fn total_mass(&self) -> f64 {
        self.geometry.detector_mass() + self.config.surrounding_mass
    }

    pub fn total_hist_flux(&self) -> f64 {
        self.flux.sampler().total_hist_flux()
    }

    pub fn flux_histograms(&self) -> &[(i32, EnergySpectrum)] {
        self.flux.sampler().histograms()
    }

    pub fn events_per_spill(&self) -> f64 {
        self.events_per_spill
    }

    pub fn flux_files(&self) -> &FluxFiles {
        &self.flux_files
    }

    pub fn environment(&self) -> &ResolvedEnvironment {
        &self.environment
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn spill(&self) -> &SpillAccountant {
        &self.spill
    }

    pub fn geometry(&self) -> &GeometryAdapter<G> {
        &self.geometry
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The interaction produced by the last successful [`sample`](Self::sample).
    pub fn current_interaction(&self) -> Option<&dyn InteractionRecord> {
        self.current.as_deref()
    }

    /// Flavors the active flux (after any mixing) can produce.
    pub fn flux_flavors(&self) -> Vec<i32> {
        self.flux.driver().flux_particles().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::FourVector;
    use crate::core::flux::AtmoModel;
    use crate::core::records::FluxKind;
    use crate::engine::config::{EnvironmentSettings, GeneratorConfigBuilder};
    use crate::engine::fakes::{FakeGeometry, ScriptedSource, numu_cc_event};
    use crate::engine::geometry::GeometryError;
    use crate::engine::services::PathLengthList;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn seeded() -> EnvironmentSettings {
        EnvironmentSettings {
            seed: Some(7),
            ..Default::default()
        }
    }

    fn mono_config() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
            .flux_type(FluxType::Mono)
            .flavors(BTreeSet::from([12, 14]))
            .mono_energy(2.0)
            .top_volume("volDetEnclosure")
            .environment(seeded())
    }

    fn vertex() -> FourVector {
        FourVector::new(0.5, -0.25, 3.0, 0.0)
    }

    fn records() -> (TruthRecord, FluxRecord, GeneratorTruth) {
        (TruthRecord::default(), FluxRecord::default(), GeneratorTruth::default())
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn mono_runs_one_event_per_spill() {
            let config = mono_config().events_per_spill(0.0).build().unwrap();
            let source = ScriptedSource::repeating(numu_cc_event(vertex()), 5);
            let mut generator = EventGenerator::initialize(
                config,
                source,
                FakeGeometry::default(),
                &ProgressReporter::new(),
            )
            .unwrap();
            assert_eq!(generator.events_per_spill(), 1.0);

            let (mut truth, mut flux, mut gtruth) = records();
            for _ in 0..5 {
                assert!(generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
                assert!(generator.stop());
            }
            assert_eq!(generator.source().flux_draws, 5);
            assert!(
                generator
                    .source()
                    .drawn_pdgs
                    .iter()
                    .all(|pdg| *pdg == 12 || *pdg == 14)
            );
        }

        #[test]
        fn sample_fills_records_with_negative_track_ids() {
            let config = mono_config().build().unwrap();
            let source = ScriptedSource::repeating(numu_cc_event(vertex()), 1);
            let mut generator = EventGenerator::initialize(
                config,
                source,
                FakeGeometry::default(),
                &ProgressReporter::new(),
            )
            .unwrap();

            let (mut truth, mut flux, mut gtruth) = records();
            assert!(generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
            let ids: Vec<i32> = truth.particles.iter().map(|p| p.track_id).collect();
            assert_eq!(ids, vec![-1, -2, -3, -4, -5]);
            assert_eq!(truth.neutrino.unwrap().interaction_type, 1001);
            assert_eq!(gtruth.target_a, 40);
            assert!(generator.current_interaction().is_some());

            // Mono rays start at the beam center.
            assert_eq!(flux.gen_point, nalgebra::Point3::origin());
            assert!((flux.gen_to_vertex - vertex().xyz().norm()).abs() < 1e-12);
        }

        #[test]
        fn no_interaction_returns_false_and_restores_world_volume() {
            let config = mono_config().build().unwrap();
            let source = ScriptedSource::new([None]);
            let mut generator = EventGenerator::initialize(
                config,
                source,
                FakeGeometry::default(),
                &ProgressReporter::new(),
            )
            .unwrap();

            let (mut truth, mut flux, mut gtruth) = records();
            assert!(!generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
            assert!(truth.particles.is_empty());
            assert!(generator.current_interaction().is_none());

            let history = &generator.geometry().service().top_history;
            let n = history.len();
            assert_eq!(history[n - 2], "volDetEnclosure");
            assert_eq!(history[n - 1], "volWorld");
        }

        #[test]
        fn stale_flux_fields_are_cleared_for_mono() {
            let config = mono_config().build().unwrap();
            let source = ScriptedSource::new([Some(numu_cc_event(vertex())), None]);
            let mut generator = EventGenerator::initialize(
                config,
                source,
                FakeGeometry::default(),
                &ProgressReporter::new(),
            )
            .unwrap();

            let (mut truth, mut flux, mut gtruth) = records();
            flux.kind = FluxKind::Ntuple;
            flux.decay_to_gen = 123.0;
            flux.parentage.run = 42;
            flux.flavor_fluxes.numu = 3.0;
            assert!(generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
            assert_eq!(flux.kind, FluxKind::default());
            assert_eq!(flux.decay_to_gen, 0.0);
            assert_eq!(flux.parentage.run, 0);
            assert_eq!(flux.flavor_fluxes.numu, 0.0);

            flux.parentage.run = 42;
            assert!(!generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
            assert_eq!(flux, FluxRecord::default());
        }

        #[test]
        fn accessors_report_configuration() {
            let config = mono_config()
                .detector_location("NearDet")
                .surrounding_mass(250.0)
                .build()
                .unwrap();
            let generator = EventGenerator::initialize(
                config,
                ScriptedSource::new([]),
                FakeGeometry::default(),
                &ProgressReporter::new(),
            )
            .unwrap();
            assert_eq!(generator.flux_type(), FluxType::Mono);
            assert_eq!(generator.detector_location(), "NearDet");
            assert_eq!(generator.total_mass(), 1250.0);
            assert_eq!(generator.total_hist_flux(), -999.0);
            assert!(generator.flux_histograms().is_empty());
            assert_eq!(generator.pot_used(), 0.0);
            assert_eq!(generator.flux_flavors(), vec![12, 14]);
        }
    }

    mod setup {
        use super::*;

        #[test]
        fn environment_reaches_the_event_source() {
            let config = mono_config().build().unwrap();
            let generator = EventGenerator::initialize(
                config,
                ScriptedSource::new([]),
                FakeGeometry::default(),
                &ProgressReporter::new(),
            )
            .unwrap();
            let env = generator.source().environment.as_ref().unwrap();
            assert_eq!(env.seed, 7);
            assert_eq!(generator.environment().seed, 7);
        }

        #[test]
        fn event_source_failure_aborts_initialization() {
            let source = ScriptedSource {
                fail_configure: true,
                ..ScriptedSource::new([])
            };
            let result = EventGenerator::initialize(
                mono_config().build().unwrap(),
                source,
                FakeGeometry::default(),
                &ProgressReporter::new(),
            );
            assert!(matches!(result, Err(EngineError::Service(_))));
        }

        #[test]
        fn ntuple_without_files_is_fatal() {
            let dir = TempDir::new().unwrap();
            let config = GeneratorConfigBuilder::new()
                .flux_type(FluxType::Ntuple)
                .flavors(BTreeSet::from([14]))
                .flux_files(vec!["missing_*.csv".to_string()])
                .flux_search_path(vec![dir.path().to_path_buf()])
                .environment(seeded())
                .build()
                .unwrap();
            let result = EventGenerator::initialize(
                config,
                ScriptedSource::new([]),
                FakeGeometry::default(),
                &ProgressReporter::new(),
            );
            assert!(matches!(
                result,
                Err(EngineError::Flux {
                    source: FluxError::NoFluxFiles { .. }
                })
            ));
        }

        #[test]
        fn atmospheric_requires_one_event_per_spill() {
            let config = GeneratorConfigBuilder::new()
                .flux_type(FluxType::Atmospheric(AtmoModel::Fluka))
                .flavors(BTreeSet::from([14]))
                .events_per_spill(2.0)
                .environment(seeded())
                .build()
                .unwrap();
            let result = EventGenerator::initialize(
                config,
                ScriptedSource::new([]),
                FakeGeometry::default(),
                &ProgressReporter::new(),
            );
            assert!(matches!(
                result,
                Err(EngineError::Flux {
                    source: FluxError::AtmosphericEventsPerSpill(_)
                })
            ));
        }

        #[test]
        fn malformed_scan_is_fatal() {
            let config = mono_config().geom_scan("spiral 10").build().unwrap();
            let result = EventGenerator::initialize(
                config,
                ScriptedSource::new([]),
                FakeGeometry::default(),
                &ProgressReporter::new(),
            );
            assert!(matches!(result, Err(EngineError::Geometry { .. })));
        }

        #[test]
        fn structurally_broken_fiducial_cut_is_fatal() {
            for cut in ["box 0,0,0,1,1,1", "cone:1,2,3"] {
                let config = mono_config().fiducial_cut(cut).build().unwrap();
                let result = EventGenerator::initialize(
                    config,
                    ScriptedSource::new([]),
                    FakeGeometry::default(),
                    &ProgressReporter::new(),
                );
                assert!(
                    matches!(
                        result,
                        Err(EngineError::Geometry {
                            source: GeometryError::Fiducial(_)
                        })
                    ),
                    "cut {cut}"
                );
            }
        }

        #[test]
        fn short_fiducial_cut_only_disables_the_selector() {
            let config = mono_config().fiducial_cut("zcyl:0,0,150").build().unwrap();
            let generator = EventGenerator::initialize(
                config,
                ScriptedSource::new([]),
                FakeGeometry::default(),
                &ProgressReporter::new(),
            );
            assert!(generator.is_ok());
        }

        #[test]
        fn setup_stages_are_reported() {
            let stages = std::sync::Mutex::new(Vec::new());
            let reporter = ProgressReporter::with_callback(Box::new(|event| {
                if let Progress::StageStart { name } = event {
                    stages.lock().unwrap().push(name);
                }
            }));
            EventGenerator::initialize(
                mono_config().build().unwrap(),
                ScriptedSource::new([]),
                FakeGeometry::default(),
                &reporter,
            )
            .unwrap();
            drop(reporter);
            assert_eq!(
                stages.into_inner().unwrap(),
                vec!["Flux files", "Geometry", "Flux", "Geometry scan", "Event source"]
            );
        }
    }

    mod provenance {
        use super::*;

        const SIMPLE_FLUX: &str = "\
# protons_on_target = 1.0e6
pdg,wgt,vtxx,vtxy,vtxz,dist,px,py,pz,E,run,evtno
14,1.0,0.0,0.0,-5.0,400.0,0.0,0.0,2.0,2.0,3,77
14,1.0,0.0,0.0,-5.0,300.0,0.0,0.0,1.0,1.0,3,78
";

        const SPECTRA: &str = r#"
[numu]
edges = [0.0, 1.5, 2.5, 3.0]
contents = [1.0, 4.0, 5.0]

[nue]
edges = [0.0, 1.5, 2.5, 3.0]
contents = [0.0, 0.5, 0.25]
"#;

        fn fixture_dir(name: &str, content: &str) -> TempDir {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(name), content).unwrap();
            dir
        }

        #[test]
        fn simple_flux_spills_close_on_protons_on_target() {
            let dir = fixture_dir("simple_flux.csv", SIMPLE_FLUX);
            let config = GeneratorConfigBuilder::new()
                .flux_type(FluxType::SimpleNtuple)
                .flavors(BTreeSet::from([14]))
                .flux_files(vec!["simple_flux.csv".to_string()])
                .flux_search_path(vec![dir.path().to_path_buf()])
                .pot_per_spill(1.0e6)
                .top_volume("volDetEnclosure")
                .environment(seeded())
                .build()
                .unwrap();
            let event = numu_cc_event(vertex());
            let source = ScriptedSource::new([Some(event.clone()), Some(event), None]);
            let mut generator = EventGenerator::initialize(
                config,
                source,
                FakeGeometry::default(),
                &ProgressReporter::new(),
            )
            .unwrap();

            let (mut truth, mut flux, mut gtruth) = records();
            // Every row has the maximum weight, so each draw consumes half the file.
            assert!(generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
            assert_eq!(flux.kind, FluxKind::SimpleFlux);
            assert_eq!(flux.parentage.evtno, 77);
            assert_eq!(flux.decay_to_gen, 400.0);
            assert!(!generator.stop());
            assert_eq!(generator.pot_used(), 0.0);

            assert!(generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
            assert_eq!(flux.parentage.evtno, 78);
            assert!(generator.stop());
            assert_eq!(generator.pot_used(), 1.0e6);

            // The ray is still recorded when no interaction comes out of it.
            assert!(!generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
            assert_eq!(flux.kind, FluxKind::SimpleFlux);
            assert_eq!(flux.parentage.evtno, 77);
            assert_eq!(flux.parentage.ntype, 14);
            assert_eq!(generator.spill().spill_exposure(), 5.0e5);
            assert!(!generator.stop());
            assert_eq!(generator.pot_used(), 1.0e6);
        }

        #[test]
        fn histogram_flux_records_per_flavor_values() {
            let dir = fixture_dir("spectra.toml", SPECTRA);
            let config = GeneratorConfigBuilder::new()
                .flux_type(FluxType::Histogram)
                .flavors(BTreeSet::from([12, 14]))
                .flux_files(vec!["spectra.toml".to_string()])
                .flux_search_path(vec![dir.path().to_path_buf()])
                .events_per_spill(1.0)
                .top_volume("volDetEnclosure")
                .environment(seeded())
                .build()
                .unwrap();
            let source = ScriptedSource::repeating(numu_cc_event(vertex()), 1);
            let mut generator = EventGenerator::initialize(
                config,
                source,
                FakeGeometry::default(),
                &ProgressReporter::new(),
            )
            .unwrap();
            assert_eq!(generator.flux_histograms().len(), 2);

            let (mut truth, mut flux, mut gtruth) = records();
            assert!(generator.sample(&mut truth, &mut flux, &mut gtruth).unwrap());
            // The scripted neutrino carries 2 GeV.
            assert_eq!(flux.kind, FluxKind::HistPlusFocus);
            assert_eq!(flux.flavor_fluxes.numu, 4.0);
            assert_eq!(flux.flavor_fluxes.nue, 0.5);
            assert_eq!(flux.flavor_fluxes.nutau, 0.0);
            assert_eq!(flux.parentage, Default::default());
            assert!(generator.stop());
        }
    }

    mod finish {
        use super::*;

        #[test]
        fn path_lengths_are_written_when_requested() {
            let dir = TempDir::new().unwrap();
            let geometry = FakeGeometry {
                path_lengths: Some(PathLengthList([(1000180400, 2.5)].into_iter().collect())),
                ..FakeGeometry::default()
            };
            let config = mono_config()
                .beam_name("booster")
                .geom_scan("box 400 400 1.1 1")
                .build()
                .unwrap();
            let generator = EventGenerator::initialize(
                config,
                ScriptedSource::new([]),
                geometry,
                &ProgressReporter::new(),
            )
            .unwrap();
            generator.finish(dir.path()).unwrap();

            let content = fs::read_to_string(dir.path().join(MAX_PATH_LENGTH_FILE)).unwrap();
            assert!(content.contains("pdg=\"1000180400\""));
            assert!(content.contains("   FluxType:     mono\n"));
            assert!(content.contains("   BeamName:     booster\n"));
            assert!(content.contains("   TopVolume:    volDetEnclosure\n"));
            assert!(content.contains("   GeomScan:     box 400 400 1.1 1\n"));
        }

        #[test]
        fn nothing_is_written_without_request() {
            let dir = TempDir::new().unwrap();
            let geometry = FakeGeometry {
                path_lengths: Some(PathLengthList([(1000180400, 2.5)].into_iter().collect())),
                ..FakeGeometry::default()
            };
            let generator = EventGenerator::initialize(
                mono_config().build().unwrap(),
                ScriptedSource::new([]),
                geometry,
                &ProgressReporter::new(),
            )
            .unwrap();
            generator.finish(dir.path()).unwrap();
            assert!(!dir.path().join(MAX_PATH_LENGTH_FILE).exists());
        }
    }
}
