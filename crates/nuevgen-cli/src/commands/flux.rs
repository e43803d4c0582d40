use super::setup_flux;
use crate::cli::FluxArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use nuevgen::core::flux::FluxDriver;
use nuevgen::engine::progress::{Progress, ProgressReporter};
use tracing::{info, warn};

pub fn run(args: FluxArgs) -> Result<()> {
    let config = build_config(&args.config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let mut setup = setup_flux(&config, &reporter)?;

    info!(count = args.count, flux_type = %config.flux_type, "Drawing flux neutrinos");
    let lines = draw(setup.pipeline.driver_mut(), args.count, &reporter)?;

    println!("{:>6} {:>5} {:>10} {:>32} {:>10}", "#", "pdg", "E [GeV]", "position [m]", "weight");
    for line in &lines {
        println!("{}", line);
    }
    if (lines.len() as u64) < args.count {
        warn!(drawn = lines.len(), requested = args.count, "Flux ran out before all neutrinos were drawn");
        println!("Flux exhausted after {} of {} neutrinos.", lines.len(), args.count);
    }
    Ok(())
}

/// Draws up to `count` neutrinos and formats one table row per neutrino.
pub fn draw(driver: &mut dyn FluxDriver, count: u64, reporter: &ProgressReporter) -> Result<Vec<String>> {
    reporter.report(Progress::DrawStart { total: count });
    let mut lines = Vec::new();
    for i in 0..count {
        if driver.end_of_flux() {
            break;
        }
        if !driver.generate_next()? {
            reporter.report(Progress::DrawIncrement);
            continue;
        }
        let p = driver.momentum();
        let x = driver.position();
        lines.push(format!(
            "{:>6} {:>5} {:>10.4} {:>32} {:>10.4e}",
            i,
            driver.pdg_code(),
            p.w,
            format!("({:.2}, {:.2}, {:.2})", x.x, x.y, x.z),
            driver.weight()
        ));
        reporter.report(Progress::DrawIncrement);
    }
    reporter.report(Progress::DrawFinish);
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;
    use nuevgen::core::flux::MonoFlux;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    #[test]
    fn mono_draws_report_energy_and_flavor() {
        let flavors: BTreeSet<i32> = [-12].into_iter().collect();
        let mut flux = MonoFlux::new(1.5, &flavors, 9).unwrap();
        let lines = draw(&mut flux, 3, &ProgressReporter::new()).unwrap();

        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(line.contains("-12"));
            assert!(line.contains("1.5000"));
        }
    }

    #[test]
    fn progress_brackets_every_draw() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            let label = match event {
                Progress::DrawStart { total } => format!("start {}", total),
                Progress::DrawIncrement => "inc".to_string(),
                Progress::DrawFinish => "finish".to_string(),
                _ => "other".to_string(),
            };
            events.lock().unwrap().push(label);
        }));
        let flavors: BTreeSet<i32> = [14].into_iter().collect();
        let mut flux = MonoFlux::new(2.0, &flavors, 1).unwrap();
        draw(&mut flux, 2, &reporter).unwrap();
        drop(reporter);

        assert_eq!(
            events.into_inner().unwrap(),
            vec!["start 2", "inc", "inc", "finish"]
        );
    }

    #[test]
    fn run_draws_from_a_mono_configuration() {
        let args = FluxArgs {
            config: ConfigArgs {
                flux_type: Some("mono".to_string()),
                flavors: vec!["numu".to_string()],
                seed: Some(5),
                ..Default::default()
            },
            count: 4,
        };
        run(args).unwrap();
    }
}
