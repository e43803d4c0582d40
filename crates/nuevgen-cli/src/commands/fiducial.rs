use crate::cli::FiducialArgs;
use crate::error::Result;
use nuevgen::core::fiducial::{FiducialSpec, parse_fiducial_cut};
use tracing::info;

pub fn run(args: FiducialArgs) -> Result<()> {
    info!(cut = %args.cut, "Parsing fiducial cut");
    let spec = parse_fiducial_cut(&args.cut)?;
    println!("{}", describe(spec.as_ref()));
    Ok(())
}

pub fn describe(spec: Option<&FiducialSpec>) -> String {
    match spec {
        None => "Fiducial cut: none (every vertex accepted)".to_string(),
        Some(FiducialSpec::Volume {
            shape,
            reverse,
            master,
        }) => format!(
            "Fiducial cut: {:?}\n  frame:   {}\n  accepts: {}",
            shape,
            if *master { "master" } else { "top volume" },
            if *reverse { "outside" } else { "inside" },
        ),
        Some(FiducialSpec::RockBox(rock)) => format!(
            "Fiducial cut: rock box {:?}\n  effective dE/dx: {}\n  exclusion: {:?}",
            rock,
            rock.effective_dedx(),
            rock.exclusion(),
        ),
    }
}
