/// Average nucleon mass in GeV, used for the lepton-side kinematic invariants.
pub const NUCLEON_MASS_GEV: f64 = 0.938_918_747_3;

/// Proton mass in kg, used to turn a detector mass into a number of target nucleons.
pub const PROTON_MASS_KG: f64 = 1.672_621_58e-27;

/// Nominal interaction cross section (cm^2) for histogram event-rate estimates.
pub const NOMINAL_CROSS_SECTION_CM2: f64 = 1.0e-38;

/// Histogram fluxes are normalized per 1e20 protons on target.
pub const HISTOGRAM_FLUX_POT_NORMALIZATION: f64 = 1.0e-20;

/// Atmospheric samplers report flux per m^2 while generation works per cm^2.
pub const ATMOSPHERIC_AREA_CONVERSION: f64 = 1.0e4;

/// Offset added to NUANCE-style reaction codes to form the interaction type code.
pub const NUANCE_OFFSET: i32 = 1000;

pub const FERMI_TO_METER: f64 = 1.0e-15;
pub const METER_TO_CENTIMETER: f64 = 100.0;

/// Upstream-z overrides at or beyond this magnitude mean "not set".
pub const UPSTREAM_Z_UNSET_LIMIT: f64 = 1.0e30;

/// Sentinel written into kinematic invariants when no struck nucleon was identified.
pub const KINEMATIC_SENTINEL: f64 = -1.0;

/// Histogram flux value returned for flux types that carry no histograms.
pub const NO_HISTOGRAM_FLUX: f64 = -999.0;
