use phf::{Map, phf_map};

static FLAVOR_CODES: Map<&'static str, i32> = phf_map! {
    "nue" => 12, "nuebar" => -12,
    "numu" => 14, "numubar" => -14,
    "nutau" => 16, "nutaubar" => -16,
    "nu_e" => 12, "nu_e_bar" => -12, "anue" => -12,
    "nu_mu" => 14, "nu_mu_bar" => -14, "anumu" => -14,
    "nu_tau" => 16, "nu_tau_bar" => -16, "anutau" => -16,
};

/// PDG code for a neutrino flavor name, case-insensitive.
pub fn flavor_code(name: &str) -> Option<i32> {
    FLAVOR_CODES.get(name.trim().to_lowercase().as_str()).copied()
}

/// Canonical name under which a flavor's flux histogram is stored.
pub fn canonical_name(pdg: i32) -> Option<&'static str> {
    match pdg {
        12 => Some("nue"),
        -12 => Some("nuebar"),
        14 => Some("numu"),
        -14 => Some("numubar"),
        16 => Some("nutau"),
        -16 => Some("nutaubar"),
        _ => None,
    }
}

pub fn is_neutrino(pdg: i32) -> bool {
    canonical_name(pdg).is_some()
}

/// Generation index of a neutrino (`1` = e, `2` = mu, `3` = tau), ignoring the sign.
pub fn generation(pdg: i32) -> Option<usize> {
    match pdg.abs() {
        12 => Some(1),
        14 => Some(2),
        16 => Some(3),
        _ => None,
    }
}
