use super::shapes::FiducialShape;
use nalgebra::Point3;
use thiserror::Error;
use tracing::warn;

const VALUE_SEPARATORS: &[char] = &[' ', ',', ';', '(', ')', '{', '}', '[', ']'];
const MIN_PADDED_VALUES: usize = 7;

const DEFAULT_ROCK_ONLY: bool = true;
const DEFAULT_WALL_MIN_CM: f64 = 800.0;
const DEFAULT_DEDX_GEV_PER_CM: f64 = 2.5 * 1.7e-3;
const DEFAULT_DEDX_FUDGE: f64 = 1.05;

/// Problems with a fiducial-cut string.
///
/// Value-count problems are recoverable (see [`FiducialError::is_recoverable`]); a cut without
/// the `shape:values` structure, with an unknown shape or with a non-numeric value is not.
#[derive(Debug, Error, PartialEq)]
pub enum FiducialError {
    #[error("No ':' separating the shape from its values in '{cut}' ({pieces} pieces)")]
    MissingSeparator { cut: String, pieces: usize },
    #[error("Unknown fiducial shape '{0}'")]
    UnknownShape(String),
    #[error("Shape '{shape}' needs {needed} values, found {found} in '{cut}'")]
    TooFewValues {
        shape: &'static str,
        needed: usize,
        found: usize,
        cut: String,
    },
    #[error("zpoly needs at least 3 faces, not {0}")]
    TooFewFaces(i64),
    #[error("zpoly face count {0} is out of range")]
    TooManyFaces(i64),
    #[error("Invalid numeric value '{0}'")]
    InvalidValue(String),
}

impl FiducialError {
    /// Whether generation may proceed without a selector after reporting this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TooFewValues { .. } | Self::TooFewFaces(_) | Self::TooManyFaces(_)
        )
    }
}

/// Rock-box selection: a minimal box around the detector, expanded by a wall that depends on
/// the muon range of the neutrino energy.
#[derive(Debug, Clone, PartialEq)]
pub struct RockBoxSpec {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
    pub rock_only: bool,
    pub wall_min: f64,
    pub dedx: f64,
    pub fudge: f64,
}

impl RockBoxSpec {
    /// Energy loss per length with the safety fudge applied.
    pub fn effective_dedx(&self) -> f64 {
        self.dedx / self.fudge
    }

    /// The volume excluded from the expanded box.
    pub fn exclusion(&self) -> FiducialShape {
        if self.rock_only {
            FiducialShape::Box {
                min: self.min,
                max: self.max,
            }
        } else {
            FiducialShape::Sphere {
                center: Point3::origin(),
                radius: 1.0e-10,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FiducialSpec {
    Volume {
        shape: FiducialShape,
        reverse: bool,
        master: bool,
    },
    /// Always expressed in master-frame coordinates.
    RockBox(RockBoxSpec),
}

impl FiducialSpec {
    pub fn is_rock_box(&self) -> bool {
        matches!(self, Self::RockBox(_))
    }
}

/// Numeric values of a cut, zero-padded, together with how many were actually given.
#[derive(Debug, Clone, PartialEq)]
pub struct FiducialValues {
    pub values: Vec<f64>,
    pub supplied: usize,
}

impl FiducialValues {
    pub fn parse(text: &str, pad_to: usize) -> Result<Self, FiducialError> {
        let mut values = text
            .split(VALUE_SEPARATORS)
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| FiducialError::InvalidValue(tok.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let supplied = values.len();
        if values.len() < pad_to {
            values.resize(pad_to, 0.0);
        }
        Ok(Self { values, supplied })
    }

    fn require(&self, shape: &'static str, needed: usize, cut: &str) -> Result<(), FiducialError> {
        if self.supplied < needed {
            return Err(FiducialError::TooFewValues {
                shape,
                needed,
                found: self.supplied,
                cut: cut.to_string(),
            });
        }
        Ok(())
    }
}

/// Minimum number of values each shape token requires.
pub fn minimum_values(shape: &str) -> Option<usize> {
    if shape.contains("rock") {
        Some(6)
    } else if shape.contains("zcyl") {
        Some(5)
    } else if shape.contains("box") {
        Some(6)
    } else if shape.contains("zpoly") {
        Some(7)
    } else if shape.contains("sphere") {
        Some(4)
    } else {
        None
    }
}

/// Parses a fiducial-cut string.
///
/// Returns `Ok(None)` for an empty string or `none`.
pub fn parse_fiducial_cut(input: &str) -> Result<Option<FiducialSpec>, FiducialError> {
    let cut = input.trim_start().to_lowercase();
    let cut = cut.trim_end();
    if cut.is_empty() || cut == "none" {
        return Ok(None);
    }

    let pieces: Vec<&str> = cut.split(':').collect();
    let [stype, value_text] = pieces[..] else {
        return Err(FiducialError::MissingSeparator {
            cut: cut.to_string(),
            pieces: pieces.len(),
        });
    };

    let needed = minimum_values(stype).ok_or_else(|| FiducialError::UnknownShape(stype.into()))?;
    let vals = FiducialValues::parse(value_text, needed.max(MIN_PADDED_VALUES))?;
    vals.require(shape_label(stype), needed, cut)?;
    let v = &vals.values;

    if stype.contains("rock") {
        let n = vals.supplied;
        let spec = RockBoxSpec {
            min: Point3::new(v[0], v[1], v[2]),
            max: Point3::new(v[3], v[4], v[5]),
            rock_only: if n >= 7 { v[6] != 0.0 } else { DEFAULT_ROCK_ONLY },
            wall_min: if n >= 8 { v[7] } else { DEFAULT_WALL_MIN_CM },
            dedx: if n >= 9 { v[8] } else { DEFAULT_DEDX_GEV_PER_CM },
            fudge: if n >= 10 { v[9] } else { DEFAULT_DEDX_FUDGE },
        };
        return Ok(Some(FiducialSpec::RockBox(spec)));
    }

    let reverse = stype.contains('0');
    let master = stype.contains('m');

    let shape = if stype.contains("zcyl") {
        FiducialShape::ZCylinder {
            x0: v[0],
            y0: v[1],
            radius: v[2],
            z_min: v[3],
            z_max: v[4],
        }
    } else if stype.contains("box") {
        if v[3] != v[4] || v[4] != v[5] {
            warn!(
                cut,
                "Box maximum is taken as ({}, {}, {}), not ({}, {}, {})",
                v[4],
                v[5],
                v[5],
                v[3],
                v[4],
                v[5]
            );
        }
        FiducialShape::Box {
            min: Point3::new(v[0], v[1], v[2]),
            max: Point3::new(v[4], v[5], v[5]),
        }
    } else if stype.contains("zpoly") {
        let n_faces = v[0] as i64;
        if n_faces < 3 {
            return Err(FiducialError::TooFewFaces(n_faces));
        }
        let n_faces = u32::try_from(n_faces).map_err(|_| FiducialError::TooManyFaces(n_faces))?;
        FiducialShape::ZPolygon {
            n_faces,
            x0: v[1],
            y0: v[2],
            inscribed_radius: v[3],
            phi: v[4],
            z_min: v[5],
            z_max: v[6],
        }
    } else {
        FiducialShape::Sphere {
            center: Point3::new(v[0], v[1], v[2]),
            radius: v[3],
        }
    };

    Ok(Some(FiducialSpec::Volume {
        shape,
        reverse,
        master,
    }))
}

fn shape_label(stype: &str) -> &'static str {
    ["rock", "zcyl", "box", "zpoly", "sphere"]
        .into_iter()
        .find(|s| stype.contains(s))
        .unwrap_or("unknown")
}
