//! Scattered interpolation modes.

use std::fmt;
use std::str::FromStr;

use crate::error::TriangulationError;

/// How values are interpolated between triangulation vertices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Value of the nearest vertex. Defined everywhere.
    Nearest,
    /// Barycentric (piecewise planar) interpolation. NaN outside the convex hull.
    #[default]
    Linear,
    /// Clough–Tocher cubic patches built from estimated vertex gradients.
    /// NaN outside the convex hull.
    Cubic,
}

impl Mode {
    /// Returns the lowercase configuration name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Nearest => "nearest",
            Mode::Linear => "linear",
            Mode::Cubic => "cubic",
        }
    }
}

impl FromStr for Mode {
    type Err = TriangulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(Mode::Nearest),
            "linear" => Ok(Mode::Linear),
            "cubic" => Ok(Mode::Cubic),
            _ => Err(TriangulationError::UnknownMode {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_linear() {
        assert_eq!(Mode::default(), Mode::Linear);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Nearest".parse::<Mode>().unwrap(), Mode::Nearest);
        assert_eq!("LINEAR".parse::<Mode>().unwrap(), Mode::Linear);
        assert_eq!("cubic".parse::<Mode>().unwrap(), Mode::Cubic);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "spline".parse::<Mode>().unwrap_err();
        assert!(matches!(err, TriangulationError::UnknownMode { ref name } if name == "spline"));
    }

    #[test]
    fn test_display_round_trips() {
        for mode in [Mode::Nearest, Mode::Linear, Mode::Cubic] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }
}
