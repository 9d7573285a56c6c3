use anyhow::{bail, Result};
use cache_sim::geometry::Geometry;
use serde::Deserialize;

const USAGE: &str = "Usage: csim [-hv] -s <s> -E <E> -b <b> -t <tracefile>";

/// geometry parameters, each of which may be missing until sources are merged.
#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeometryConfig {
    pub set_index_bits: Option<u32>,
    pub associativity: Option<usize>,
    pub block_bits: Option<u32>,
}

impl GeometryConfig {
    pub fn deser(file: impl std::io::Read) -> Result<Self> {
        Ok(serde_json::from_reader(file)?)
    }

    /// fields of `self` win over those of `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            set_index_bits: self.set_index_bits.or(fallback.set_index_bits),
            associativity: self.associativity.or(fallback.associativity),
            block_bits: self.block_bits.or(fallback.block_bits),
        }
    }

    /// `s`, `E` and `b` must all be given and non-zero.
    pub fn into_geometry(self) -> Result<Geometry> {
        let (Some(s), Some(e), Some(b)) = (self.set_index_bits, self.associativity, self.block_bits)
        else {
            bail!("missing cache geometry.\n{USAGE}");
        };
        if s == 0 || e == 0 || b == 0 {
            bail!("s, E and b must be positive.\n{USAGE}");
        }
        Ok(Geometry::new(s, e, b)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deser() {
        let c = GeometryConfig::deser(r#"{"set_index_bits": 4, "block_bits": 2}"#.as_bytes())
            .unwrap();
        assert_eq!(Some(4), c.set_index_bits);
        assert_eq!(None, c.associativity);
        assert!(GeometryConfig::deser(r#"{"sets": 4}"#.as_bytes()).is_err());
    }
    #[test]
    fn test_flags_override_file() {
        let flags = GeometryConfig {
            set_index_bits: Some(2),
            associativity: None,
            block_bits: None,
        };
        let file = GeometryConfig {
            set_index_bits: Some(5),
            associativity: Some(4),
            block_bits: Some(3),
        };
        let g = flags.or(file).into_geometry().unwrap();
        assert_eq!(2, g.set_index_bits());
        assert_eq!(4, g.associativity());
        assert_eq!(3, g.block_bits());
    }
    #[test]
    fn test_rejects_missing_or_zero() {
        assert!(GeometryConfig::default().into_geometry().is_err());
        let zero = GeometryConfig {
            set_index_bits: Some(0),
            associativity: Some(1),
            block_bits: Some(4),
        };
        assert!(zero.into_geometry().is_err());
        let wide = GeometryConfig {
            set_index_bits: Some(32),
            associativity: Some(1),
            block_bits: Some(40),
        };
        assert!(wide.into_geometry().is_err());
        let huge = GeometryConfig {
            set_index_bits: Some(1),
            associativity: Some(usize::MAX),
            block_bits: Some(1),
        };
        assert!(huge.into_geometry().is_err());
    }
}
