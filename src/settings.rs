use crate::cluster::{check_temperature, MAX_POINTS};
use crate::error::{ClusterError, ClusterResult};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Settings shared by cluster engines built for a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct EngineSettings {
    /// Temperature used to evaluate Mayer bonds.
    pub temperature: f64,
    /// Largest cluster an engine may be built for. Capped at [`MAX_POINTS`].
    pub max_points: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_points: MAX_POINTS,
        }
    }
}

impl EngineSettings {
    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the largest allowed cluster.
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> ClusterResult<()> {
        check_temperature(self.temperature)?;
        if self.max_points > MAX_POINTS {
            return Err(ClusterError::TooManyPoints {
                n: self.max_points,
                max: MAX_POINTS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert_eq!(EngineSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid() {
        let s = EngineSettings::default().with_temperature(-3.0);
        assert_eq!(
            s.validate(),
            Err(ClusterError::InvalidTemperature { temperature: -3.0 })
        );
        let s = EngineSettings::default().with_max_points(40);
        assert_eq!(
            s.validate(),
            Err(ClusterError::TooManyPoints { n: 40, max: 20 })
        );
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_json() {
        let s: EngineSettings = serde_json::from_str(r#"{"temperature": 2.5}"#).unwrap();
        assert_eq!(s.temperature, 2.5);
        assert_eq!(s.max_points, MAX_POINTS);
        let back: EngineSettings =
            serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert_eq!(back, s);
    }
}
