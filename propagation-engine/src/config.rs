use serde::Deserialize;

use crate::error::{PropagationError, Result};

/// Bounce-count ceilings past which an eigenray or eigenverb is dropped.
/// Defaults of 999 mean "effectively unbounded", matching the defaults a
/// run gets if the caller never configures them.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BounceLimits {
    pub max_bottom: u32,
    pub max_surface: u32,
    pub max_caustic: u32,
    pub max_upper: u32,
    pub max_lower: u32,
}

impl Default for BounceLimits {
    fn default() -> Self {
        Self {
            max_bottom: 999,
            max_surface: 999,
            max_caustic: 999,
            max_upper: 999,
            max_lower: 999,
        }
    }
}

/// Full configuration for one propagation run. Deserialized from TOML by
/// the `propagation-demo` binary; constructed directly by library callers
/// and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub frequencies_hz: Vec<f64>,
    pub de_fan_deg: Vec<f64>,
    pub az_fan_deg: Vec<f64>,

    pub time_step_s: f64,
    pub time_minimum_s: f64,
    pub time_maximum_s: f64,

    /// Positive dB; an eigenray is kept if at least one frequency's loss
    /// is below this.
    #[serde(default = "default_intensity_threshold_db")]
    pub intensity_threshold_db: f64,

    /// Positive dB; an eigenverb is kept if its peak power at at least one
    /// frequency is above this (after conversion to linear units).
    #[serde(default = "default_eigenverb_threshold_db")]
    pub eigenverb_threshold_db: f64,

    #[serde(default)]
    pub bounce_limits: BounceLimits,

    /// Multiple of `max(length, width)` within which a biverb search box
    /// considers candidate patches.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,

    /// Size, relative to the receiver patch, of the spatial-index search
    /// box used to find candidate source patches.
    #[serde(default = "default_search_scale")]
    pub search_scale: f64,

    /// Minimum biverb peak power (linear) below which a biverb is dropped.
    #[serde(default = "default_power_threshold")]
    pub power_threshold: f64,

    #[serde(default)]
    pub coherent: bool,
}

fn default_intensity_threshold_db() -> f64 {
    300.0
}

fn default_eigenverb_threshold_db() -> f64 {
    300.0
}

fn default_distance_threshold() -> f64 {
    6.0
}

fn default_search_scale() -> f64 {
    3.0
}

fn default_power_threshold() -> f64 {
    1e-30
}

impl RunConfig {
    /// Fails with `InvalidConfiguration` for every case enumerated in the
    /// error-handling design: empty frequency list, empty DE/AZ fan, or a
    /// non-positive `time_maximum_s`.
    pub fn validate(&self) -> Result<()> {
        if self.frequencies_hz.is_empty() {
            return Err(PropagationError::InvalidConfiguration(
                "frequencies must not be empty".to_string(),
            ));
        }
        if self.frequencies_hz.iter().any(|&f| f <= 0.0) {
            return Err(PropagationError::InvalidConfiguration(
                "frequencies must be positive".to_string(),
            ));
        }
        if self.de_fan_deg.is_empty() {
            return Err(PropagationError::InvalidConfiguration(
                "DE fan must not be empty".to_string(),
            ));
        }
        if self.az_fan_deg.is_empty() {
            return Err(PropagationError::InvalidConfiguration(
                "AZ fan must not be empty".to_string(),
            ));
        }
        if self.time_maximum_s <= 0.0 {
            return Err(PropagationError::InvalidConfiguration(
                "time_maximum_s must be positive".to_string(),
            ));
        }
        if self.time_step_s <= 0.0 {
            return Err(PropagationError::InvalidConfiguration(
                "time_step_s must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Eigenverb power threshold converted from dB to linear units.
    pub fn eigenverb_power_threshold(&self) -> f64 {
        10f64.powf(-0.1 * self.eigenverb_threshold_db.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RunConfig {
        RunConfig {
            frequencies_hz: vec![1000.0],
            de_fan_deg: vec![-10.0, 0.0, 10.0],
            az_fan_deg: vec![0.0],
            time_step_s: 0.1,
            time_minimum_s: 0.0,
            time_maximum_s: 10.0,
            intensity_threshold_db: default_intensity_threshold_db(),
            eigenverb_threshold_db: default_eigenverb_threshold_db(),
            bounce_limits: BounceLimits::default(),
            distance_threshold: default_distance_threshold(),
            search_scale: default_search_scale(),
            power_threshold: default_power_threshold(),
            coherent: true,
        }
    }

    #[test]
    fn rejects_empty_frequencies() {
        let mut cfg = base_config();
        cfg.frequencies_hz.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_time_maximum() {
        let mut cfg = base_config();
        cfg.time_maximum_s = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_config() {
        assert!(base_config().validate().is_ok());
    }
}
