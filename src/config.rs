//! Generator construction parameters and their defaults.

use serde::Deserialize;

use crate::calibration::Method;
use crate::error::{Error, Result};

/// Construction parameters for a [`crate::generator::DomesticWaterGenerator`].
///
/// All fields have documented defaults sized for a mid-rise French collective
/// housing building. Build one with struct-update syntax or parse it from a
/// TOML string with [`GeneratorConfig::from_toml_str`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Number of dwellings in the building (must be > 0).
    pub n_dwellings: u32,
    /// Coefficient method, `COSTIC` or `RE2020`.
    pub method: Method,
    /// Average dwelling floor area in m² (RE2020 scaling).
    pub s_moy_dwelling: f64,
    /// Total building floor area in m² (RE2020 scaling).
    pub s_tot_building: f64,
    /// Average occupants per dwelling.
    pub n_people_per_dwelling: f64,
    /// Dishwasher cycles per person per year.
    pub cycles_dish_pers: f64,
    /// Washing-machine cycles per person per year.
    pub cycles_clothes_pers: f64,
    /// Water volume per dishwasher cycle, liters.
    pub v_water_dish: f64,
    /// Water volume per washing-machine cycle, liters.
    pub v_water_clothes: f64,
    /// Daily washbasin cold-water draw per dwelling, liters.
    pub v_washbasin: f64,
    /// Hot-water volume of one shower event, liters.
    pub v_shower: f64,
    /// COSTIC shower volume per dwelling per hour at coefficient 1.0, liters.
    pub v_hourly_base: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_dwellings: 1,
            method: Method::Costic,
            s_moy_dwelling: 49.6,
            s_tot_building: 2480.0,
            n_people_per_dwelling: 2.3,
            cycles_dish_pers: 83.0,
            cycles_clothes_pers: 94.0,
            v_water_dish: 13.0,
            v_water_clothes: 50.0,
            v_washbasin: 16.0,
            v_shower: 40.0,
            v_hourly_base: 5.0,
        }
    }
}

impl GeneratorConfig {
    /// Parses a configuration from a TOML string.
    ///
    /// Absent fields keep their defaults; unknown fields are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the TOML is invalid.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Validates every field, returning the first violated constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.n_dwellings == 0 {
            return Err(Error::Configuration("n_dwellings must be > 0".to_string()));
        }
        let positive = [
            ("s_moy_dwelling", self.s_moy_dwelling),
            ("s_tot_building", self.s_tot_building),
            ("n_people_per_dwelling", self.n_people_per_dwelling),
            ("v_water_dish", self.v_water_dish),
            ("v_water_clothes", self.v_water_clothes),
            ("v_washbasin", self.v_washbasin),
            ("v_shower", self.v_shower),
            ("v_hourly_base", self.v_hourly_base),
        ];
        for (field, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(Error::Configuration(format!("{field} must be > 0")));
            }
        }
        let non_negative = [
            ("cycles_dish_pers", self.cycles_dish_pers),
            ("cycles_clothes_pers", self.cycles_clothes_pers),
        ];
        for (field, value) in non_negative {
            if value < 0.0 || !value.is_finite() {
                return Err(Error::Configuration(format!("{field} must be >= 0")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GeneratorConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.method, Method::Costic);
        assert_eq!(cfg.n_dwellings, 1);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = GeneratorConfig::from_toml_str(
            "n_dwellings = 50\nmethod = \"RE2020\"\ns_moy_dwelling = 49.6\n",
        )
        .expect("valid toml");
        assert_eq!(cfg.n_dwellings, 50);
        assert_eq!(cfg.method, Method::Re2020);
        // untouched fields keep defaults
        assert_eq!(cfg.v_shower, 40.0);
        assert_eq!(cfg.n_people_per_dwelling, 2.3);
    }

    #[test]
    fn unknown_field_rejected() {
        let result = GeneratorConfig::from_toml_str("bogus_field = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn zero_dwellings_rejected() {
        let cfg = GeneratorConfig {
            n_dwellings: 0,
            ..GeneratorConfig::default()
        };
        let err = cfg.validate().expect_err("should reject");
        assert!(err.to_string().contains("n_dwellings"));
    }

    #[test]
    fn negative_volume_rejected() {
        let cfg = GeneratorConfig {
            v_washbasin: -1.0,
            ..GeneratorConfig::default()
        };
        let err = cfg.validate().expect_err("should reject");
        assert!(err.to_string().contains("v_washbasin"));
    }
}
