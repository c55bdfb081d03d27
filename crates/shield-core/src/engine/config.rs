use crate::core::models::geometry::ApertureGeometry;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {parameter}: {message}")]
    InvalidParameter {
        parameter: &'static str,
        message: String,
    },
}

/// One fully specified shielding scenario.
///
/// Immutable once a study begins; every trial of the study shares these
/// parameters and differs only in its seed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    /// Material id of the shielding block, e.g. `"Pb"` or `"Cu"`.
    pub material: String,
    /// Primary particles generated per trial.
    pub events_per_run: u32,
    /// Number of independent stochastic trials.
    pub run_count: usize,
    /// Shielding block thickness, metres.
    pub thickness: f64,
    /// Scenario tag used to key lattice and output files.
    pub run_key: String,
    pub geometry: ApertureGeometry,
}

#[derive(Default)]
pub struct ScenarioConfigBuilder {
    material: Option<String>,
    events_per_run: Option<u32>,
    run_count: Option<usize>,
    thickness: Option<f64>,
    run_key: Option<String>,
    geometry: Option<ApertureGeometry>,
}

impl ScenarioConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }
    pub fn events_per_run(mut self, events: u32) -> Self {
        self.events_per_run = Some(events);
        self
    }
    pub fn run_count(mut self, runs: usize) -> Self {
        self.run_count = Some(runs);
        self
    }
    pub fn thickness(mut self, thickness: f64) -> Self {
        self.thickness = Some(thickness);
        self
    }
    pub fn run_key(mut self, key: impl Into<String>) -> Self {
        self.run_key = Some(key.into());
        self
    }
    pub fn geometry(mut self, geometry: ApertureGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn build(self) -> Result<ScenarioConfig, ConfigError> {
        let events_per_run = self
            .events_per_run
            .ok_or(ConfigError::MissingParameter("events_per_run"))?;
        if events_per_run == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "events_per_run",
                message: "must be positive".to_string(),
            });
        }
        let run_count = self
            .run_count
            .ok_or(ConfigError::MissingParameter("run_count"))?;
        if run_count == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "run_count",
                message: "must be positive".to_string(),
            });
        }
        let thickness = self
            .thickness
            .ok_or(ConfigError::MissingParameter("thickness"))?;
        if thickness < 0.0 || thickness.is_nan() {
            return Err(ConfigError::InvalidParameter {
                parameter: "thickness",
                message: format!("must be non-negative, got {thickness}"),
            });
        }

        Ok(ScenarioConfig {
            material: self.material.ok_or(ConfigError::MissingParameter("material"))?,
            events_per_run,
            run_count,
            thickness,
            run_key: self.run_key.ok_or(ConfigError::MissingParameter("run_key"))?,
            geometry: self.geometry.ok_or(ConfigError::MissingParameter("geometry"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> ApertureGeometry {
        ApertureGeometry {
            electron_aperture: 0.005,
            proton_aperture: 0.02,
            beam_separation: 0.121896,
        }
    }

    fn complete_builder() -> ScenarioConfigBuilder {
        ScenarioConfigBuilder::new()
            .material("Pb")
            .events_per_run(10_000)
            .run_count(30)
            .thickness(0.05)
            .run_key("dipole_full")
            .geometry(geometry())
    }

    #[test]
    fn complete_builder_produces_config() {
        let config = complete_builder().build().unwrap();
        assert_eq!(config.material, "Pb");
        assert_eq!(config.run_count, 30);
        assert_eq!(config.thickness, 0.05);
    }

    #[test]
    fn missing_material_is_reported() {
        let result = ScenarioConfigBuilder::new()
            .events_per_run(100)
            .run_count(1)
            .thickness(0.0)
            .run_key("k")
            .geometry(geometry())
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("material")));
    }

    #[test]
    fn zero_runs_and_negative_thickness_are_rejected() {
        assert!(matches!(
            complete_builder().run_count(0).build(),
            Err(ConfigError::InvalidParameter { parameter: "run_count", .. })
        ));
        assert!(matches!(
            complete_builder().thickness(-0.01).build(),
            Err(ConfigError::InvalidParameter { parameter: "thickness", .. })
        ));
    }

    #[test]
    fn zero_thickness_is_a_valid_null_barrier() {
        assert!(complete_builder().thickness(0.0).build().is_ok());
    }
}
