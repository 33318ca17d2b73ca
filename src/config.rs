use crate::topology::Topology;
use crate::utils::check_num;
use crate::weights::MutationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// World constants shared by every agent of a tick.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Side length of the square world.
    pub grid_size: f64,
    pub visibility_radius: f64,
    pub max_energy: f64,
    /// Largest heading change per tick, in radians.
    pub max_turn_angle: f64,
    pub max_speed: f64,
}

impl EnvironmentConfig {
    fn validate(&self) -> Result<()> {
        let max = 1e9;
        check_num(self.grid_size, f64::MIN_POSITIVE..max).context("invalid grid size")?;
        check_num(self.visibility_radius, f64::MIN_POSITIVE..max)
            .context("invalid visibility radius")?;
        check_num(self.max_energy, f64::MIN_POSITIVE..max).context("invalid maximum energy")?;
        check_num(self.max_turn_angle, 0.0..=std::f64::consts::PI)
            .context("invalid maximum turn angle")?;
        check_num(self.max_speed, 0.0..max).context("invalid maximum speed")?;
        Ok(())
    }
}

/// Configuration of a working directory.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Master seed. Omit to seed from the operating system.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Network layout shared by every agent.
    #[serde(default)]
    pub topology: Topology,

    pub environment: EnvironmentConfig,

    #[serde(default)]
    pub mutation: MutationConfig,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.environment.validate().context("invalid environment")?;
        self.mutation.validate().context("invalid mutation")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::senses::Feature;
    use crate::topology::Preset;

    const ENVIRONMENT: &str = "
[environment]
gridSize = 100.0
visibilityRadius = 20.0
maxEnergy = 1000.0
maxTurnAngle = 0.5
maxSpeed = 2.0
";

    #[test]
    fn defaults_fill_optional_tables() {
        let cfg = Config::from_toml(ENVIRONMENT).unwrap();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.topology, Topology::preset(Preset::Full));
        assert_eq!(cfg.mutation, MutationConfig::default());
        assert_eq!(cfg.environment.max_speed, 2.0);
    }

    #[test]
    fn explicit_tables_are_read() {
        let contents = String::new()
            + "seed = 42\n"
            + "\n"
            + "[topology]\n"
            + "features = [\"food_angle\", \"food_magnitude\", \"noise\", \"bias\"]\n"
            + "hidden_size = 3\n"
            + "output_size = 2\n"
            + "\n"
            + "[mutation]\n"
            + "step = 0.2\n"
            + ENVIRONMENT;
        let cfg = Config::from_toml(&contents).unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.topology.features()[2], Feature::Noise);
        assert_eq!(cfg.topology.n_weights(), 3 * 4 + 2 * 3);
        assert_eq!(cfg.mutation.step, 0.2);
        assert_eq!(cfg.mutation.bound, 1.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_radius = ENVIRONMENT.replace("visibilityRadius = 20.0", "visibilityRadius = 0.0");
        assert!(Config::from_toml(&zero_radius).is_err());

        let bad_step = format!("[mutation]\nstep = 5.0\n{ENVIRONMENT}");
        assert!(Config::from_toml(&bad_step).is_err());

        let bad_feature = format!("[topology]\nfeatures = [\"smell\"]\n{ENVIRONMENT}");
        assert!(Config::from_toml(&bad_feature).is_err());

        assert!(Config::from_toml("seed = 1\n").is_err());
    }
}
