//! Main MargaConfig.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::driver::DriverConfig;
use crate::error::Result;
use crate::estimation::EstimatorConfig;
use crate::layout::Layout;
use crate::planning::PlannerConfig;

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "configs/marga.yaml";

/// Full Marga configuration loaded from YAML
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MargaConfig {
    /// World layout
    #[serde(default)]
    pub layout: Layout,

    /// Particle filter settings
    #[serde(default)]
    pub estimator: EstimatorConfig,

    /// Planner cost and wait settings
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Loop timing
    #[serde(default)]
    pub driver: DriverConfig,
}

impl MargaConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/marga.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write to a YAML file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.estimator.validate()?;
        self.planner.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GridCoord;
    use crate::error::MargaError;
    use crate::layout::BlockRect;

    #[test]
    fn test_default_config() {
        let config = MargaConfig::default();
        assert_eq!(config.layout.rows, 10);
        assert_eq!(config.planner.cost_factor, 1000.0);
        assert_eq!(config.planner.checkpoint_discount, 0.5);
        assert_eq!(config.driver.burn_in_ticks, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = MargaConfig::default();
        config.layout = Layout::new(6, 8)
            .with_block(BlockRect::new(1, 1, 3, 4))
            .with_checkpoints(vec![GridCoord::new(5, 7), GridCoord::new(0, 0)]);
        config.estimator.seed = 99;

        let yaml = config.to_yaml().unwrap();
        let parsed = MargaConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
layout:
  rows: 4
  cols: 5
  checkpoints:
    - { row: 3, col: 4 }
planner:
  cost_factor: 200.0
  parked_kernel:
    rings: [2.0, 1.0]
"#;
        let config = MargaConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.layout.cols, 5);
        assert_eq!(config.layout.tile_size, 1.0);
        assert_eq!(config.planner.cost_factor, 200.0);
        assert_eq!(config.planner.moving_wait_rate, 500.0);
        assert_eq!(config.planner.parked_kernel.rings, vec![2.0, 1.0]);
        assert_eq!(config.estimator.particle_factor, 10);
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let bad = "planner:\n  checkpoint_discount: 1.5\n";
        assert!(matches!(
            MargaConfig::from_yaml(bad),
            Err(MargaError::InvalidConfig(_))
        ));
        assert!(matches!(
            MargaConfig::from_yaml("layout: [1, 2"),
            Err(MargaError::Yaml(_))
        ));
    }

    #[test]
    fn test_bundled_config_parses() {
        let config = MargaConfig::from_yaml(include_str!("../../configs/marga.yaml")).unwrap();
        assert_eq!(config.layout.checkpoints.len(), 3);
        assert_eq!(config.planner, crate::planning::PlannerConfig::default());
        assert_eq!(config.driver.burn_in_ticks, 30);
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marga.yaml");
        let config = MargaConfig::default();
        config.save(&path).unwrap();
        assert_eq!(MargaConfig::load(&path).unwrap(), config);

        assert!(matches!(
            MargaConfig::load(&dir.path().join("missing.yaml")),
            Err(MargaError::Io(_))
        ));
    }
}
