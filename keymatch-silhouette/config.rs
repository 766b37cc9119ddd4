use keymatch_core::KeyConfig;
use crate::builder::SilhouetteBuilder;
use crate::error::{SilhouetteError, SilhouetteResult};
use crate::types::{BoxFillMode, SmoothingRule};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable constants of the silhouette stages
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SilhouetteConfig {
    /// Runtime settings shared with the rest of the pipeline
    pub core: KeyConfig,
    /// Luminosity histogram bin width
    pub bin_width: u8,
    /// Contagion smoothing runs for distances `1 .. max_cleaning_distance`
    pub max_cleaning_distance: usize,
    pub smoothing: SmoothingRule,
    /// Horizontal runs shorter than this are filled
    pub min_box_width: usize,
    /// Vertical runs shorter than this are filled
    pub min_box_height: usize,
    pub box_fill: BoxFillMode,
    /// Upper bound on smoothing scans per distance
    pub max_smoothing_passes: usize,
    /// Largest perpendicular distance (pixels) from a projected blade line
    pub blade_distance_threshold: f64,
    /// Right-edge points a candidate blade line is projected across
    pub blade_projection_length: usize,
    /// Tolerance (radians) between a projected line and the key tilt
    pub angle_offset_threshold: f64,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for SilhouetteConfig {
    fn default() -> Self {
        Self {
            core: KeyConfig::default(),
            bin_width: 5,
            max_cleaning_distance: 5,
            smoothing: SmoothingRule::Legacy,
            min_box_width: 10,
            min_box_height: 10,
            box_fill: BoxFillMode::Legacy,
            max_smoothing_passes: 10_000,
            blade_distance_threshold: 5.0,
            blade_projection_length: 200,
            angle_offset_threshold: 0.001,
            name: None,
            description: None,
        }
    }
}

impl SilhouetteConfig {
    /// The cleaning rules of the program that produced the stored key
    /// database. Silhouettes match; descriptors do not (see
    /// `ShapeDescriptorBuilder`).
    pub fn reference_preset() -> Self {
        Self::default().with_metadata("Reference", "Cleaning rules of the stored key database")
    }

    /// Box fill restricted to rows and applied to every column, with the
    /// horizontal smoothing test on every cell
    pub fn row_clipped_preset() -> Self {
        Self {
            box_fill: BoxFillMode::RowClipped,
            smoothing: SmoothingRule::Combined,
            ..Self::default()
        }
        .with_metadata("Row clipped", "Box fill over every column clipped to rows, combined smoothing")
    }

    /// Add metadata to configuration
    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    /// Convert to SilhouetteBuilder for further customization
    pub fn to_builder(self) -> SilhouetteBuilder {
        SilhouetteBuilder::from_config(self)
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "SilhouetteConfig: bin_width={}, cleaning_distance<{} ({:?}), box={}x{} ({:?}), blade=[distance<={}, projection={}, angle_tol={}], threads={}",
            self.bin_width,
            self.max_cleaning_distance,
            self.smoothing,
            self.min_box_width,
            self.min_box_height,
            self.box_fill,
            self.blade_distance_threshold,
            self.blade_projection_length,
            self.angle_offset_threshold,
            self.core.n_threads
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> SilhouetteResult<()> {
        if self.bin_width == 0 {
            return Err(SilhouetteError::InvalidConfig("bin_width must be at least 1".into()));
        }
        if self.max_smoothing_passes == 0 {
            return Err(SilhouetteError::InvalidConfig(
                "max_smoothing_passes must be at least 1".into(),
            ));
        }
        if self.core.n_threads == 0 {
            return Err(SilhouetteError::InvalidConfig("n_threads must be at least 1".into()));
        }
        for (name, value) in [
            ("blade_distance_threshold", self.blade_distance_threshold),
            ("angle_offset_threshold", self.angle_offset_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SilhouetteError::InvalidConfig(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SilhouetteConfig::default().validate().is_ok());
        assert!(SilhouetteConfig::reference_preset().validate().is_ok());
        assert_eq!(SilhouetteConfig::row_clipped_preset().box_fill, BoxFillMode::RowClipped);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SilhouetteConfig::default();
        config.bin_width = 0;
        assert!(matches!(config.validate(), Err(SilhouetteError::InvalidConfig(_))));

        let mut config = SilhouetteConfig::default();
        config.blade_distance_threshold = f64::NAN;
        assert!(matches!(config.validate(), Err(SilhouetteError::InvalidConfig(_))));

        let mut config = SilhouetteConfig::default();
        config.angle_offset_threshold = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_mentions_box_fill() {
        let summary = SilhouetteConfig::row_clipped_preset().summary();
        assert!(summary.contains("RowClipped"));
        assert!(summary.contains("Combined"));
        assert!(summary.contains("bin_width=5"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_round_trip() {
        let config = SilhouetteConfig::row_clipped_preset();
        let text = config.to_toml().unwrap();
        let loaded = SilhouetteConfig::from_toml(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let config = SilhouetteConfig::row_clipped_preset();
        let json = config.to_json().unwrap();
        assert!(json.contains("\"smoothing\": \"combined\""));
        assert_eq!(SilhouetteConfig::from_json(&json).unwrap(), config);

        assert!(SilhouetteConfig::from_json("{\"bin_width\": 0}").is_err());
        assert!(SilhouetteConfig::from_json("not json").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = SilhouetteConfig {
            bin_width: 4,
            smoothing: SmoothingRule::Combined,
            ..SilhouetteConfig::reference_preset()
        };

        let json_path = dir.path().join("silhouette.json");
        config.save_json(&json_path).unwrap();
        assert_eq!(SilhouetteConfig::load_json(&json_path).unwrap(), config);

        let toml_path = dir.path().join("silhouette.toml");
        config.save_toml(&toml_path).unwrap();
        assert_eq!(SilhouetteConfig::load_toml(&toml_path).unwrap(), config);

        assert!(SilhouetteConfig::load_toml(dir.path().join("missing.toml")).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml_uses_defaults() {
        let loaded = SilhouetteConfig::from_toml("bin_width = 4\nbox_fill = \"row_clipped\"\n").unwrap();
        assert_eq!(loaded.bin_width, 4);
        assert_eq!(loaded.box_fill, BoxFillMode::RowClipped);
        assert_eq!(loaded.min_box_width, 10);
        assert_eq!(loaded.smoothing, SmoothingRule::Legacy);
    }
}
