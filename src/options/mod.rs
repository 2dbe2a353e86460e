//! Centralized viewer options with TOML preset support.
//!
//! Scene layout, camera, controls, bloom, tone-mapping, and lighting
//! settings are consolidated here. Options serialize to/from TOML so a
//! viewer can be configured from a preset file.

mod bloom;
mod camera;
mod controls;
mod lighting;
mod scene;
mod tone_mapping;

use std::path::Path;

pub use bloom::BloomOptions;
pub use camera::CameraOptions;
pub use controls::ControlOptions;
pub use lighting::LightingOptions;
use schemars::JsonSchema;
pub use scene::SceneOptions;
use serde::{Deserialize, Serialize};
pub use tone_mapping::ToneMappingOptions;

use crate::error::HaloError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[bloom]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Procedural scene layout.
    pub scene: SceneOptions,
    /// Camera projection and initial placement.
    pub camera: CameraOptions,
    /// Orbit and zoom control tuning.
    pub controls: ControlOptions,
    /// Selective bloom parameters.
    pub bloom: BloomOptions,
    /// Output tone mapping.
    pub tone_mapping: ToneMappingOptions,
    /// Scene light and material defaults.
    pub lighting: LightingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, HaloError> {
        let content = std::fs::read_to_string(path).map_err(HaloError::Io)?;
        toml::from_str(&content)
            .map_err(|e| HaloError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), HaloError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HaloError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(HaloError::Io)?;
        }
        std::fs::write(path, content).map_err(HaloError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[bloom]
strength = 2.5

[scene]
satellite_count = 12
seed = 7
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.bloom.strength, 2.5);
        assert_eq!(opts.scene.satellite_count, 12);
        assert_eq!(opts.scene.seed, Some(7));
        // Everything else should be default
        assert_eq!(opts.bloom.radius, 0.5);
        assert_eq!(opts.bloom.threshold, 0.0);
        assert_eq!(opts.tone_mapping.exposure, 1.5);
        assert_eq!(opts.camera.eye, [0.0, 10.0, 18.0]);
        assert_eq!(opts.controls.damping_factor, 0.12);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = std::env::temp_dir()
            .join(format!("halo-options-{}", std::process::id()));
        let path = dir.join("glow.toml");
        let mut opts = Options::default();
        opts.bloom.strength = 1.75;
        opts.scene.seed = Some(42);
        opts.save(&path).unwrap();

        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(Options::list_presets(&dir), vec!["glow".to_owned()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_toml_is_reported() {
        let dir = std::env::temp_dir()
            .join(format!("halo-bad-options-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[bloom]\nstrength = \"loud\"\n").unwrap();

        let err = Options::load(&path).unwrap_err();
        assert!(matches!(err, HaloError::OptionsParse(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        for section in
            ["scene", "camera", "controls", "bloom", "tone_mapping", "lighting"]
        {
            assert!(props.contains_key(section), "missing {section}");
        }

        // Bloom should have exposed fields but not skipped ones
        let bloom = &props["bloom"]["properties"];
        assert!(bloom.get("strength").is_some());
        assert!(bloom.get("radius").is_some());
        assert!(bloom.get("smooth_width").is_none());
    }
}
