use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which of the two demo scenes to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Real-time shadow map from the directional light.
    #[default]
    Realtime,
    /// Shadow mapping off; a hopping sphere with an alpha-mapped fake shadow.
    Baked,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::Baked => "baked",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "realtime" => Ok(Self::Realtime),
            "baked" => Ok(Self::Baked),
            other => Err(ConfigError::UnknownVariant(other.to_string())),
        }
    }
}

/// Settings read from an optional TOML file and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub variant: Variant,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub baked_shadow_texture: PathBuf,
    pub simple_shadow_texture: PathBuf,
    /// Paint the baked shadow texture onto the ground plane.
    pub baked_plane: bool,
    pub damping_factor: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            title: "Shadow Lab".to_string(),
            width: 1280,
            height: 720,
            baked_shadow_texture: PathBuf::from("static/textures/bakedShadow.jpg"),
            simple_shadow_texture: PathBuf::from("static/textures/simpleShadow.jpg"),
            baked_plane: false,
            damping_factor: 0.05,
        }
    }
}

impl DemoConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Rejects settings no window or controller can honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(ConfigError::Invalid(format!(
                "damping_factor must be within [0, 1], got {}",
                self.damping_factor
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("unknown variant `{0}`, expected `realtime` or `baked`")]
    UnknownVariant(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_uses_defaults() {
        let config = DemoConfig::from_toml("").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.variant, Variant::Realtime);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = DemoConfig::from_toml(
            r#"
variant = "baked"
width = 800
simple_shadow_texture = "assets/shadow.png"
"#,
        )
        .unwrap();
        assert_eq!(config.variant, Variant::Baked);
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 720);
        assert_eq!(
            config.simple_shadow_texture,
            PathBuf::from("assets/shadow.png")
        );
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(DemoConfig::from_toml("variant = \"cartoon\"").is_err());
        assert!(matches!(
            "cartoon".parse::<Variant>(),
            Err(ConfigError::UnknownVariant(name)) if name == "cartoon"
        ));
    }

    #[test]
    fn out_of_range_damping_is_rejected() {
        let err = DemoConfig::from_toml("damping_factor = 2.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "title = \"Hop\"").unwrap();
        let config = DemoConfig::load(file.path()).unwrap();
        assert_eq!(config.title, "Hop");
    }
}
