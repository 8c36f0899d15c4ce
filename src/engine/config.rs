//! Engine configuration, loaded from `ludo.toml` for the room directory.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RoomConfig {
    /// Depth of each room's broadcast channel.
    pub event_capacity: usize,
    /// Fixed seed for every new room's dice. Entropy when absent.
    pub dice_seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            dice_seed: None,
        }
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub room: RoomConfig,
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<EngineConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try well-known paths, returning the built-in defaults if none loads.
pub fn load_default_config() -> EngineConfig {
    let candidates = ["ludo.toml", "../ludo.toml", "/etc/ludo/ludo.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), event_capacity = config.room.event_capacity, "loaded engine config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load engine config");
                }
            }
        }
    }
    tracing::info!("no ludo.toml found, using built-in defaults");
    EngineConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.room.event_capacity, 64);
        assert_eq!(config.room.dice_seed, None);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[room]
event_capacity = 16
dice_seed = 7
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.room.event_capacity, 16);
        assert_eq!(config.room.dice_seed, Some(7));
    }

    #[test]
    fn test_partial_room_section_keeps_defaults() {
        let config: EngineConfig = toml::from_str("[room]\ndice_seed = 3").unwrap();
        assert_eq!(config.room.dice_seed, Some(3));
        assert_eq!(config.room.event_capacity, RoomConfig::default().event_capacity);
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[room]\nevent_capacity = \"lots\"").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.starts_with("Failed to parse"));

        let missing = load_config(Path::new("/definitely/not/here/ludo.toml")).unwrap_err();
        assert!(missing.starts_with("Failed to read"));
    }
}
