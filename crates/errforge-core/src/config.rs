//! Factory configuration.

use serde::{Deserialize, Serialize};

/// Settings applied to a root error type and the global registry built on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Name of the non-instantiable root type.
    #[serde(default = "default_root_name")]
    pub root_name: String,
    /// Separator placed between a message and an appended cause message.
    #[serde(default = "default_glue")]
    pub glue: String,
    /// Names that are bound in the global registry before any registration.
    #[serde(default = "default_reserved_names")]
    pub reserved_names: Vec<String>,
}

fn default_root_name() -> String {
    "CustomError".into()
}

fn default_glue() -> String {
    "<<".into()
}

fn default_reserved_names() -> Vec<String> {
    vec!["Error".into(), "CustomError".into()]
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            root_name: default_root_name(),
            glue: default_glue(),
            reserved_names: default_reserved_names(),
        }
    }
}

impl FactoryConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let cfg = FactoryConfig::from_json("{}").unwrap();
        assert_eq!(cfg, FactoryConfig::default());
        assert_eq!(cfg.glue, "<<");
    }

    #[test]
    fn partial_override() {
        let cfg = FactoryConfig::from_json(r#"{"glue": "caused by", "reserved_names": []}"#).unwrap();
        assert_eq!(cfg.root_name, "CustomError");
        assert_eq!(cfg.glue, "caused by");
        assert!(cfg.reserved_names.is_empty());
    }
}
