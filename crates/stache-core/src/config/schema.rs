use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StacheError};
use crate::template::is_plain_extension;

pub const DEFAULT_SRC: &str = "src";
pub const DEFAULT_DIST: &str = "dist";
pub const DEFAULT_TYPE: &str = "mustache";

/// Root config structure deserialized from stache.toml.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Render variables shared by every target.
    #[serde(default)]
    pub globals: Map<String, Value>,

    #[serde(default)]
    pub options: OptionsConfig,

    /// Named targets, each overriding the shared globals and options.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Options as written in the config file; unset fields fall through to the
/// next layer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OptionsConfig {
    pub src: Option<PathBuf>,
    pub dist: Option<PathBuf>,
    #[serde(rename = "type")]
    pub template_type: Option<TemplateTypes>,
}

/// `type = "mustache"` or `type = ["mustache", "hbs"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TemplateTypes {
    One(String),
    Many(Vec<String>),
}

impl TemplateTypes {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            TemplateTypes::One(ext) => vec![ext.clone()],
            TemplateTypes::Many(exts) => exts.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub globals: Map<String, Value>,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Fully resolved options for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub src: PathBuf,
    pub dist: PathBuf,
    /// Template file extensions, without the leading dot.
    pub types: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            src: PathBuf::from(DEFAULT_SRC),
            dist: PathBuf::from(DEFAULT_DIST),
            types: vec![DEFAULT_TYPE.to_string()],
        }
    }
}

impl BuildOptions {
    /// Apply the fields set in `layer` on top of these options.
    pub fn overlay(mut self, layer: &OptionsConfig) -> Self {
        if let Some(src) = &layer.src {
            self.src = src.clone();
        }
        if let Some(dist) = &layer.dist {
            self.dist = dist.clone();
        }
        if let Some(types) = &layer.template_type {
            self.types = types.to_vec();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.src.as_os_str().is_empty() {
            return Err(StacheError::ConfigInvalid {
                reason: "'src' must not be empty".into(),
            });
        }
        if self.dist.as_os_str().is_empty() {
            return Err(StacheError::ConfigInvalid {
                reason: "'dist' must not be empty".into(),
            });
        }
        if self.types.is_empty() {
            return Err(StacheError::ConfigInvalid {
                reason: "'type' must name at least one template extension".into(),
            });
        }
        for ext in &self.types {
            if !is_plain_extension(ext) {
                return Err(StacheError::ConfigInvalid {
                    reason: format!(
                        "invalid template extension '{ext}' (write it without the leading dot)"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Globals and options for one named build.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub name: Option<String>,
    pub globals: Map<String, Value>,
    pub options: BuildOptions,
}

impl SiteConfig {
    /// Names of all configured targets, in sorted order.
    pub fn target_names(&self) -> Vec<String> {
        self.targets.keys().cloned().collect()
    }

    /// Resolve globals and options for `target`, or the top-level settings
    /// when `target` is `None`.
    pub fn resolve(&self, target: Option<&str>) -> Result<ResolvedTarget> {
        let mut globals = self.globals.clone();
        let mut options = BuildOptions::default().overlay(&self.options);

        if let Some(name) = target {
            let target_config =
                self.targets
                    .get(name)
                    .ok_or_else(|| StacheError::UnknownTarget {
                        name: name.to_string(),
                    })?;
            for (key, value) in &target_config.globals {
                globals.insert(key.clone(), value.clone());
            }
            options = options.overlay(&target_config.options);
        }

        Ok(ResolvedTarget {
            name: target.map(str::to_string),
            globals,
            options,
        })
    }

    /// Validate every target's resolved options.
    pub fn validate(&self) -> Result<()> {
        self.resolve(None)?.options.validate()?;
        for name in self.targets.keys() {
            self.resolve(Some(name.as_str()))?.options.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_uses_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();
        let resolved = config.resolve(None).unwrap();
        assert_eq!(resolved.options, BuildOptions::default());
        assert!(resolved.globals.is_empty());
    }

    #[test]
    fn type_accepts_string_or_list() {
        let one: SiteConfig = toml::from_str("[options]\ntype = \"hbs\"").unwrap();
        assert_eq!(one.resolve(None).unwrap().options.types, vec!["hbs"]);

        let many: SiteConfig = toml::from_str("[options]\ntype = [\"mustache\", \"hbs\"]").unwrap();
        assert_eq!(
            many.resolve(None).unwrap().options.types,
            vec!["mustache", "hbs"]
        );
    }

    #[test]
    fn target_overrides_shared_settings() {
        let toml_str = r#"
[globals]
site = "Example"
section = "home"

[options]
dist = "public"

[targets.blog]
globals = { section = "blog" }
options = { src = "blog" }
"#;
        let config: SiteConfig = toml::from_str(toml_str).unwrap();
        let blog = config.resolve(Some("blog")).unwrap();

        assert_eq!(blog.name.as_deref(), Some("blog"));
        assert_eq!(blog.globals["site"], json!("Example"));
        assert_eq!(blog.globals["section"], json!("blog"));
        assert_eq!(blog.options.src, PathBuf::from("blog"));
        assert_eq!(blog.options.dist, PathBuf::from("public"));
        assert_eq!(blog.options.types, vec!["mustache"]);
    }

    #[test]
    fn unknown_target_errors() {
        let config = SiteConfig::default();
        assert!(matches!(
            config.resolve(Some("nope")),
            Err(StacheError::UnknownTarget { .. })
        ));
    }

    #[test]
    fn validation_rejects_dotted_extension() {
        let config: SiteConfig = toml::from_str("[options]\ntype = \".mustache\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(StacheError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn validation_rejects_empty_type_list() {
        let config: SiteConfig = toml::from_str("[options]\ntype = []").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_checks_targets() {
        let config: SiteConfig = toml::from_str("[targets.bad]\noptions = { dist = \"\" }").unwrap();
        assert!(config.validate().is_err());
    }
}
