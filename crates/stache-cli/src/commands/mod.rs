pub mod build;
pub mod check;

use std::path::Path;

use miette::{miette, Result};
use serde_json::Value;

use stache::config::{load_config, load_config_or_default, ResolvedTarget, SiteConfig};

use crate::cli::SourceArgs;

/// Load the config named on the command line, or `./stache.toml` if present.
pub fn load_site_config(source: &SourceArgs) -> Result<SiteConfig> {
    let config = match &source.config {
        Some(path) => load_config(path)?,
        None => load_config_or_default(Path::new("."))?,
    };
    Ok(config)
}

/// Resolve the requested targets and apply command-line overrides on top.
///
/// With no names given, every configured target is used, or the top-level
/// settings when the config declares no targets.
pub fn resolve_targets(
    config: &SiteConfig,
    names: &[String],
    source: &SourceArgs,
    globals: &[(String, Value)],
) -> Result<Vec<ResolvedTarget>> {
    let names: Vec<Option<&str>> = if !names.is_empty() {
        names.iter().map(|n| Some(n.as_str())).collect()
    } else if config.targets.is_empty() {
        vec![None]
    } else {
        config.targets.keys().map(|n| Some(n.as_str())).collect()
    };

    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let mut target = config.resolve(name)?;
        if let Some(src) = &source.src {
            target.options.src = src.clone();
        }
        if !source.types.is_empty() {
            target.options.types = source.types.clone();
        }
        for (key, value) in globals {
            target.globals.insert(key.clone(), value.clone());
        }
        resolved.push(target);
    }
    Ok(resolved)
}

/// Parse `key=value`. The value is read as JSON when it parses, else kept as a string.
pub fn parse_global(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| miette!("invalid global '{pair}', expected KEY=VALUE"))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

pub fn target_label(target: &ResolvedTarget) -> &str {
    target.name.as_deref().unwrap_or("default")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn config(toml_str: &str) -> SiteConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn parse_global_reads_json_or_string() {
        assert_eq!(parse_global("n=3").unwrap(), ("n".to_string(), json!(3)));
        assert_eq!(
            parse_global("title=Hello world").unwrap(),
            ("title".to_string(), json!("Hello world"))
        );
        assert_eq!(
            parse_global("tags=[\"a\"]").unwrap(),
            ("tags".to_string(), json!(["a"]))
        );
        assert_eq!(parse_global("empty=").unwrap(), ("empty".to_string(), json!("")));
    }

    #[test]
    fn parse_global_rejects_missing_key() {
        assert!(parse_global("novalue").is_err());
        assert!(parse_global("=x").is_err());
    }

    #[test]
    fn no_targets_resolves_top_level() {
        let resolved =
            resolve_targets(&SiteConfig::default(), &[], &SourceArgs::default(), &[]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(target_label(&resolved[0]), "default");
    }

    #[test]
    fn all_targets_when_none_named() {
        let config = config("[targets.a]\n[targets.b]\n");
        let resolved = resolve_targets(&config, &[], &SourceArgs::default(), &[]).unwrap();
        let labels: Vec<_> = resolved.iter().map(target_label).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn command_line_overrides_config() {
        let config = config("[globals]\ntitle = \"cfg\"\n[options]\nsrc = \"cfg-src\"\n");
        let source = SourceArgs {
            src: Some(PathBuf::from("cli-src")),
            types: vec!["hbs".into()],
            ..SourceArgs::default()
        };
        let globals = vec![("title".to_string(), json!("cli"))];

        let resolved = resolve_targets(&config, &[], &source, &globals).unwrap();

        assert_eq!(resolved[0].options.src, PathBuf::from("cli-src"));
        assert_eq!(resolved[0].options.types, vec!["hbs"]);
        assert_eq!(resolved[0].globals["title"], json!("cli"));
    }

    #[test]
    fn unknown_target_name_errors() {
        let names = vec!["missing".to_string()];
        assert!(resolve_targets(&SiteConfig::default(), &names, &SourceArgs::default(), &[]).is_err());
    }
}
