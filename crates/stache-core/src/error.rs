#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum StacheError {
    #[error("No page found in folder: {path}")]
    #[diagnostic(help(
        "Add at least one page template to the pages folder, or check the configured `type`"
    ))]
    NoPages { path: PathBuf },

    #[error("Failed to compile template {path}")]
    #[diagnostic(help("Check the Mustache syntax in this template"))]
    TemplateCompile {
        path: PathBuf,
        #[source]
        source: mustache::Error,
    },

    #[error("Failed to parse render data {path}")]
    #[diagnostic(help("Check the JSON syntax in this data file"))]
    DataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Render data in {path} must be a JSON object")]
    #[diagnostic(help("Wrap the values in {{ ... }}; the `render` key holds layout and extension"))]
    DataNotObject { path: PathBuf },

    #[error("Failed to render '{name}'")]
    #[diagnostic(help("Check the values passed to this template and the partials it includes"))]
    Render {
        name: String,
        #[source]
        source: mustache::Error,
    },

    #[error("Config not found at {path}")]
    #[diagnostic(help("Create a stache.toml file or pass --config"))]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse stache.toml")]
    #[diagnostic(help("Check the TOML syntax in your stache.toml file"))]
    ConfigParse {
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {reason}")]
    ConfigInvalid { reason: String },

    #[error("Unknown target '{name}'")]
    #[diagnostic(help("Targets are declared as [targets.<name>] in stache.toml"))]
    UnknownTarget { name: String },

    #[error("Invalid template type matcher")]
    InvalidMatcher {
        #[source]
        source: regex_lite::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StacheError>;
