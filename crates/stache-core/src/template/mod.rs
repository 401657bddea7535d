pub mod registry;
pub mod walker;

use std::path::{Path, PathBuf};

use log::warn;
use serde_json::{Map, Value};

use crate::error::{Result, StacheError};
use crate::render::engine::CompiledBody;

pub use registry::{Registry, TemplateCollection};
pub use walker::{discover, DiscoveredFile, TemplateMatcher};

/// Output extension used when a page does not override it.
pub const DEFAULT_EXTENSION: &str = "html";

/// True for a bare extension such as `xml`: no leading dot, no path separators.
pub fn is_plain_extension(ext: &str) -> bool {
    !ext.is_empty() && !ext.starts_with('.') && !ext.contains(|c: char| c == '/' || c == '\\')
}

/// Reserved settings read from the `render` key of a template's data file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSettings {
    /// Layout this page is composed into.
    pub layout: Option<String>,
    /// Output file extension override.
    pub extension: Option<String>,
}

impl RenderSettings {
    /// Read settings from a data object. Non-string or empty values count as
    /// absent, as does an extension that could move the output out of its folder.
    pub fn from_vars(vars: &Map<String, Value>) -> Self {
        let render = vars.get("render");
        let field = |key: &str| {
            render
                .and_then(|r| r.get(key))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            layout: field("layout"),
            extension: field("extension").filter(|ext| {
                let plain = is_plain_extension(ext);
                if !plain {
                    warn!("ignoring render extension '{ext}': not a plain file extension");
                }
                plain
            }),
        }
    }
}

/// Data loaded from the `.json` file next to a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderData {
    pub settings: RenderSettings,
    /// Every top-level key of the data file, `render` included.
    pub vars: Map<String, Value>,
}

impl RenderData {
    pub fn from_vars(vars: Map<String, Value>) -> Self {
        Self {
            settings: RenderSettings::from_vars(&vars),
            vars,
        }
    }

    /// Load a data file. Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| StacheError::Io {
            context: format!("reading {}", path.display()),
            source: e,
        })?;

        let value: Value = serde_json::from_str(&content).map_err(|e| StacheError::DataParse {
            path: path.to_path_buf(),
            source: e,
        })?;

        match value {
            Value::Object(vars) => Ok(Some(Self::from_vars(vars))),
            _ => Err(StacheError::DataNotObject {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A compiled layout, partial or page.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub source_path: PathBuf,
    pub body: CompiledBody,
    pub data: Option<RenderData>,
}

impl Template {
    /// Read and compile a discovered file, attaching its sibling data if present.
    pub fn load(file: DiscoveredFile) -> Result<Self> {
        let source = std::fs::read_to_string(&file.path).map_err(|e| StacheError::Io {
            context: format!("reading {}", file.path.display()),
            source: e,
        })?;

        let body = CompiledBody::compile(&source).map_err(|e| StacheError::TemplateCompile {
            path: file.path.clone(),
            source: e,
        })?;

        let data = RenderData::load(&file.data_path)?;

        Ok(Self {
            name: file.name,
            source_path: file.path,
            body,
            data,
        })
    }

    pub fn layout(&self) -> Option<&str> {
        self.data.as_ref()?.settings.layout.as_deref()
    }

    /// Output extension, `html` unless the data file overrides it.
    pub fn extension(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|d| d.settings.extension.as_deref())
            .unwrap_or(DEFAULT_EXTENSION)
    }

    /// Output path relative to the dist folder.
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.name, self.extension()))
    }
}
