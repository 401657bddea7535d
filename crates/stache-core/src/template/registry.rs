use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info, warn};

use super::walker::{discover, TemplateMatcher};
use super::Template;
use crate::error::Result;
use crate::render::engine::CompiledBody;

pub const LAYOUTS_DIR: &str = "layouts";
pub const PARTIALS_DIR: &str = "partials";
pub const PAGES_DIR: &str = "pages";

/// Templates of one kind, in discovery order, unique by name.
///
/// Adding a template whose name is already present replaces the earlier one
/// in place and records a warning.
#[derive(Debug, Clone, Default)]
pub struct TemplateCollection {
    templates: Vec<Template>,
    pub warnings: Vec<String>,
}

impl TemplateCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover and compile every matching template under `folder`.
    ///
    /// A missing folder yields an empty collection.
    pub fn populate(folder: &Path, matcher: &TemplateMatcher) -> Result<Self> {
        let mut collection = Self::new();
        for file in discover(folder, matcher) {
            collection.insert(Template::load(file?)?);
        }
        debug!(
            "{} templates loaded from {}",
            collection.len(),
            folder.display()
        );
        Ok(collection)
    }

    pub fn insert(&mut self, template: Template) {
        match self.templates.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => {
                let warning = format!(
                    "duplicate template name '{}': {} replaces {}",
                    template.name,
                    template.source_path.display(),
                    existing.source_path.display()
                );
                warn!("{warning}");
                self.warnings.push(warning);
                *existing = template;
            }
            None => self.templates.push(template),
        }
    }

    /// Find a template by exact name. An empty name never matches.
    pub fn lookup(&self, name: &str) -> Option<&Template> {
        if name.is_empty() {
            return None;
        }
        self.templates.iter().find(|t| t.name == name)
    }

    /// Project the collection to the name → body map handed to the renderer.
    pub fn as_named_body_map(&self) -> BTreeMap<String, CompiledBody> {
        self.templates
            .iter()
            .map(|t| (t.name.clone(), t.body.clone()))
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<'a> IntoIterator for &'a TemplateCollection {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The three collections discovered for one build.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub layouts: TemplateCollection,
    pub partials: TemplateCollection,
    pub pages: TemplateCollection,
}

impl Registry {
    /// Populate layouts, partials and pages from `{src}/layouts`,
    /// `{src}/partials` and `{src}/pages`.
    pub fn discover(src: &Path, matcher: &TemplateMatcher) -> Result<Self> {
        let layouts = TemplateCollection::populate(&src.join(LAYOUTS_DIR), matcher)?;
        info!("{} layouts", layouts.len());

        let partials = TemplateCollection::populate(&src.join(PARTIALS_DIR), matcher)?;
        info!("{} partials", partials.len());

        let pages = TemplateCollection::populate(&src.join(PAGES_DIR), matcher)?;
        info!("{} pages", pages.len());

        Ok(Self {
            layouts,
            partials,
            pages,
        })
    }

    /// Warnings recorded by all three collections.
    pub fn warnings(&self) -> Vec<String> {
        self.layouts
            .warnings
            .iter()
            .chain(&self.partials.warnings)
            .chain(&self.pages.warnings)
            .cloned()
            .collect()
    }
}
