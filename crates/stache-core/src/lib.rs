pub mod check;
pub mod config;
pub mod error;
pub mod render;
pub mod template;

use std::path::PathBuf;

use log::{debug, info};
use serde_json::{Map, Value};

use crate::config::BuildOptions;
use crate::error::{Result, StacheError};
use crate::render::compose;
use crate::template::registry::PAGES_DIR;
use crate::template::{Registry, TemplateMatcher};

/// A page rendered in memory, waiting to be written.
#[derive(Debug, Clone)]
pub struct PlannedPage {
    pub name: String,
    /// Output path relative to the dist folder.
    pub relative_path: PathBuf,
    /// Layout the page was composed into, if one resolved.
    pub layout: Option<String>,
    pub content: String,
}

/// Everything needed to write a build that has been rendered but not yet written.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub dist: PathBuf,
    pub layouts: usize,
    pub partials: usize,
    pub pages: Vec<PlannedPage>,
    pub warnings: Vec<String>,
}

/// Outcome of a completed build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub layouts: usize,
    pub partials: usize,
    pub pages: usize,
    pub files_written: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Plan a build: discover templates and render every page in memory.
///
/// Nothing is written to disk. Fails with [`StacheError::NoPages`] when the
/// pages folder holds no matching template.
pub fn plan_build(globals: &Map<String, Value>, options: &BuildOptions) -> Result<BuildPlan> {
    options.validate()?;
    let matcher = TemplateMatcher::new(options.types.as_slice())?;

    let registry = Registry::discover(&options.src, &matcher)?;

    if registry.pages.is_empty() {
        return Err(StacheError::NoPages {
            path: options.src.join(PAGES_DIR),
        });
    }

    let warnings = registry.warnings();

    let mut pages = Vec::with_capacity(registry.pages.len());
    for page in &registry.pages {
        let content = compose(page, &registry.layouts, &registry.partials, globals)?;
        let layout = render::resolve_layout(page, &registry.layouts).map(|l| l.name.clone());
        debug!(
            "rendered page '{}' ({})",
            page.name,
            layout.as_deref().unwrap_or("no layout")
        );
        pages.push(PlannedPage {
            name: page.name.clone(),
            relative_path: page.output_path(),
            layout,
            content,
        });
    }

    Ok(BuildPlan {
        dist: options.dist.clone(),
        layouts: registry.layouts.len(),
        partials: registry.partials.len(),
        pages,
        warnings,
    })
}

/// Write a planned build into its dist folder, creating directories as needed.
///
/// Files written before a failure stay on disk.
pub fn execute_build(plan: BuildPlan) -> Result<BuildReport> {
    let mut files_written = Vec::with_capacity(plan.pages.len());

    for page in &plan.pages {
        let dest_path = plan.dist.join(&page.relative_path);

        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StacheError::Io {
                context: format!("creating directory {}", parent.display()),
                source: e,
            })?;
        }

        std::fs::write(&dest_path, &page.content).map_err(|e| StacheError::Io {
            context: format!("writing {}", dest_path.display()),
            source: e,
        })?;
        debug!("wrote {}", dest_path.display());

        files_written.push(dest_path);
    }

    info!(
        "{} layouts, {} partials, {} pages",
        plan.layouts,
        plan.partials,
        plan.pages.len()
    );

    Ok(BuildReport {
        layouts: plan.layouts,
        partials: plan.partials,
        pages: plan.pages.len(),
        files_written,
        warnings: plan.warnings,
    })
}

/// Build a site: plan then write.
pub fn build(globals: &Map<String, Value>, options: &BuildOptions) -> Result<BuildReport> {
    let plan = plan_build(globals, options)?;
    execute_build(plan)
}
