use std::path::Path;

use crate::config::BuildOptions;
use crate::error::Result;
use crate::render::{resolve_layout, CONTENT_PARTIAL};
use crate::template::registry::{LAYOUTS_DIR, PAGES_DIR, PARTIALS_DIR};
use crate::template::{discover, Template, TemplateCollection, TemplateMatcher};

/// Result of validating a source tree.
pub struct CheckResult {
    pub layouts: usize,
    pub partials: usize,
    pub pages: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Discover and compile every template without rendering, collecting every
/// problem instead of stopping at the first.
pub fn check_site(options: &BuildOptions) -> Result<CheckResult> {
    options.validate()?;
    let matcher = TemplateMatcher::new(options.types.as_slice())?;

    let mut errors = Vec::new();
    let layouts = check_folder(&options.src.join(LAYOUTS_DIR), &matcher, &mut errors);
    let partials = check_folder(&options.src.join(PARTIALS_DIR), &matcher, &mut errors);
    let pages_path = options.src.join(PAGES_DIR);
    let pages = check_folder(&pages_path, &matcher, &mut errors);

    let mut warnings: Vec<String> = layouts
        .warnings
        .iter()
        .chain(&partials.warnings)
        .chain(&pages.warnings)
        .cloned()
        .collect();

    if pages.is_empty() {
        errors.push(format!("No page found in folder: {}", pages_path.display()));
    }

    if partials.lookup(CONTENT_PARTIAL).is_some() && !layouts.is_empty() {
        warnings.push(format!(
            "partial '{CONTENT_PARTIAL}' is shadowed by the page body inside layouts"
        ));
    }

    for layout in &layouts {
        if let Some(nested) = layout.layout() {
            warnings.push(format!(
                "layout '{}' declares layout '{nested}'; layouts are not nested",
                layout.name
            ));
        }
    }

    for page in &pages {
        if let Some(declared) = page.layout() {
            if resolve_layout(page, &layouts).is_none() {
                warnings.push(format!(
                    "page '{}' declares unknown layout '{declared}'; it will render without one",
                    page.name
                ));
            }
        }
    }

    // Layouts see the page body as `content` even without such a partial.
    for (kind, collection) in [("layout", &layouts), ("partial", &partials), ("page", &pages)] {
        for template in collection {
            for reference in template.body.partial_references() {
                let injected = kind == "layout" && reference == CONTENT_PARTIAL;
                if !injected && partials.lookup(reference).is_none() {
                    warnings.push(format!(
                        "{kind} '{}' references missing partial '{reference}'; it renders empty",
                        template.name
                    ));
                }
            }
        }
    }

    Ok(CheckResult {
        layouts: layouts.len(),
        partials: partials.len(),
        pages: pages.len(),
        warnings,
        errors,
    })
}

fn check_folder(
    folder: &Path,
    matcher: &TemplateMatcher,
    errors: &mut Vec<String>,
) -> TemplateCollection {
    let mut collection = TemplateCollection::new();
    for file in discover(folder, matcher) {
        match file.and_then(Template::load) {
            Ok(template) => collection.insert(template),
            Err(e) => errors.push(describe(&e)),
        }
    }
    collection
}

/// Flatten an error and its sources into one line.
fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
