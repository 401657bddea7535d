use serde_json::{Map, Value};

use super::context::build_context;
use super::engine::render_body;
use crate::error::Result;
use crate::template::{Template, TemplateCollection};

/// Partial name the page body is bound to when rendered inside a layout.
pub const CONTENT_PARTIAL: &str = "content";

/// Resolve the layout a page declares, if it declares one that exists.
pub fn resolve_layout<'a>(page: &Template, layouts: &'a TemplateCollection) -> Option<&'a Template> {
    layouts.lookup(page.layout()?)
}

/// Render a page, wrapping it in its declared layout when that layout exists.
///
/// With a layout, the layout body is rendered with the partials plus a
/// `content` partial bound to the page body (shadowing any user partial of
/// that name), using globals merged with the layout's own data. Otherwise the
/// page body is rendered on its own with globals merged with the page data.
pub fn compose(
    page: &Template,
    layouts: &TemplateCollection,
    partials: &TemplateCollection,
    globals: &Map<String, Value>,
) -> Result<String> {
    let mut partial_map = partials.as_named_body_map();

    let rendered = match resolve_layout(page, layouts) {
        Some(layout) => {
            partial_map.insert(CONTENT_PARTIAL.to_string(), page.body.clone());
            let context = build_context(globals, layout.data.as_ref());
            render_body(&layout.name, &layout.body, &context, &partial_map)?
        }
        None => {
            let context = build_context(globals, page.data.as_ref());
            render_body(&page.name, &page.body, &context, &partial_map)?
        }
    };

    Ok(rendered)
}
