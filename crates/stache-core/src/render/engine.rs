use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{Result, StacheError};

/// Extension the engine appends when it looks up `{{> name}}` on disk.
const PARTIAL_EXTENSION: &str = "mustache";

/// Partial name → compiled body, as resolved by `{{> name}}`.
pub type PartialMap = BTreeMap<String, CompiledBody>;

struct Compiled {
    source: String,
    template: mustache::Template,
}

/// A template source parsed once and reused for every render.
///
/// The parsed form has every partial reference resolved to empty text. Renders
/// that supply partials recompile the source against them.
#[derive(Clone)]
pub struct CompiledBody(Arc<Compiled>);

impl CompiledBody {
    pub fn compile(source: &str) -> std::result::Result<Self, mustache::Error> {
        // An empty lookup folder keeps stray files in the working directory
        // from being picked up as partials.
        let empty = tempfile::tempdir()?;
        let template = engine_context(empty.path()).compile(source.chars())?;
        Ok(Self(Arc::new(Compiled {
            source: source.to_string(),
            template,
        })))
    }

    pub fn source(&self) -> &str {
        &self.0.source
    }

    /// Names referenced with `{{> name}}`, in order of first appearance.
    pub fn partial_references(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut rest = self.0.source.as_str();
        while let Some(start) = rest.find("{{>") {
            let tag = &rest[start + 3..];
            let Some(end) = tag.find("}}") else { break };
            let name = tag[..end].trim();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
            rest = &tag[end + 2..];
        }
        names
    }
}

impl fmt::Debug for CompiledBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBody")
            .field("len", &self.0.source.len())
            .finish()
    }
}

fn engine_context(dir: &Path) -> mustache::Context {
    let mut ctx = mustache::Context::new(dir.to_path_buf());
    ctx.template_extension = PARTIAL_EXTENSION.to_string();
    ctx
}

/// Write every partial into `dir` where the engine's `{{> name}}` lookup finds it.
fn stage_partials(dir: &Path, partials: &PartialMap) -> Result<()> {
    for (name, partial) in partials {
        let mut path = dir.join(name);
        path.set_extension(PARTIAL_EXTENSION);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StacheError::Io {
                context: format!("staging partial '{name}'"),
                source: e,
            })?;
        }
        std::fs::write(&path, partial.source()).map_err(|e| StacheError::Io {
            context: format!("staging partial '{name}'"),
            source: e,
        })?;
    }
    Ok(())
}

/// Render `body` with `context`, resolving partial references against `partials`.
///
/// `name` only labels errors. Each call stages its own partial folder so no
/// partial leaks from one render into the next. A reference to a partial that
/// is not in `partials` renders as empty text.
pub fn render_body(
    name: &str,
    body: &CompiledBody,
    context: &Map<String, Value>,
    partials: &PartialMap,
) -> Result<String> {
    let render_err = |e: mustache::Error| StacheError::Render {
        name: name.to_string(),
        source: e,
    };

    let mut out = Vec::new();
    if partials.is_empty() || body.partial_references().is_empty() {
        body.0.template.render(&mut out, context).map_err(render_err)?;
    } else {
        let stage = tempfile::tempdir().map_err(|e| StacheError::Io {
            context: "creating partial staging folder".to_string(),
            source: e,
        })?;
        stage_partials(stage.path(), partials)?;

        let template = engine_context(stage.path())
            .compile(body.source().chars())
            .map_err(render_err)?;
        template.render(&mut out, context).map_err(render_err)?;
    }

    String::from_utf8(out).map_err(|e| StacheError::Io {
        context: format!("rendering '{name}'"),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(source: &str) -> CompiledBody {
        CompiledBody::compile(source).unwrap()
    }

    fn context(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn render(source: &str, data: Value) -> String {
        render_body("test", &compile(source), &context(data), &PartialMap::new()).unwrap()
    }

    #[test]
    fn renders_sections_over_lists() {
        let out = render(
            "<h1>{{title}}</h1>{{#items}}<li>{{name}}</li>{{/items}}",
            json!({"title": "Hi", "items": [{"name": "a"}, {"name": "b"}]}),
        );
        assert_eq!(out, "<h1>Hi</h1><li>a</li><li>b</li>");
    }

    #[test]
    fn implicit_iterator_renders_list_items() {
        let out = render(
            "{{#tags}}<li>{{.}}</li>{{/tags}}",
            json!({"tags": ["rust", "web"]}),
        );
        assert_eq!(out, "<li>rust</li><li>web</li>");
    }

    #[test]
    fn inverted_section_renders_when_empty_or_missing() {
        let source = "{{^items}}none{{/items}}";
        assert_eq!(render(source, json!({"items": []})), "none");
        assert_eq!(render(source, json!({})), "none");
        assert_eq!(render(source, json!({"items": ["x"]})), "");
    }

    #[test]
    fn truthy_section_switches_on_booleans() {
        let source = "{{#draft}}DRAFT {{/draft}}{{title}}";
        assert_eq!(render(source, json!({"draft": true, "title": "T"})), "DRAFT T");
        assert_eq!(render(source, json!({"draft": false, "title": "T"})), "T");
    }

    #[test]
    fn escapes_html_unless_triple_braced() {
        assert_eq!(render("{{html}}|{{{html}}}", json!({"html": "<b>"})), "&lt;b&gt;|<b>");
    }

    #[test]
    fn undefined_variables_render_empty() {
        assert_eq!(render("[{{missing}}]", json!({})), "[]");
    }

    #[test]
    fn resolves_partials_by_name() {
        let mut partials = PartialMap::new();
        partials.insert("nav".into(), compile("<nav>{{site}}</nav>"));

        let body = compile("{{> nav}}<main/>");
        let out = render_body(
            "page",
            &body,
            &context(json!({"site": "Example"})),
            &partials,
        )
        .unwrap();
        assert_eq!(out, "<nav>Example</nav><main/>");
    }

    #[test]
    fn resolves_nested_partial_names() {
        let mut partials = PartialMap::new();
        partials.insert("nav/main".into(), compile("<nav/>"));
        partials.insert("footer".into(), compile("{{> nav/main}}<footer/>"));

        let body = compile("{{> footer}}");
        let out = render_body("page", &body, &Map::new(), &partials).unwrap();
        assert_eq!(out, "<nav/><footer/>");
    }

    #[test]
    fn missing_partial_renders_empty() {
        let body = compile("a{{> nope}}b");
        let out = render_body("page", &body, &Map::new(), &PartialMap::new()).unwrap();
        assert_eq!(out, "ab");

        let mut partials = PartialMap::new();
        partials.insert("other".into(), compile("x"));
        let out = render_body("page", &body, &Map::new(), &partials).unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn lists_partial_references_once() {
        let body = compile("{{> header}}{{>content}}{{> header }}");
        assert_eq!(body.partial_references(), vec!["header", "content"]);
    }

    #[test]
    fn unclosed_section_fails_to_compile() {
        assert!(CompiledBody::compile("{{#open}} never closed").is_err());
    }
}
