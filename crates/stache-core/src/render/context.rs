use serde_json::{Map, Value};

use crate::template::RenderData;

/// Build the render context for one template.
///
/// `globals` form the base layer and the template's own data overrides it key
/// for key. The merge is shallow: a nested object in the data replaces the
/// global value wholesale.
pub fn build_context(globals: &Map<String, Value>, data: Option<&RenderData>) -> Map<String, Value> {
    let mut context = globals.clone();
    if let Some(data) = data {
        for (key, value) in &data.vars {
            context.insert(key.clone(), value.clone());
        }
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn data_overrides_globals() {
        let globals = object(json!({"a": 1, "b": 1}));
        let data = RenderData::from_vars(object(json!({"a": 2})));

        let context = build_context(&globals, Some(&data));

        assert_eq!(Value::Object(context), json!({"a": 2, "b": 1}));
    }

    #[test]
    fn absent_data_yields_globals() {
        let globals = object(json!({"title": "X"}));
        assert_eq!(build_context(&globals, None), globals);
    }

    #[test]
    fn nested_values_are_replaced_not_merged() {
        let globals = object(json!({"site": {"name": "Example", "lang": "en"}}));
        let data = RenderData::from_vars(object(json!({"site": {"name": "Other"}})));

        let context = build_context(&globals, Some(&data));

        assert_eq!(context["site"], json!({"name": "Other"}));
    }
}
