//! Browser bindings.
//!
//! The page fetches the CSV tables itself and hands their text in; every
//! export here is synchronous and stateless.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use choro_core::catalog::MetricKey;
use choro_core::dataset::parse_table;
use choro_core::filter::{build_predicates, FilterKind, FilterState, Predicate};
use choro_core::gradient::colour_for_key;
use choro_core::resolve::{highlight_matches, resolve_values};

/// One enabled filter as sent by the control panel.
#[derive(Debug, Deserialize)]
struct FilterInput {
    kind: FilterKind,
    /// Raw input text; ignored for boolean filters.
    #[serde(default)]
    threshold: Option<String>,
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_key(key: &str) -> Result<MetricKey, String> {
    key.parse::<MetricKey>().map_err(|e| e.to_string())
}

fn predicates_from_json(filters_json: &str) -> Result<Vec<Predicate>, String> {
    if filters_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let inputs: Vec<FilterInput> =
        serde_json::from_str(filters_json).map_err(|e| format!("Invalid filters: {e}"))?;
    let mut state = FilterState::new();
    for input in &inputs {
        state.set_enabled(input.kind, true);
        if let Some(text) = &input.threshold {
            state.set_threshold_text(input.kind, text);
        }
    }
    Ok(build_predicates(&state))
}

/// Maps become plain objects so the page can index them by region name.
fn object_serializer() -> serde_wasm_bindgen::Serializer {
    serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true)
}

/// CSS colour for `value` on the gradient of `metric_key`.
#[wasm_bindgen(js_name = colourFor)]
pub fn colour_for(value: f64, metric_key: &str) -> Result<String, JsValue> {
    let key = parse_key(metric_key).map_err(js_err)?;
    Ok(colour_for_key(value, key).to_css())
}

/// Plain `{ regionName: value }` object for one metric column of `csv_text`.
#[wasm_bindgen(js_name = resolveCsv)]
pub fn resolve_csv(csv_text: &str, metric_key: &str, filters_json: &str) -> Result<JsValue, JsValue> {
    let key = parse_key(metric_key).map_err(js_err)?;
    let predicates = predicates_from_json(filters_json).map_err(js_err)?;
    let values = resolve_values(&parse_table(csv_text), key.metric().column, &predicates);
    values.serialize(&object_serializer()).map_err(js_err)
}

/// Array of region names passing every filter. Empty when no filter applies.
#[wasm_bindgen(js_name = highlightCsv)]
pub fn highlight_csv(csv_text: &str, filters_json: &str) -> Result<JsValue, JsValue> {
    let predicates = predicates_from_json(filters_json).map_err(js_err)?;
    let set = highlight_matches(&parse_table(csv_text), &predicates);
    serde_wasm_bindgen::to_value(&set).map_err(js_err)
}

/// The metric catalog as a JSON string.
#[wasm_bindgen(js_name = catalogJson)]
pub fn catalog_json() -> String {
    let entries: Vec<serde_json::Value> = MetricKey::ALL
        .into_iter()
        .map(|key| {
            let metric = key.metric();
            serde_json::json!({
                "key": key,
                "name": metric.name,
                "column": metric.column,
                "min": metric.min,
                "max": metric.max,
                "gradient": key.gradient(),
                "reversed": key.is_reversed(),
                "source": key.table_source().path(),
            })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_json_follows_panel_rules() {
        let predicates = predicates_from_json(
            r#"[{"kind":"potable-water"},{"kind":"crime","threshold":"50"},{"kind":"hdi","threshold":"0"}]"#,
        )
        .unwrap();
        assert_eq!(
            predicates,
            vec![Predicate::IsTrue { column: 1 }, Predicate::Below { column: 6, threshold: 50.0 }]
        );
        assert!(predicates_from_json("").unwrap().is_empty());
        assert!(predicates_from_json("{").is_err());
    }

    #[test]
    fn colour_and_key_errors() {
        assert_eq!(colour_for(100.0, "crime").unwrap(), "rgb(255,0,0)");
        assert!(parse_key("altitude").is_err());
    }

    #[test]
    fn catalog_is_valid_json() {
        let parsed: serde_json::Value = serde_json::from_str(&catalog_json()).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), MetricKey::ALL.len());
        assert_eq!(entries[0]["key"], "potable-water");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::wasm_bindgen_test;

    use super::*;

    #[wasm_bindgen_test]
    fn resolved_values_index_by_region_name() {
        let values = resolve_csv("France,true,8,2,70\nChad,false,3,4,30\n", "cost-of-living", "").unwrap();
        assert!(values.dyn_ref::<js_sys::Map>().is_none());
        let france = js_sys::Reflect::get(&values, &JsValue::from_str("France")).unwrap();
        assert_eq!(france.as_f64(), Some(70.0));
        let atlantis = js_sys::Reflect::get(&values, &JsValue::from_str("Atlantis")).unwrap();
        assert!(atlantis.is_undefined());
    }

    #[wasm_bindgen_test]
    fn highlights_are_an_array() {
        let filters = r#"[{"kind":"potable-water"}]"#;
        let set = highlight_csv("France,true\nChad,false\n", filters).unwrap();
        let names = set.dyn_into::<js_sys::Array>().unwrap();
        assert_eq!(names.length(), 1);
        assert_eq!(names.get(0).as_string().as_deref(), Some("France"));
    }
}
