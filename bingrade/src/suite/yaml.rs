//! YAML documents as JSON values.
//!
//! Mapping from YAML:
//!   - YAML null          -> JSON null
//!   - YAML bool          -> JSON bool
//!   - YAML number        -> JSON number (.nan and .inf become null)
//!   - YAML string        -> JSON string
//!   - YAML sequence      -> JSON array
//!   - YAML mapping       -> JSON object; scalar keys are written as text
//!   - tagged values      -> the inner value, tag dropped

use serde_json::{Map, Number, Value as Json};

/// Decode YAML text into a JSON value.
pub fn decode(input: &str) -> Result<Json, String> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(input).map_err(|e| format!("YAML parse error: {}", e))?;
    yaml_to_json(&yaml)
}

fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Json, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Json::Null),
        serde_yaml::Value::Bool(b) => Ok(Json::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Json::Number(Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Json::Number(Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                Ok(Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null))
            } else {
                Err(format!("Unsupported YAML number: {:?}", n))
            }
        }
        serde_yaml::Value::String(s) => Ok(Json::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Json>, String> = seq.iter().map(yaml_to_json).collect();
            Ok(Json::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut obj = Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    _ => return Err(format!("Unsupported YAML mapping key type: {:?}", k)),
                };
                obj.insert(key, yaml_to_json(v)?);
            }
            Ok(Json::Object(obj))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequence_of_mappings() {
        let doc = decode(
            "- input: 'nums = [2,7,11,15], target = 9'\n  output: [0, 1]\n- input: n = 3\n  output: '6'\n  hidden: true\n",
        )
        .unwrap();
        assert_eq!(
            doc,
            json!([
                {"input": "nums = [2,7,11,15], target = 9", "output": [0, 1]},
                {"input": "n = 3", "output": "6", "hidden": true}
            ])
        );
    }

    #[test]
    fn test_non_string_keys() {
        assert_eq!(decode("1: one\ntrue: yes").unwrap(), json!({"1": "one", "true": "yes"}));
    }
}
