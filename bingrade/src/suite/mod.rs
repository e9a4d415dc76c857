//! Testcase suite files.
//!
//! A suite is a list of testcases, either bare or under a `testcases` key,
//! written in JSON, YAML or TOML. Every format is first decoded to a JSON
//! value. An `input` or `output` written as a structured value instead of a
//! string (natural in YAML and TOML) is turned back into JSON text, which
//! the literal parsers accept.

pub mod toml;
pub mod yaml;

use anyhow::{anyhow, bail, Context, Result};
use libgrade::Testcase;
use serde_json::Value as Json;
use std::fs;
use std::path::Path;

/// Suite file format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("toml") => Ok(Format::Toml),
            _ => bail!(
                "Cannot infer suite format from {} (expected .json, .yaml, .yml or .toml)",
                path.display()
            ),
        }
    }
}

/// Read a suite file.
pub fn load(path: &Path) -> Result<Vec<Testcase>> {
    let format = Format::from_path(path)?;
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&text, format).with_context(|| format!("Invalid suite {}", path.display()))
}

/// Parse suite text in the given format.
pub fn parse(text: &str, format: Format) -> Result<Vec<Testcase>> {
    let doc = match format {
        Format::Json => serde_json::from_str(text).context("JSON parse error")?,
        Format::Yaml => yaml::decode(text).map_err(|e| anyhow!(e))?,
        Format::Toml => toml::decode(text).map_err(|e| anyhow!(e))?,
    };
    from_document(doc)
}

fn from_document(doc: Json) -> Result<Vec<Testcase>> {
    let list = match doc {
        Json::Array(items) => items,
        Json::Object(mut obj) => match obj.remove("testcases") {
            Some(Json::Array(items)) => items,
            Some(_) => bail!("\"testcases\" must be a list"),
            None => bail!("Expected a list of testcases or a \"testcases\" key"),
        },
        _ => bail!("Expected a list of testcases or a \"testcases\" key"),
    };

    list.into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(stringify_fields(item))
                .with_context(|| format!("Testcase {}", index))
        })
        .collect()
}

fn stringify_fields(mut item: Json) -> Json {
    if let Json::Object(obj) = &mut item {
        for key in ["input", "output"] {
            if let Some(field) = obj.get_mut(key) {
                if !field.is_string() {
                    *field = Json::String(field.to_string());
                }
            }
        }
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_json_list() {
        let suite = parse(
            r#"[{"input": "a = 1", "output": "1"}, {"input": "a = 2", "output": "2", "hidden": true}]"#,
            Format::Json,
        )
        .unwrap();
        assert_eq!(suite.len(), 2);
        assert!(!suite[0].hidden);
        assert!(suite[1].hidden);
    }

    #[test]
    fn test_yaml_structured_output() {
        let suite = parse(
            "testcases:\n  - input: 'nums = [2,7,11,15], target = 9'\n    output: [0, 1]\n",
            Format::Yaml,
        )
        .unwrap();
        assert_eq!(suite[0], Testcase::new("nums = [2,7,11,15], target = 9", "[0,1]"));
    }

    #[test]
    fn test_toml_tables() {
        let suite = parse(
            "[[testcases]]\ninput = \"s = 'abc'\"\noutput = \"'cba'\"\nhidden = true\n",
            Format::Toml,
        )
        .unwrap();
        assert_eq!(suite[0], Testcase::new("s = 'abc'", "'cba'").hidden());
    }

    #[test]
    fn test_missing_output_is_an_error() {
        let err = parse(r#"[{"input": "a = 1"}]"#, Format::Json).unwrap_err();
        assert_eq!(err.to_string(), "Testcase 0");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("s.YML")).unwrap(), Format::Yaml);
        assert!(Format::from_path(Path::new("suite.txt")).is_err());
    }
}
