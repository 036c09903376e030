//! Front-matter parsing

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Ordered front-matter mapping; values pass through unvalidated
pub type Metadata = IndexMap<String, Value>;

/// Language a front-matter block is written in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatterFormat {
    #[default]
    Yaml,
    Json,
    Toml,
}

/// Opening line, closing line and block language
const FENCES: &[(&str, &str, MatterFormat)] = &[
    ("---", "---", MatterFormat::Yaml),
    ("---yaml", "---", MatterFormat::Yaml),
    ("---yml", "---", MatterFormat::Yaml),
    ("---json", "---", MatterFormat::Json),
    (";;;", ";;;", MatterFormat::Json),
    ("+++", "+++", MatterFormat::Toml),
    ("---toml", "---", MatterFormat::Toml),
];

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrontMatter {
    format: MatterFormat,
    data: Metadata,
}

impl FrontMatter {
    pub fn new(format: MatterFormat, data: Metadata) -> Self {
        Self { format, data }
    }

    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        Self::parse_named(content, "<input>")
    }

    /// Like [`FrontMatter::parse`], naming `source_name` in parse errors
    pub fn parse_named<'a>(content: &'a str, source_name: &str) -> Result<(Self, &'a str)> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let (first_line, rest) = split_line(content);
        let Some((close, format)) = opening_fence(first_line.trim_end()) else {
            return Ok((FrontMatter::default(), content));
        };

        let mut block_len = 0;
        let mut remaining = rest;
        while !remaining.is_empty() {
            let (line, next) = split_line(remaining);
            if line.trim_end() == close {
                let data = parse_block(&rest[..block_len], format, source_name)?;
                return Ok((FrontMatter { format, data }, next));
            }
            block_len += remaining.len() - next.len();
            remaining = next;
        }

        // No closing delimiter, treat as no front-matter
        Ok((FrontMatter::default(), content))
    }

    /// Serialize the metadata back in front of `body`
    pub fn stringify(&self, body: &str) -> Result<String> {
        let block = match self.format {
            MatterFormat::Yaml => {
                let yaml = if self.data.is_empty() {
                    String::new()
                } else {
                    serde_yaml::to_string(&self.data)
                        .map_err(|e| Error::parse("front matter", e))?
                };
                format!("---\n{}---\n", yaml)
            }
            MatterFormat::Json => {
                let json = serde_json::to_string_pretty(&self.data)
                    .map_err(|e| Error::parse("front matter", e))?;
                format!("---json\n{}\n---\n", json)
            }
            MatterFormat::Toml => {
                let toml =
                    toml::to_string(&self.data).map_err(|e| Error::parse("front matter", e))?;
                format!("+++\n{}+++\n", toml)
            }
        };
        Ok(block + body)
    }

    pub fn format(&self) -> MatterFormat {
        self.format
    }

    pub fn data(&self) -> &Metadata {
        &self.data
    }

    pub fn into_data(self) -> Metadata {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// A scalar field rendered as display text
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text)
    }
}

/// Display text for a scalar value; `None` for null, arrays and objects
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn opening_fence(line: &str) -> Option<(&'static str, MatterFormat)> {
    FENCES
        .iter()
        .find(|(open, _, _)| *open == line)
        .map(|(_, close, format)| (*close, *format))
}

fn split_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(pos) => (&s[..pos], &s[pos + 1..]),
        None => (s, ""),
    }
}

fn parse_block(block: &str, format: MatterFormat, source_name: &str) -> Result<Metadata> {
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }

    match format {
        MatterFormat::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(block).map_err(|e| Error::parse(source_name, e))?;
            match value {
                serde_yaml::Value::Null => Ok(Metadata::new()),
                serde_yaml::Value::Mapping(map) => Ok(yaml_entries(map)
                    .map_err(|e| Error::parse(source_name, e))?
                    .into_iter()
                    .collect()),
                _ => Err(Error::parse(
                    source_name,
                    "YAML front matter is not a key/value mapping",
                )),
            }
        }
        MatterFormat::Json => {
            let value: Value =
                serde_json::from_str(block).map_err(|e| Error::parse(source_name, e))?;
            match value {
                Value::Null => Ok(Metadata::new()),
                Value::Object(map) => Ok(map.into_iter().collect()),
                _ => Err(Error::parse(
                    source_name,
                    "JSON front matter is not an object",
                )),
            }
        }
        MatterFormat::Toml => {
            let table: toml::Table =
                toml::from_str(block).map_err(|e| Error::parse(source_name, e))?;
            Ok(table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect())
        }
    }
}

/// YAML mapping entries with scalar keys turned into strings
fn yaml_entries(map: serde_yaml::Mapping) -> std::result::Result<Vec<(String, Value)>, String> {
    map.into_iter()
        .map(|(key, value)| Ok((yaml_key(key)?, yaml_to_json(value)?)))
        .collect()
}

fn yaml_key(key: serde_yaml::Value) -> std::result::Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err("front matter keys must be scalars".to_string())
        }
    }
}

/// Non-finite floats keep their YAML spelling as a string
fn yaml_to_json(value: serde_yaml::Value) -> std::result::Result<Value, String> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(n.to_string()))
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<std::result::Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(map) => Value::Object(yaml_entries(map)?.into_iter().collect()),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// TOML datetimes and non-finite floats become their string form
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(toml_float_text(f))),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

fn toml_float_text(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_sign_negative() {
        "-inf".to_string()
    } else {
        "inf".to_string()
    }
}
