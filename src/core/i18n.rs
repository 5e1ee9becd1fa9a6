use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const EMBEDDED_EN: &str = include_str!("locales/en.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Named interpolation parameters for a message lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageParams {
    values: BTreeMap<String, String>,
    count: Option<i64>,
}

impl MessageParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets `count`, which also selects the `_plural` template when not 1.
    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self.values.insert("count".to_string(), count.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn count_value(&self) -> Option<i64> {
        self.count
    }
}

/// Anything that can turn a message id plus parameters into display text.
pub trait Translator {
    fn translate(&self, key: &str, params: &MessageParams) -> String;
}

/// Flat key -> template catalog using `{{name}}` interpolation.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: BTreeMap<String, String>,
}

impl MessageCatalog {
    /// The built-in English catalog.
    pub fn english() -> Self {
        // The embedded file is checked by `embedded_catalog_parses`.
        Self::from_json(EMBEDDED_EN).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let mut messages = BTreeMap::new();
        flatten("", &value, &mut messages);
        Ok(Self { messages })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load `path` when given, falling back to the English catalog on error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(p) => match Self::load(p) {
                Ok(catalog) => catalog,
                Err(e) => {
                    tracing::warn!("Ignoring catalog {}: {}", p.display(), e);
                    Self::english()
                }
            },
            None => Self::english(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn template(&self, key: &str, params: &MessageParams) -> Option<&str> {
        if let Some(count) = params.count_value() {
            if count != 1 {
                if let Some(plural) = self.get(&format!("{}_plural", key)) {
                    return Some(plural);
                }
            }
        }
        self.get(key)
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, key: &str, params: &MessageParams) -> String {
        let Some(template) = self.template(key, params) else {
            return key.to_string();
        };
        let interpolated = interpolate(template, params);
        resolve_nested(&interpolated, self)
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut BTreeMap<String, String>) {
    let join = |k: &str| {
        if prefix.is_empty() {
            k.to_string()
        } else {
            format!("{}.{}", prefix, k)
        }
    };
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                flatten(&join(k), v, out);
            }
        }
        serde_json::Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(&join(&i.to_string()), v, out);
            }
        }
        serde_json::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Replace `{{name}}` placeholders. Unknown names are left untouched.
fn interpolate(template: &str, params: &MessageParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match params.get(name) {
                    Some(v) => out.push_str(v),
                    None => {
                        out.push_str("{{");
                        out.push_str(&after[..end]);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace `$t(other.key)` references with the referenced message.
fn resolve_nested(text: &str, catalog: &MessageCatalog) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("$t(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        match after.find(')') {
            Some(end) => {
                let key = after[..end].trim();
                out.push_str(catalog.get(key).unwrap_or(key));
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
