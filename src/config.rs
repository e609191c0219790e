//! Configuration properties as container services.
//!
//! Property sources (a JSON document, prefixed environment variables) are
//! flattened into dotted keys and registered as named [`ConfigValue`]
//! singletons by a [`PropertiesModule`], so configuration travels through
//! the same container as every other collaborator.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Container, DiError, DiResult, ServiceCollection, ServiceModule};

/// A configuration value that can be various types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<ConfigValue>),
    Object(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Try to convert to string
    pub fn as_str(&self) -> DiResult<&str> {
        match self {
            ConfigValue::String(s) => Ok(s),
            _ => Err(DiError::TypeMismatch("Config value is not a string")),
        }
    }

    /// Try to convert to integer
    pub fn as_i64(&self) -> DiResult<i64> {
        match self {
            ConfigValue::Integer(i) => Ok(*i),
            _ => Err(DiError::TypeMismatch("Config value is not an integer")),
        }
    }

    /// Try to convert to float; integers widen
    pub fn as_f64(&self) -> DiResult<f64> {
        match self {
            ConfigValue::Float(f) => Ok(*f),
            ConfigValue::Integer(i) => Ok(*i as f64),
            _ => Err(DiError::TypeMismatch("Config value is not a number")),
        }
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> DiResult<bool> {
        match self {
            ConfigValue::Boolean(b) => Ok(*b),
            _ => Err(DiError::TypeMismatch("Config value is not a boolean")),
        }
    }

    /// Try to convert to duration from milliseconds
    pub fn as_duration_ms(&self) -> DiResult<Duration> {
        let ms = self.as_i64()?;
        if ms < 0 {
            return Err(DiError::TypeMismatch("Duration cannot be negative"));
        }
        Ok(Duration::from_millis(ms as u64))
    }

    /// Parses an untyped string: integer, then float, then boolean, else string.
    fn parse_scalar(raw: String) -> Self {
        if let Ok(int_val) = raw.parse::<i64>() {
            ConfigValue::Integer(int_val)
        } else if let Ok(float_val) = raw.parse::<f64>() {
            ConfigValue::Float(float_val)
        } else if let Ok(bool_val) = raw.parse::<bool>() {
            ConfigValue::Boolean(bool_val)
        } else {
            ConfigValue::String(raw)
        }
    }
}

/// Trait for configuration sources
pub trait PropertySource: Send + Sync + std::fmt::Debug {
    /// Get a configuration value by dotted key
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// List all available keys
    fn keys(&self) -> Vec<String>;
}

/// Properties parsed from a JSON document.
///
/// Nested objects are flattened into dotted keys: `{"db": {"port": 5432}}`
/// yields `db.port`. Arrays stay whole.
#[derive(Debug, Clone, Default)]
pub struct JsonPropertySource {
    values: BTreeMap<String, ConfigValue>,
}

impl JsonPropertySource {
    /// Parses a JSON object.
    pub fn from_json(json: &str) -> DiResult<Self> {
        let parsed: BTreeMap<String, ConfigValue> = serde_json::from_str(json)
            .map_err(|err| DiError::Configuration(format!("invalid JSON properties: {}", err)))?;

        let mut values = BTreeMap::new();
        flatten(String::new(), parsed, &mut values);
        Ok(Self { values })
    }

    /// Reads and parses a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            DiError::Configuration(format!("cannot read {}: {}", path.display(), err))
        })?;
        Self::from_json(&content)
    }
}

impl PropertySource for JsonPropertySource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

fn flatten(prefix: String, object: BTreeMap<String, ConfigValue>, out: &mut BTreeMap<String, ConfigValue>) {
    for (key, value) in object {
        let full_key = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            ConfigValue::Object(nested) => flatten(full_key, nested, out),
            other => {
                out.insert(full_key, other);
            }
        }
    }
}

/// Environment variable configuration source.
///
/// With prefix `app`, the variable `APP_DB_PORT` is exposed as `db.port`.
#[derive(Debug, Clone)]
pub struct EnvironmentPropertySource {
    prefix: String,
}

impl EnvironmentPropertySource {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_uppercase(),
        }
    }

    fn variable_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.replace('.', "_").to_uppercase())
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        env::var(self.variable_name(key)).ok().map(ConfigValue::parse_scalar)
    }

    fn keys(&self) -> Vec<String> {
        let prefix = format!("{}_", self.prefix);
        let mut keys: Vec<String> = env::vars()
            .filter_map(|(name, _)| {
                name.strip_prefix(&prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| rest.to_lowercase().replace('_', "."))
            })
            .collect();
        keys.sort();
        keys
    }
}

/// Registers every property of its sources as a named [`ConfigValue`].
///
/// Sources are consulted in the order they were added; when two define the
/// same key the earlier one wins.
///
/// # Examples
///
/// ```
/// use context_registry::config::{ConfigContainerExt, JsonPropertySource, PropertiesModule};
/// use context_registry::{ServiceCollection, ServiceCollectionExt};
///
/// let module = PropertiesModule::new()
///     .with_source(JsonPropertySource::from_json(r#"{"house": {"rooms": 4}}"#).unwrap());
///
/// let container = ServiceCollection::new().add_module(&module).unwrap().build();
/// assert_eq!(container.property("house.rooms").unwrap().as_i64().unwrap(), 4);
/// ```
#[derive(Debug, Default)]
pub struct PropertiesModule {
    sources: Vec<Box<dyn PropertySource>>,
}

impl PropertiesModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source with lower priority than those already added.
    pub fn with_source<S: PropertySource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// All keys across sources, deduplicated and sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sources.iter().flat_map(|s| s.keys()).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Value of `key` from the highest-priority source defining it.
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        self.sources.iter().find_map(|source| source.get(key))
    }
}

impl ServiceModule for PropertiesModule {
    fn register_services(&self, services: &mut ServiceCollection) -> DiResult<()> {
        for key in self.keys() {
            if let Some(value) = self.get(&key) {
                services.add_named_singleton(&key, value);
            }
        }
        Ok(())
    }
}

/// Property lookup shorthand for containers.
pub trait ConfigContainerExt: Container {
    /// The [`ConfigValue`] registered under `key`.
    fn property(&self, key: &str) -> DiResult<Arc<ConfigValue>> {
        self.lookup::<ConfigValue>(key)
    }
}

impl<C: Container + ?Sized> ConfigContainerExt for C {}
