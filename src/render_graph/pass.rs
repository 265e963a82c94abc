//! Pass instance descriptions.
//!
//! A pass is an opaque, host-implemented unit of rendering work. The graph
//! only records which pass type to instantiate, under which instance name,
//! and with which option values. Option semantics belong to the host.

use std::fmt;

use serde::de::{self, MapAccess, Unexpected, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Handle to a pass in the render graph.
///
/// `PassHandle` is `Copy` and cheap to pass around. It is only valid within
/// the `RenderGraph` that created it, and only until a pass is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassHandle(u32);

impl PassHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position of the pass in creation order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A scalar pass option value.
///
/// In JSON, values map to the matching JSON scalar. Non-finite floats have no
/// JSON number form and are written as `{"float": "inf"}`, `{"float": "-inf"}`
/// or `{"float": "nan"}`. Integers outside the `i64` range are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOption {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Enumerated values such as `Default` or `AperturePriority`.
    Str(String),
}

impl PassOption {
    /// The value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The value if this is an `Int`. Floats are not truncated.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value if this is a `Float`. Integers are not widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The value if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// JSON object key of a non-finite float.
const NON_FINITE_KEY: &str = "float";
const NON_FINITE_FIELDS: &[&str] = &[NON_FINITE_KEY];

fn non_finite_name(value: f64) -> &'static str {
    if value.is_nan() {
        "nan"
    } else if value > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}

fn parse_non_finite(name: &str) -> Option<f64> {
    match name {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => None,
    }
}

impl Serialize for PassOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Float(v) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(NON_FINITE_KEY, non_finite_name(*v))?;
                map.end()
            }
            Self::Str(v) => serializer.serialize_str(v),
        }
    }
}

impl<'de> Deserialize<'de> for PassOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionVisitor;

        impl<'de> Visitor<'de> for OptionVisitor {
            type Value = PassOption;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a bool, integer, float or string option value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<PassOption, E> {
                Ok(PassOption::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<PassOption, E> {
                Ok(PassOption::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<PassOption, E> {
                i64::try_from(v).map(PassOption::Int).map_err(|_| {
                    E::invalid_value(Unexpected::Unsigned(v), &"an integer within the i64 range")
                })
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<PassOption, E> {
                Ok(PassOption::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PassOption, E> {
                Ok(PassOption::Str(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<PassOption, E> {
                Ok(PassOption::Str(v))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PassOption, A::Error> {
                let Some(key) = access.next_key::<String>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };
                if key != NON_FINITE_KEY {
                    return Err(de::Error::unknown_field(&key, NON_FINITE_FIELDS));
                }

                let name: String = access.next_value()?;
                let Some(value) = parse_non_finite(&name) else {
                    return Err(de::Error::invalid_value(
                        Unexpected::Str(&name),
                        &r#""inf", "-inf" or "nan""#,
                    ));
                };

                if access.next_key::<String>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(PassOption::Float(value))
            }
        }

        deserializer.deserialize_any(OptionVisitor)
    }
}

impl fmt::Display for PassOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            // Debug keeps the shortest round-trip form and the trailing `.0`.
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<bool> for PassOption {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PassOption {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PassOption {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for PassOption {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for PassOption {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Widens exactly, so `11.2f32` becomes `11.199999809265137`.
impl From<f32> for PassOption {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

impl From<&str> for PassOption {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PassOption {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Ordered mapping from option name to value.
///
/// Keeps insertion order. Inserting an existing key replaces the value
/// without moving the entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassConfig {
    entries: Vec<(String, PassOption)>,
}

impl PassConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option (chained).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PassOption>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an option, returning the previous value for that key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PassOption>,
    ) -> Option<PassOption> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Value of an option, if set.
    pub fn get(&self, key: &str) -> Option<&PassOption> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// True if the option is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove an option, returning its value. Later entries keep their order.
    pub fn remove(&mut self, key: &str) -> Option<PassOption> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PassOption)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Option names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no option is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<PassOption>> FromIterator<(K, V)> for PassConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (key, value) in iter {
            config.insert(key, value);
        }
        config
    }
}

impl Serialize for PassConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PassConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConfigVisitor;

        impl<'de> Visitor<'de> for ConfigVisitor {
            type Value = PassConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of pass options")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PassConfig, A::Error> {
                let mut config = PassConfig::new();
                while let Some((key, value)) = access.next_entry::<String, PassOption>()? {
                    config.insert(key, value);
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(ConfigVisitor)
    }
}

/// A pass instance in the render graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassNode {
    #[serde(rename = "type")]
    pass_type: String,
    name: String,
    options: PassConfig,
}

impl PassNode {
    /// Describe a pass instance. Use [`RenderGraph::create_pass`] to add one
    /// to a graph.
    ///
    /// [`RenderGraph::create_pass`]: super::RenderGraph::create_pass
    pub fn new(pass_type: impl Into<String>, name: impl Into<String>, options: PassConfig) -> Self {
        Self {
            pass_type: pass_type.into(),
            name: name.into(),
            options,
        }
    }

    /// Host pass type, e.g. `VBufferRT`.
    pub fn pass_type(&self) -> &str {
        &self.pass_type
    }

    /// Instance name, unique within a graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Option values passed to the host pass.
    pub fn config(&self) -> &PassConfig {
        &self.options
    }

    pub(crate) fn set_config(&mut self, options: PassConfig) -> PassConfig {
        std::mem::replace(&mut self.options, options)
    }
}
