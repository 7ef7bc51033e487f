//! The configuration tree handed to the deployment plugin pipeline.

use crate::context::DeferredHook;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single option value: plain data, or a hook evaluated once deployment results exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Data(Value),
    Deferred(DeferredHook),
}

impl OptionValue {
    #[must_use]
    pub const fn as_data(&self) -> Option<&Value> {
        match self {
            Self::Data(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    #[must_use]
    pub const fn as_deferred(&self) -> Option<&DeferredHook> {
        match self {
            Self::Data(_) => None,
            Self::Deferred(hook) => Some(hook),
        }
    }

    /// String content of a data value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(Value::as_str)
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

impl From<DeferredHook> for OptionValue {
    fn from(hook: DeferredHook) -> Self {
        Self::Deferred(hook)
    }
}

impl Serialize for OptionValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Data(value) => value.serialize(serializer),
            Self::Deferred(hook) => serializer.serialize_str(&format!("<deferred:{}>", hook.name())),
        }
    }
}

/// Option name -> value for one plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Section(BTreeMap<String, OptionValue>);

impl Section {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), OptionValue::Data(value.into()));
        self
    }

    /// Builder-style insert of a deferred hook.
    #[must_use]
    pub fn with_hook(mut self, key: impl Into<String>, hook: DeferredHook) -> Self {
        self.0.insert(key.into(), OptionValue::Deferred(hook));
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Pipeline overrides used by batch resolutions instead of a flat plugin list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    /// Plugin name -> section names it runs as.
    pub alias: BTreeMap<String, PluginAlias>,
    /// Section name -> whether the pipeline skips it.
    pub disabled: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginAlias {
    #[serde(rename = "as")]
    pub names: Vec<String>,
}

impl Pipeline {
    #[must_use]
    pub fn is_disabled(&self, section: &str) -> Option<bool> {
        self.disabled.get(section).copied()
    }
}

/// The complete configuration produced by one resolution.
///
/// Only ever handed out whole; builders in the engine assemble it privately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigurationTree {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    plugins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<Pipeline>,
    #[serde(flatten)]
    sections: BTreeMap<String, Section>,
}

impl ConfigurationTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_plugins(&mut self, plugins: impl IntoIterator<Item = String>) {
        self.plugins = plugins.into_iter().collect();
    }

    pub fn set_pipeline(&mut self, pipeline: Pipeline) {
        self.pipeline = Some(pipeline);
    }

    pub fn insert(&mut self, name: impl Into<String>, section: Section) {
        self.sections.insert(name.into(), section);
    }

    #[must_use]
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    #[must_use]
    pub const fn pipeline(&self) -> Option<&Pipeline> {
        self.pipeline.as_ref()
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serializes the tree; deferred hooks render as `"<deferred:name>"`.
    ///
    /// # Errors
    /// Propagates `serde_json` failures (none are expected for this shape).
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
