//! Explicit key/value environment scoped to a single resolution.
//!
//! Section builders read secrets from a [`SecretEnvironment`] value instead of the process
//! environment, so two resolutions never observe each other's fetched values. Values are
//! zeroized when the environment is dropped and never appear in `Debug` output.

use std::collections::BTreeMap;
use std::fmt;
use zeroize::Zeroizing;

#[derive(Clone, Default)]
pub struct SecretEnvironment {
    vars: BTreeMap<String, Zeroizing<String>>,
}

impl SecretEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|v| v.as_str())
    }

    /// Like [`get`](Self::get) but treats empty values as unset.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// First non-empty value among `keys`.
    #[must_use]
    pub fn first_of<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Option<&str> {
        keys.into_iter().find_map(|key| self.get_non_empty(key))
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Sets a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), Zeroizing::new(value.into()));
    }

    /// Adds every entry of `other` whose key is not already set; existing values win.
    ///
    /// Returns the keys that were added.
    pub fn merge_missing(&mut self, other: Self) -> Vec<String> {
        let mut added = Vec::new();
        for (key, value) in other.vars {
            if !self.vars.contains_key(&key) {
                added.push(key.clone());
                self.vars.insert(key, value);
            }
        }
        added
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SecretEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Self::new();
        for (key, value) in iter {
            env.insert(key, value);
        }
        env
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for SecretEnvironment {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl fmt::Debug for SecretEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.vars.keys().map(|k| (k, "<redacted>"))).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_missing_keeps_existing_values() {
        let mut ambient: SecretEnvironment =
            [("AWS_ASSET_BUCKET", "local-bucket"), ("USER", "ci")].into_iter().collect();
        let fetched: SecretEnvironment =
            [("AWS_ASSET_BUCKET", "remote-bucket"), ("AWS_ACCESS_KEY_ID", "AKIA")]
                .into_iter()
                .collect();

        let added = ambient.merge_missing(fetched);

        assert_eq!(added, ["AWS_ACCESS_KEY_ID"]);
        assert_eq!(ambient.get("AWS_ASSET_BUCKET"), Some("local-bucket"));
        assert_eq!(ambient.get("AWS_ACCESS_KEY_ID"), Some("AKIA"));
    }

    #[test]
    fn empty_values_are_not_truthy() {
        let env: SecretEnvironment =
            [("SSH_AUTH_SOCK", ""), ("FALLBACK", "yes")].into_iter().collect();
        assert_eq!(env.get("SSH_AUTH_SOCK"), Some(""));
        assert!(env.get_non_empty("SSH_AUTH_SOCK").is_none());
        assert_eq!(env.first_of(["SSH_AUTH_SOCK", "FALLBACK"]), Some("yes"));
    }

    #[test]
    fn debug_redacts_values() {
        let env: SecretEnvironment = [("AWS_SECRET_ACCESS_KEY", "hunter2")].into_iter().collect();
        let rendered = format!("{env:?}");
        assert!(rendered.contains("AWS_SECRET_ACCESS_KEY"));
        assert!(!rendered.contains("hunter2"));
    }
}
