use crate::constants::{
    BUILD, DISPLAY_REVISIONS, GZIP, MANIFEST, REDIS, REVISION_DATA, S3_ALL, S3_INDEX,
    S3_INDEX_LATEST, S3_PLUGIN, S3_SOURCE_MAPS, SENTRY, SLACK, SSH_TUNNEL,
};
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// A set of pipeline plugins / configuration sections.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct SectionSet: u32 {
        const SSH_TUNNEL = 1 << 0;
        const BUILD = 1 << 1;
        const GZIP = 1 << 2;
        const REVISION_DATA = 1 << 3;
        const MANIFEST = 1 << 4;
        const S3_ALL = 1 << 5;
        const S3_SOURCE_MAPS = 1 << 6;
        const S3_INDEX = 1 << 7;
        const S3_INDEX_LATEST = 1 << 8;
        const REDIS = 1 << 9;
        const DISPLAY_REVISIONS = 1 << 10;
        const SLACK = 1 << 11;
        const SENTRY = 1 << 12;

        /// Sections whose builders read fetched secrets.
        const SECRET_BACKED = Self::S3_ALL.bits()
            | Self::S3_SOURCE_MAPS.bits()
            | Self::S3_INDEX.bits()
            | Self::S3_INDEX_LATEST.bits()
            | Self::SLACK.bits()
            | Self::SENTRY.bits();

        /// The two storage sections served by one `s3` plugin through aliasing.
        const S3_ASSETS = Self::S3_ALL.bits() | Self::S3_SOURCE_MAPS.bits();
    }
}

/// Canonical pipeline order: `(flag, section name, plugin this section is an instance of)`.
pub const PIPELINE_ORDER: [(SectionSet, &str, Option<&str>); 13] = [
    (SectionSet::SSH_TUNNEL, SSH_TUNNEL, None),
    (SectionSet::BUILD, BUILD, None),
    (SectionSet::GZIP, GZIP, None),
    (SectionSet::REVISION_DATA, REVISION_DATA, None),
    (SectionSet::MANIFEST, MANIFEST, None),
    (SectionSet::S3_ALL, S3_ALL, Some(S3_PLUGIN)),
    (SectionSet::S3_SOURCE_MAPS, S3_SOURCE_MAPS, Some(S3_PLUGIN)),
    (SectionSet::S3_INDEX, S3_INDEX, None),
    (SectionSet::S3_INDEX_LATEST, S3_INDEX_LATEST, Some(S3_INDEX)),
    (SectionSet::REDIS, REDIS, None),
    (SectionSet::DISPLAY_REVISIONS, DISPLAY_REVISIONS, None),
    (SectionSet::SLACK, SLACK, None),
    (SectionSet::SENTRY, SENTRY, None),
];

impl SectionSet {
    /// Section names of all members, in pipeline order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        PIPELINE_ORDER
            .into_iter()
            .filter(move |(flag, _, _)| self.contains(*flag))
            .map(|(_, name, _)| name)
    }

    /// Plugin list entries (`name` or `plugin:name` for aliased instances), in pipeline order.
    pub fn plugin_specs(self) -> impl Iterator<Item = String> {
        PIPELINE_ORDER.into_iter().filter(move |(flag, _, _)| self.contains(*flag)).map(
            |(_, name, plugin)| {
                plugin.map_or_else(|| name.to_owned(), |plugin| format!("{plugin}:{name}"))
            },
        )
    }

    /// Name of a single-flag set; `None` for composite or empty sets.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        PIPELINE_ORDER.into_iter().find(|(flag, _, _)| *flag == self).map(|(_, name, _)| name)
    }
}

impl From<&str> for SectionSet {
    fn from(s: &str) -> Self {
        PIPELINE_ORDER
            .into_iter()
            .find(|(_, name, _)| *name == s)
            .map_or_else(Self::empty, |(flag, _, _)| flag)
    }
}

impl<'a> FromIterator<&'a str> for SectionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Self::from).fold(Self::empty(), |acc, s| acc | s)
    }
}

impl Serialize for SectionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.names())
    }
}

impl<'de> Deserialize<'de> for SectionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names.iter().map(String::as_str).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_specs_follow_pipeline_order() {
        let set = SectionSet::REDIS | SectionSet::S3_ALL | SectionSet::SSH_TUNNEL;
        let specs: Vec<String> = set.plugin_specs().collect();
        assert_eq!(specs, ["ssh-tunnel", "s3:s3-all", "redis"]);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let set: SectionSet = ["sentry", "nope", "slack"].into_iter().collect();
        assert_eq!(set, SectionSet::SENTRY | SectionSet::SLACK);
    }

    #[test]
    fn single_flag_names() {
        assert_eq!(SectionSet::S3_SOURCE_MAPS.name(), Some("s3-source-maps"));
        assert_eq!(SectionSet::S3_ASSETS.name(), None);
    }
}
