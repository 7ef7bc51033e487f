//! Declarative section tables.
//!
//! Each resolution mode is one [`SectionPlan`]: which plugins the pipeline runs, which
//! sections the engine builds, and (batch mode only) which plugins the pipeline skips.
//! Host settings can drop sections from every plan through `sections.exclude`.

use dpack_kernel::domain::sections::{PIPELINE_ORDER, SectionSet};
use dpack_kernel::domain::tree::{Pipeline, PluginAlias};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPlan {
    /// Plugins known to the pipeline.
    pub plugins: SectionSet,
    /// Sections the engine builds. Plugins without options have no section.
    pub sections: SectionSet,
    /// `Some` for batch plans, which hand the pipeline a disabled map instead of a list.
    pub disabled: Option<SectionSet>,
}

impl SectionPlan {
    /// Cache-only tree for local post-build runs. Reads no secrets.
    pub const DEVELOPMENT: Self = Self {
        plugins: SectionSet::REDIS,
        sections: SectionSet::BUILD.union(SectionSet::REDIS),
        disabled: None,
    };

    pub const STANDARD: Self = Self {
        plugins: SectionSet::SSH_TUNNEL
            .union(SectionSet::BUILD)
            .union(SectionSet::GZIP)
            .union(SectionSet::REVISION_DATA)
            .union(SectionSet::MANIFEST)
            .union(SectionSet::S3_ASSETS)
            .union(SectionSet::REDIS)
            .union(SectionSet::DISPLAY_REVISIONS)
            .union(SectionSet::SLACK)
            .union(SectionSet::SENTRY),
        sections: SectionSet::SSH_TUNNEL
            .union(SectionSet::BUILD)
            .union(SectionSet::REVISION_DATA)
            .union(SectionSet::S3_ASSETS)
            .union(SectionSet::REDIS)
            .union(SectionSet::SLACK)
            .union(SectionSet::SENTRY),
        disabled: None,
    };

    /// Batch plan: tunnel and cache are always skipped, and exactly one of the two index
    /// sections runs.
    #[must_use]
    pub const fn batch(is_latest_build: bool) -> Self {
        let (index, skipped_index) = if is_latest_build {
            (SectionSet::S3_INDEX_LATEST, SectionSet::S3_INDEX)
        } else {
            (SectionSet::S3_INDEX, SectionSet::S3_INDEX_LATEST)
        };

        Self {
            plugins: SectionSet::all(),
            sections: SectionSet::BUILD
                .union(SectionSet::REVISION_DATA)
                .union(index)
                .union(SectionSet::S3_ASSETS)
                .union(SectionSet::SLACK)
                .union(SectionSet::SENTRY),
            disabled: Some(SectionSet::REDIS.union(SectionSet::SSH_TUNNEL).union(skipped_index)),
        }
    }

    /// Drops the named sections. Batch plans keep them in the disabled map; flat plans
    /// remove them from the plugin list.
    #[must_use]
    pub fn excluding<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        let mut excluded = SectionSet::empty();
        for name in names.iter().map(AsRef::as_ref) {
            let flag = SectionSet::from(name);
            if flag.is_empty() {
                warn!(section = name, "Ignoring unknown section in exclude list");
            }
            excluded |= flag;
        }

        self.sections -= excluded;
        match self.disabled.as_mut() {
            Some(disabled) => *disabled |= excluded & self.plugins,
            None => self.plugins -= excluded,
        }
        self
    }

    /// Flat plugin list (`name` or `plugin:name`), empty for batch plans.
    #[must_use]
    pub fn plugin_list(&self) -> Vec<String> {
        if self.disabled.is_some() { Vec::new() } else { self.plugins.plugin_specs().collect() }
    }

    /// Pipeline overrides for batch plans.
    #[must_use]
    pub fn pipeline(&self) -> Option<Pipeline> {
        let disabled = self.disabled?;

        // A plugin with instances runs each of them, plus itself when its base section
        // belongs to the plan (`s3-index` runs `s3-index` and `s3-index-latest`).
        let mut alias: BTreeMap<String, PluginAlias> = BTreeMap::new();
        for (flag, name, plugin) in PIPELINE_ORDER {
            let Some(plugin) = plugin else { continue };
            if !self.plugins.contains(flag) {
                continue;
            }
            alias
                .entry(plugin.to_owned())
                .or_insert_with(|| {
                    let base = SectionSet::from(plugin);
                    let names = if !base.is_empty() && self.plugins.contains(base) {
                        vec![plugin.to_owned()]
                    } else {
                        Vec::new()
                    };
                    PluginAlias { names }
                })
                .names
                .push(name.to_owned());
        }

        let disabled = self
            .plugins
            .names()
            .map(|name| (name.to_owned(), disabled.contains(SectionSet::from(name))))
            .collect();

        Some(Pipeline { alias, disabled })
    }
}
