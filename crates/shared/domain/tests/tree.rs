use dpack_domain::context::{DeferredHook, DeploymentContext};
use dpack_domain::sections::SectionSet;
use dpack_domain::tree::{ConfigurationTree, Section};
use serde_json::json;

#[test]
fn tree_serializes_sections_flat_with_deferred_markers() {
    let mut tree = ConfigurationTree::new();
    tree.set_plugins(SectionSet::REDIS.plugin_specs());
    tree.insert(
        "redis",
        Section::new().with("host", "localhost").with("port", 6379).with_hook("distDir", DeferredHook::DistDir),
    );

    let value = tree.to_json().expect("tree serializes");
    assert_eq!(
        value,
        json!({
            "plugins": ["redis"],
            "redis": { "distDir": "<deferred:distDir>", "host": "localhost", "port": 6379 }
        })
    );
}

#[test]
fn deployment_context_reads_camel_case() {
    let ctx: DeploymentContext = serde_json::from_value(json!({
        "revisionData": { "revisionKey": "abc123" },
        "commandOptions": { "revision": "abc123", "buildDir": "tmp/deploy-dist" }
    }))
    .expect("context deserialize");

    assert_eq!(ctx.revision_data.revision_key.as_deref(), Some("abc123"));
    assert!(ctx.revision_data.activated_revision_key.is_none());
    assert!(ctx.command_options.has_revision());
}
