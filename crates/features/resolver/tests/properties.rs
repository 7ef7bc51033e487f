mod common;

use common::{FakeTransport, REMOTE_ENV, SettingsObject};
use dpack_kernel::domain::config::EngineSettings;
use dpack_kernel::domain::context::{CommandOptions, DeploymentContext, NotificationContext};
use dpack_kernel::policy::{PolicyTable, TargetFacts};
use dpack_resolver::Resolver;
use dpack_resolver::notification::on_activate;
use proptest::prelude::*;
use serde_json::Value;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

fn single_target(domain: &str, bastion: Option<&str>, production: bool) -> PolicyTable {
    PolicyTable::new("deploy").target(
        "slot",
        TargetFacts {
            domain: domain.to_owned(),
            bastion_host: bastion.map(str::to_owned),
            production,
            sentry_org: "example".to_owned(),
        },
    )
}

fn empty_store() -> SettingsObject {
    SettingsObject { bucket: String::new(), key: String::new(), body: Vec::new() }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tunnel_is_two_hop_iff_bastion_exists(
        domain in "[a-z]{1,12}\\.example\\.com",
        bastion in proptest::option::of("jump[0-9]{1,3}\\.example\\.net"),
        production in any::<bool>(),
    ) {
        let transport = FakeTransport::serving(REMOTE_ENV);
        let resolver = Resolver::new(EngineSettings::default(), &transport, empty_store())
            .with_environment(common::ambient());
        let policy = single_target(&domain, bastion.as_deref(), production);

        let tree = runtime()
            .block_on(resolver.resolve("app", "App", &"slot".into(), &policy))
            .unwrap();
        let tunnel = tree.section("ssh-tunnel").unwrap();

        prop_assert_eq!(tunnel.contains_key("dstHost"), bastion.is_some());
        let expected_host = bastion.as_deref().unwrap_or(&domain);
        prop_assert_eq!(tunnel.get_str("host"), Some(expected_host));
        prop_assert_eq!(&transport.calls()[0].1, expected_host);
    }

    #[test]
    fn source_maps_are_never_cached(prefix in "[a-z][a-z0-9-]{0,15}") {
        let transport = FakeTransport::serving(REMOTE_ENV);
        let resolver = Resolver::new(EngineSettings::default(), &transport, empty_store())
            .with_environment(common::ambient());
        let policy = single_target("blog.example.com", None, true);

        let tree = runtime()
            .block_on(resolver.resolve(&prefix, "App", &"slot".into(), &policy))
            .unwrap();
        let maps = tree.section("s3-source-maps").unwrap();

        prop_assert_eq!(maps.get_str("cacheControl"), Some("no-cache, no-store, must-revalidate"));
        prop_assert_eq!(maps.get("expires").and_then(|v| v.as_data()), Some(&Value::from(0)));
        let pattern = format!("**/+(vendor|{prefix}).map");
        prop_assert_eq!(maps.get_str("filePattern"), Some(pattern.as_str()));
    }

    #[test]
    fn activation_notice_requires_a_revision(revision in proptest::option::of("[a-f0-9]{0,8}")) {
        let ctx = NotificationContext {
            app_name: "Blog".to_owned(),
            domain: "blog.example.com".to_owned(),
            prefix: "blog-app".to_owned(),
            target_label: "aws-prod".to_owned(),
            activation_command: "ember deploy:activate".to_owned(),
        };
        let deployment = DeploymentContext {
            command_options: CommandOptions { revision: revision.clone(), build_dir: None },
            ..DeploymentContext::default()
        };

        let notice = on_activate(&ctx, &deployment);
        let has_revision = revision.as_deref().is_some_and(|r| !r.is_empty());
        prop_assert_eq!(notice.is_some(), has_revision);
        if let (Some(notice), Some(rev)) = (notice, revision) {
            prop_assert!(notice.message().ends_with(&rev));
        }
    }

    #[test]
    fn batch_builds_exactly_one_index(is_latest in any::<bool>(), production in any::<bool>()) {
        let stage = if production { "production" } else { "staging" };
        let store = SettingsObject {
            bucket: "settings".to_owned(),
            key: format!("{stage}/slot/app-settings.json"),
            body: b"{}".to_vec(),
        };
        let mut settings = EngineSettings::default();
        settings.batch.settings_bucket = Some("settings".to_owned());
        let transport = FakeTransport::default();
        let resolver = Resolver::new(settings, &transport, store).with_environment(common::ambient());
        let policy = single_target("blog.example.com", None, production);

        let tree = runtime()
            .block_on(resolver.resolve_batch("app", "App", &"slot".into(), &policy, is_latest))
            .unwrap();
        let pipeline = tree.pipeline().unwrap();

        prop_assert_eq!(tree.section("s3-index-latest").is_some(), is_latest);
        prop_assert_eq!(tree.section("s3-index").is_some(), !is_latest);
        prop_assert_eq!(pipeline.is_disabled("s3-index-latest"), Some(!is_latest));
        prop_assert_eq!(pipeline.is_disabled("s3-index"), Some(is_latest));
        prop_assert!(transport.calls().is_empty());
    }
}
