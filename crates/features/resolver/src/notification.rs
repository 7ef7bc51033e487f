//! Deferred notification formatting.
//!
//! The slack section carries [`DeferredHook::DidDeploy`] and [`DeferredHook::DidActivate`]
//! values that capture a [`NotificationContext`] at resolution time. Once the pipeline knows
//! the deployment outcome it evaluates them here; nothing is looked up again.

use dpack_kernel::domain::context::{DeferredHook, DeploymentContext, NotificationContext};
use std::future::Future;
use std::path::PathBuf;

/// Delivery side of a notification (a chat webhook, a log sink, a test double).
pub trait Notifier: Send + Sync {
    type Error;

    fn notify(&self, message: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A formatted message waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredNotice {
    message: String,
}

impl DeferredNotice {
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub async fn send<N: Notifier>(&self, notifier: &N) -> Result<(), N::Error> {
        notifier.notify(&self.message).await
    }
}

/// Result of evaluating a [`DeferredHook`] against deployment results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    DistDir(Option<PathBuf>),
    /// `None` when the hook produces nothing for this context (a deploy that was not an
    /// explicit activation run).
    Notice(Option<DeferredNotice>),
}

/// Dispatches any hook found in a configuration tree.
#[must_use]
pub fn evaluate(hook: &DeferredHook, deployment: &DeploymentContext) -> HookOutcome {
    match hook {
        DeferredHook::DistDir => HookOutcome::DistDir(deployment.command_options.build_dir.clone()),
        DeferredHook::DidDeploy(ctx) => HookOutcome::Notice(Some(on_deploy(ctx, deployment))),
        DeferredHook::DidActivate(ctx) => HookOutcome::Notice(on_activate(ctx, deployment)),
    }
}

/// Message after an upload.
///
/// A revision that was uploaded but not activated gets a preview link (when the domain is
/// known) and the command that would activate it.
#[must_use]
pub fn on_deploy(ctx: &NotificationContext, deployment: &DeploymentContext) -> DeferredNotice {
    let revision = &deployment.revision_data;
    let label = &ctx.target_label;

    // Empty keys count as absent.
    let rev = revision.revision_key.as_deref().filter(|key| !key.is_empty());
    let activated = revision.activated_revision_key.as_deref().filter(|key| !key.is_empty());

    let message = match rev {
        Some(rev) if activated.is_none() => {
            let mut lines = vec![format!("Deployed {} to {label} but did not activate it.", ctx.app_name)];
            if !ctx.domain.is_empty() {
                lines.push(format!("Preview: https://{}/?index_key={rev}", ctx.domain));
            }
            lines.push(format!("Activate with: {} {label} --revision={rev}", ctx.activation_command));
            lines.join("\n")
        },
        rev => format!(
            "Deployed and activated {} to {label} (revision {})",
            ctx.app_name,
            rev.unwrap_or("unknown")
        ),
    };

    DeferredNotice { message }
}

/// Message after an explicit activation run; `None` unless `--revision` was passed.
#[must_use]
pub fn on_activate(
    ctx: &NotificationContext,
    deployment: &DeploymentContext,
) -> Option<DeferredNotice> {
    let options = &deployment.command_options;
    if !options.has_revision() {
        return None;
    }

    let activated = deployment
        .revision_data
        .activated_revision_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .or(options.revision.as_deref())
        .unwrap_or_default();

    Some(DeferredNotice {
        message: format!("Activated {} revision on {}: {activated}", ctx.app_name, ctx.target_label),
    })
}
