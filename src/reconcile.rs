// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::api::{ClusterApi, IamApi};
use crate::config::{self, Config};
use crate::context::{self, Context};
use crate::types::document;
use crate::types::error::{ApiError, IssuerError};
use snafu::{ResultExt, Snafu};
use tracing::info;

pub mod attachment;
pub mod identity;
pub mod policy;
pub mod role;

pub use attachment::{AttachmentState, attach_policy};
pub use identity::resolve_identity;
pub use policy::ensure_policy;
pub use role::{EnsuredRole, RoleState, ensure_role};

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(transparent)]
    Config { source: config::Error },

    #[snafu(transparent)]
    Context { source: context::Error },

    #[snafu(display("cluster '{}' not found", name))]
    ClusterNotFound { name: String },

    #[snafu(display("describe cluster '{}': {}", name, source))]
    DescribeCluster { name: String, source: ApiError },

    #[snafu(display("cluster '{}' has no OIDC issuer", name))]
    MissingIssuer { name: String },

    #[snafu(display("cluster '{}': {}", name, source))]
    InvalidIssuer { name: String, source: IssuerError },

    #[snafu(display("list OIDC providers: {}", source))]
    ListProviders { source: ApiError },

    #[snafu(display("no OIDC provider is registered in the account"))]
    NoProviderRegistered,

    #[snafu(display("no OIDC provider is registered for issuer '{}'", issuer))]
    NoMatchingProvider { issuer: String },

    #[snafu(display("render policy document: {}", source))]
    Document { source: serde_json::Error },

    #[snafu(display("create policy '{}': {}", name, source))]
    CreatePolicy { name: String, source: ApiError },

    #[snafu(display("list policies: {}", source))]
    ListPolicies { source: ApiError },

    #[snafu(display("policy '{}' reported as existing but not found in the account", name))]
    PolicyNotFoundAfterConflict { name: String },

    #[snafu(display("create role '{}': {}", name, source))]
    CreateRole { name: String, source: ApiError },

    #[snafu(display("list policies attached to role '{}': {}", role, source))]
    ListAttachedPolicies { role: String, source: ApiError },

    #[snafu(display("get role '{}': {}", name, source))]
    GetRole { name: String, source: ApiError },
}

/// Result of a reconciliation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub role_arn: String,
    pub policy_arn: String,
    pub provider_arn: String,
    pub role: RoleState,
    pub attachment: AttachmentState,
}

impl Outcome {
    /// False when the policy could not be attached to the role.
    pub fn is_complete(&self) -> bool {
        !self.attachment.is_failed()
    }
}

/// Brings the account to: policy exists, role exists trusting the service
/// account, policy attached to role.
///
/// Every step is safe to repeat; a second run against the same account only
/// reads, apart from attaching the policy if the first run stopped before it.
pub async fn reconcile_binding<C, I>(
    ctx: &Context<C, I>,
    config: &Config,
) -> Result<Outcome, Error>
where
    C: ClusterApi,
    I: IamApi,
{
    config.validate()?;

    let identity = resolve_identity(
        &ctx.cluster,
        &ctx.iam,
        &config.cluster_name,
        config.provider_selection,
    )
    .await?;

    let policy_document = document::policy_document(&config.bucket_arn)
        .to_json()
        .context(DocumentSnafu)?;
    let policy_arn = ensure_policy(
        &ctx.iam,
        &config.policy_name,
        &policy_document,
        &config.policy_description,
    )
    .await?;

    let trust_document = document::trust_document(
        &identity.provider_arn,
        &identity.issuer_host_path,
        &config.namespace,
        &config.service_account,
    )
    .to_json()
    .context(DocumentSnafu)?;
    let role = ensure_role(
        &ctx.iam,
        &config.role_name,
        &trust_document,
        &config.role_description,
        config.attachment_check,
        &policy_arn,
    )
    .await?;

    let attachment = if role.needs_attachment() {
        attach_policy(&ctx.iam, &config.role_name, &policy_arn).await
    } else {
        info!(role = %config.role_name, "role already has a policy attached");
        AttachmentState::AlreadyAttached
    };

    Ok(Outcome {
        role_arn: role.arn,
        policy_arn,
        provider_arn: identity.provider_arn,
        role: role.state,
        attachment,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ProviderSelection;
    use crate::tests::{
        CLUSTER, FakeCluster, FakeIam, ISSUER_URL, policy_arn, provider_arn, role_arn,
        standard_context, test_config,
    };
    use serde_json::Value;

    #[tokio::test]
    async fn test_fresh_account() {
        let ctx = standard_context();
        let config = test_config();

        let outcome = reconcile_binding(&ctx, &config).await.unwrap();

        assert_eq!(outcome.role_arn, role_arn("forensics-role"));
        assert_eq!(outcome.policy_arn, policy_arn("forensics-policy"));
        assert_eq!(outcome.provider_arn, provider_arn("oidc.example.com/id/ABC123"));
        assert_eq!(outcome.role, RoleState::Created);
        assert_eq!(outcome.attachment, AttachmentState::Attached);
        assert!(outcome.is_complete());
        assert_eq!(ctx.iam.mutations(), 3);

        let policy: Value =
            serde_json::from_str(&ctx.iam.policy_document("forensics-policy").unwrap()).unwrap();
        assert_eq!(
            policy["Statement"][0]["Resource"],
            "arn:aws:s3:::forensics-bucket/*"
        );

        let role = ctx.iam.role("forensics-role").unwrap();
        let trust: Value = serde_json::from_str(&role.trust_document).unwrap();
        assert_eq!(
            trust["Statement"][0]["Condition"]["StringEquals"]["oidc.example.com/id/ABC123:sub"],
            "system:serviceaccount:forensics-system:forensics-worker"
        );
        assert_eq!(role.attached.len(), 1);
        assert_eq!(role.attached[0].arn, policy_arn("forensics-policy"));
    }

    #[tokio::test]
    async fn test_second_run_converges_without_mutations() {
        let ctx = standard_context();
        let config = test_config();

        let first = reconcile_binding(&ctx, &config).await.unwrap();
        ctx.iam.reset_counters();
        let second = reconcile_binding(&ctx, &config).await.unwrap();

        assert_eq!(first.role_arn, second.role_arn);
        assert_eq!(first.policy_arn, second.policy_arn);
        assert_eq!(second.role, RoleState::ExistingAttached);
        assert_eq!(second.attachment, AttachmentState::AlreadyAttached);
        assert_eq!(ctx.iam.mutations(), 0);
        assert!(!ctx.iam.calls().contains(&"AttachRolePolicy"));
    }

    #[tokio::test]
    async fn test_recovers_role_left_unattached() {
        let ctx = Context::new(
            FakeCluster::default().with_cluster(CLUSTER, Some(ISSUER_URL)),
            FakeIam::default()
                .with_provider(provider_arn("oidc.example.com/id/ABC123"))
                .with_policy("forensics-policy", "{}")
                .with_role("forensics-role", &[]),
        );

        let outcome = reconcile_binding(&ctx, &test_config()).await.unwrap();

        assert_eq!(outcome.role_arn, role_arn("forensics-role"));
        assert_eq!(outcome.role, RoleState::ExistingUnattached);
        assert_eq!(outcome.attachment, AttachmentState::Attached);
        assert_eq!(ctx.iam.mutations(), 1, "only the attachment is written");
        assert_eq!(
            ctx.iam.calls().iter().filter(|call| **call == "CreateRole").count(),
            1
        );
        assert_eq!(ctx.iam.role("forensics-role").unwrap().attached.len(), 1);
    }

    #[tokio::test]
    async fn test_attachment_failure_still_reports_role() {
        let ctx = Context::new(
            FakeCluster::default().with_cluster(CLUSTER, Some(ISSUER_URL)),
            FakeIam::default()
                .with_provider(provider_arn("oidc.example.com/id/ABC123"))
                .failing("AttachRolePolicy"),
        );

        let outcome = reconcile_binding(&ctx, &test_config()).await.unwrap();

        assert_eq!(outcome.role_arn, role_arn("forensics-role"));
        assert!(outcome.attachment.is_failed());
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn test_empty_bucket_is_fatal_before_remote_calls() {
        let ctx = standard_context();
        let mut config = test_config();
        config.bucket_arn = String::new();

        let err = reconcile_binding(&ctx, &config).await.unwrap_err();

        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.to_string(), "bucketArn is not set");
        assert!(ctx.iam.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_cluster_is_fatal_without_mutations() {
        let ctx = standard_context();
        let mut config = test_config();
        config.cluster_name = "no-such-cluster".to_owned();

        let err = reconcile_binding(&ctx, &config).await.unwrap_err();

        assert!(matches!(err, Error::ClusterNotFound { .. }));
        assert_eq!(ctx.iam.mutations(), 0);
        assert!(ctx.iam.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_provider_is_fatal_without_mutations() {
        let ctx = Context::new(
            FakeCluster::default().with_cluster(CLUSTER, Some(ISSUER_URL)),
            FakeIam::default(),
        );

        let err = reconcile_binding(&ctx, &test_config()).await.unwrap_err();

        assert!(matches!(err, Error::NoProviderRegistered));
        assert_eq!(ctx.iam.mutations(), 0);
        assert_eq!(ctx.iam.calls(), vec!["ListOpenIDConnectProviders"]);
    }

    #[tokio::test]
    async fn test_issuer_match_uses_cluster_provider() {
        let ctx = Context::new(
            FakeCluster::default().with_cluster(CLUSTER, Some(ISSUER_URL)),
            FakeIam::default()
                .with_provider(provider_arn("oidc.example.com/id/OTHER"))
                .with_provider(provider_arn("oidc.example.com/id/ABC123")),
        );
        let mut config = test_config();
        config.provider_selection = ProviderSelection::IssuerMatch;

        let outcome = reconcile_binding(&ctx, &config).await.unwrap();

        assert_eq!(outcome.provider_arn, provider_arn("oidc.example.com/id/ABC123"));
        let trust: Value =
            serde_json::from_str(&ctx.iam.role("forensics-role").unwrap().trust_document)
                .unwrap();
        assert_eq!(
            trust["Statement"][0]["Principal"]["Federated"],
            provider_arn("oidc.example.com/id/ABC123")
        );
    }

    #[tokio::test]
    async fn test_custom_names_are_used() {
        let ctx = standard_context();
        let mut config = test_config();
        config.policy_name = "staging-forensics-policy".to_owned();
        config.role_name = "staging-forensics-role".to_owned();
        config.namespace = "staging".to_owned();

        let outcome = reconcile_binding(&ctx, &config).await.unwrap();

        assert_eq!(outcome.role_arn, role_arn("staging-forensics-role"));
        assert_eq!(outcome.policy_arn, policy_arn("staging-forensics-policy"));
        assert!(ctx.iam.role("forensics-role").is_none());
    }
}
