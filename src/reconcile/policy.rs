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

use crate::api::IamApi;
use crate::reconcile::{
    CreatePolicySnafu, Error, ListPoliciesSnafu, PolicyNotFoundAfterConflictSnafu,
};
use snafu::futures::TryFutureExt;
use snafu::{OptionExt, ResultExt};
use tracing::info;

/// Creates the access policy, or finds the ARN of the one that already exists
/// under `name`. An existing policy's document is left as it is.
pub async fn ensure_policy<I: IamApi>(
    iam: &I,
    name: &str,
    document: &str,
    description: &str,
) -> Result<String, Error> {
    match iam.create_policy(name, document, description).await {
        Ok(arn) => {
            info!(policy = name, %arn, "created policy");
            Ok(arn)
        }
        Err(e) if e.is_already_exists() => {
            info!(policy = name, "policy already exists, looking up its arn");

            let arn = iam
                .list_local_policies()
                .context(ListPoliciesSnafu)
                .await?
                .into_iter()
                .find(|policy| policy.name == name)
                .map(|policy| policy.arn)
                .context(PolicyNotFoundAfterConflictSnafu { name })?;

            info!(policy = name, %arn, "found existing policy");
            Ok(arn)
        }
        Err(e) => Err(e).context(CreatePolicySnafu { name }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::tests::{FakeIam, policy_arn};

    const NAME: &str = "forensics-policy";

    #[tokio::test]
    async fn test_creates_missing_policy() {
        let iam = FakeIam::default();

        let arn = ensure_policy(&iam, NAME, "{\"doc\":1}", "desc").await.unwrap();

        assert_eq!(arn, policy_arn(NAME));
        assert_eq!(iam.mutations(), 1);
        assert_eq!(iam.policy_document(NAME).as_deref(), Some("{\"doc\":1}"));
        assert_eq!(iam.calls(), vec!["CreatePolicy"]);
    }

    #[tokio::test]
    async fn test_conflict_returns_exactly_named_policy() {
        let iam = FakeIam::default()
            .with_policy("forensics-policy-old", "{}")
            .with_policy("forensics", "{}")
            .with_policy(NAME, "{\"original\":true}")
            .with_policy("z-forensics-policy", "{}");

        let arn = ensure_policy(&iam, NAME, "{\"doc\":2}", "desc").await.unwrap();

        assert_eq!(arn, policy_arn(NAME));
        assert_eq!(iam.mutations(), 0);
        assert_eq!(iam.calls(), vec!["CreatePolicy", "ListPolicies"]);
        // the existing document is not rewritten
        assert_eq!(
            iam.policy_document(NAME).as_deref(),
            Some("{\"original\":true}")
        );
    }

    #[tokio::test]
    async fn test_conflict_without_listed_policy_is_fatal() {
        let iam = FakeIam::default()
            .with_policy(NAME, "{}")
            .hiding_listed_policies();

        let err = ensure_policy(&iam, NAME, "{}", "desc").await.unwrap_err();

        assert!(matches!(err, Error::PolicyNotFoundAfterConflict { ref name } if name == NAME));
    }

    #[tokio::test]
    async fn test_other_create_failure_is_fatal() {
        let iam = FakeIam::default().failing("CreatePolicy");

        let err = ensure_policy(&iam, NAME, "{}", "desc").await.unwrap_err();

        assert!(matches!(err, Error::CreatePolicy { .. }));
        assert_eq!(iam.calls(), vec!["CreatePolicy"], "no lookup after a non-conflict failure");
    }

    #[tokio::test]
    async fn test_listing_failure_after_conflict_is_fatal() {
        let iam = FakeIam::default()
            .with_policy(NAME, "{}")
            .failing("ListPolicies");

        let err = ensure_policy(&iam, NAME, "{}", "desc").await.unwrap_err();

        assert!(matches!(err, Error::ListPolicies { .. }));
    }
}
