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

//! Remote services the reconcilers talk to.
//!
//! The reconcilers only see [`ClusterApi`] and [`IamApi`]; the AWS SDK clients
//! implement them below and every SDK failure is classified into an
//! [`ApiError`] on the way out.

use crate::types::error::ApiError;
use crate::types::identity::PolicySummary;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_iam::types::PolicyScopeType;
use std::future::Future;

const IAM_ALREADY_EXISTS: &str = "EntityAlreadyExists";
const IAM_NO_SUCH_ENTITY: &str = "NoSuchEntity";
const EKS_NOT_FOUND: &str = "ResourceNotFoundException";

/// Cluster metadata service.
pub trait ClusterApi {
    /// OIDC issuer url of the named cluster, `None` if the cluster has no
    /// identity metadata.
    fn describe_cluster_issuer(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, ApiError>> + Send;
}

/// Identity and access service.
pub trait IamApi {
    /// ARNs of every OIDC provider registered in the account, in service order.
    fn list_open_id_connect_providers(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;

    /// Creates a managed policy and returns its ARN.
    fn create_policy(
        &self,
        name: &str,
        document: &str,
        description: &str,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Every customer managed policy in the account.
    fn list_local_policies(
        &self,
    ) -> impl Future<Output = Result<Vec<PolicySummary>, ApiError>> + Send;

    /// Creates a role and returns its ARN.
    fn create_role(
        &self,
        name: &str,
        trust_document: &str,
        description: &str,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// ARN of an existing role.
    fn get_role(&self, name: &str) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn list_attached_role_policies(
        &self,
        role_name: &str,
    ) -> impl Future<Output = Result<Vec<PolicySummary>, ApiError>> + Send;

    fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Maps an SDK failure onto the conflict/absence distinction the reconcilers
/// act on. Everything else is carried as an opaque service failure.
fn classify<E, R>(operation: &'static str, name: &str, err: SdkError<E, R>) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some(IAM_ALREADY_EXISTS) => ApiError::AlreadyExists {
            operation,
            name: name.to_owned(),
        },
        Some(IAM_NO_SUCH_ENTITY) | Some(EKS_NOT_FOUND) => ApiError::NotFound {
            operation,
            name: name.to_owned(),
        },
        _ => ApiError::Service {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

fn missing(operation: &'static str, field: &str) -> ApiError {
    ApiError::Service {
        operation,
        message: format!("response has no {}", field),
    }
}

impl ClusterApi for aws_sdk_eks::Client {
    async fn describe_cluster_issuer(&self, name: &str) -> Result<Option<String>, ApiError> {
        let output = self
            .describe_cluster()
            .name(name)
            .send()
            .await
            .map_err(|e| classify("DescribeCluster", name, e))?;

        Ok(output
            .cluster()
            .and_then(|cluster| cluster.identity())
            .and_then(|identity| identity.oidc())
            .and_then(|oidc| oidc.issuer())
            .map(str::to_owned))
    }
}

impl IamApi for aws_sdk_iam::Client {
    async fn list_open_id_connect_providers(&self) -> Result<Vec<String>, ApiError> {
        let output = self
            .list_open_id_connect_providers()
            .send()
            .await
            .map_err(|e| classify("ListOpenIDConnectProviders", "", e))?;

        Ok(output
            .open_id_connect_provider_list()
            .iter()
            .filter_map(|provider| provider.arn())
            .map(str::to_owned)
            .collect())
    }

    async fn create_policy(
        &self,
        name: &str,
        document: &str,
        description: &str,
    ) -> Result<String, ApiError> {
        let output = self
            .create_policy()
            .policy_name(name)
            .policy_document(document)
            .description(description)
            .send()
            .await
            .map_err(|e| classify("CreatePolicy", name, e))?;

        output
            .policy()
            .and_then(|policy| policy.arn())
            .map(str::to_owned)
            .ok_or_else(|| missing("CreatePolicy", "policy arn"))
    }

    async fn list_local_policies(&self) -> Result<Vec<PolicySummary>, ApiError> {
        let policies = self
            .list_policies()
            .scope(PolicyScopeType::Local)
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| classify("ListPolicies", "Local", e))?;

        Ok(policies
            .iter()
            .filter_map(|policy| match (policy.policy_name(), policy.arn()) {
                (Some(name), Some(arn)) => Some(PolicySummary::new(name, arn)),
                _ => None,
            })
            .collect())
    }

    async fn create_role(
        &self,
        name: &str,
        trust_document: &str,
        description: &str,
    ) -> Result<String, ApiError> {
        let output = self
            .create_role()
            .role_name(name)
            .assume_role_policy_document(trust_document)
            .description(description)
            .send()
            .await
            .map_err(|e| classify("CreateRole", name, e))?;

        output
            .role()
            .map(|role| role.arn().to_owned())
            .ok_or_else(|| missing("CreateRole", "role"))
    }

    async fn get_role(&self, name: &str) -> Result<String, ApiError> {
        let output = self
            .get_role()
            .role_name(name)
            .send()
            .await
            .map_err(|e| classify("GetRole", name, e))?;

        output
            .role()
            .map(|role| role.arn().to_owned())
            .ok_or_else(|| missing("GetRole", "role"))
    }

    async fn list_attached_role_policies(
        &self,
        role_name: &str,
    ) -> Result<Vec<PolicySummary>, ApiError> {
        let attached = self
            .list_attached_role_policies()
            .role_name(role_name)
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| classify("ListAttachedRolePolicies", role_name, e))?;

        Ok(attached
            .iter()
            .filter_map(|policy| match (policy.policy_name(), policy.policy_arn()) {
                (Some(name), Some(arn)) => Some(PolicySummary::new(name, arn)),
                _ => None,
            })
            .collect())
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), ApiError> {
        self.attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| classify("AttachRolePolicy", role_name, e))?;
        Ok(())
    }
}
