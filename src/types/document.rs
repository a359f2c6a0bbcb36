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

//! IAM policy documents rendered by the reconcilers.
//!
//! Both builders are pure: the same input always renders the same bytes, so a
//! document can be rebuilt on every run even though an existing remote policy
//! or role is never updated from it.

use serde::Serialize;
use std::collections::BTreeMap;

pub const POLICY_LANGUAGE_VERSION: &str = "2012-10-17";

const OBJECT_ACTIONS: [&str; 2] = ["s3:PutObject", "s3:GetObject"];
const WEB_IDENTITY_ACTION: &str = "sts:AssumeRoleWithWebIdentity";
const SUBJECT_OPERATOR: &str = "StringEquals";

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<Statement>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    pub effect: Effect,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    pub action: Action,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// operator -> condition key -> expected value
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub condition: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Allow,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub federated: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Action {
    Single(&'static str),
    List(Vec<&'static str>),
}

impl PolicyDocument {
    /// Renders the document the way IAM receives it.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Access policy granting object reads and writes under `bucket_arn`.
///
/// `bucket_arn` is used as a prefix; the resource is `bucket_arn + "*"`.
pub fn policy_document(bucket_arn: &str) -> PolicyDocument {
    PolicyDocument {
        version: POLICY_LANGUAGE_VERSION,
        statement: vec![Statement {
            sid: Some("ForensicsObjectAccess".to_owned()),
            effect: Effect::Allow,
            principal: None,
            action: Action::List(OBJECT_ACTIONS.to_vec()),
            resource: Some(format!("{}*", bucket_arn)),
            condition: BTreeMap::new(),
        }],
    }
}

/// Trust policy letting `namespace/service_account` assume the role through the
/// cluster's OIDC provider.
///
/// `issuer_host_path` must be the issuer without its scheme: IAM compares the
/// condition key `<issuer_host_path>:sub` by exact string.
pub fn trust_document(
    provider_arn: &str,
    issuer_host_path: &str,
    namespace: &str,
    service_account: &str,
) -> PolicyDocument {
    let subject = BTreeMap::from([(
        subject_condition_key(issuer_host_path),
        service_account_subject(namespace, service_account),
    )]);

    PolicyDocument {
        version: POLICY_LANGUAGE_VERSION,
        statement: vec![Statement {
            sid: None,
            effect: Effect::Allow,
            principal: Some(Principal {
                federated: provider_arn.to_owned(),
            }),
            action: Action::Single(WEB_IDENTITY_ACTION),
            resource: None,
            condition: BTreeMap::from([(SUBJECT_OPERATOR.to_owned(), subject)]),
        }],
    }
}

pub fn subject_condition_key(issuer_host_path: &str) -> String {
    format!("{}:sub", issuer_host_path)
}

pub fn service_account_subject(namespace: &str, service_account: &str) -> String {
    format!("system:serviceaccount:{}:{}", namespace, service_account)
}
