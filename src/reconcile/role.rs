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
use crate::config::AttachmentCheck;
use crate::reconcile::{CreateRoleSnafu, Error, GetRoleSnafu, ListAttachedPoliciesSnafu};
use crate::types::identity::PolicySummary;
use snafu::ResultExt;
use snafu::futures::TryFutureExt;
use strum::Display;
use tracing::info;

/// Where the role stood when this run reached it.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum RoleState {
    #[strum(to_string = "Created")]
    Created,

    /// The role exists but a previous run stopped before attaching the policy.
    #[strum(to_string = "ExistingUnattached")]
    ExistingUnattached,

    #[strum(to_string = "ExistingAttached")]
    ExistingAttached,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnsuredRole {
    pub arn: String,
    pub state: RoleState,
}

impl EnsuredRole {
    pub fn needs_attachment(&self) -> bool {
        !matches!(self.state, RoleState::ExistingAttached)
    }
}

impl AttachmentCheck {
    pub fn satisfied_by(self, attached: &[PolicySummary], policy_arn: &str) -> bool {
        match self {
            AttachmentCheck::Any => !attached.is_empty(),
            AttachmentCheck::Exact => attached.iter().any(|policy| policy.arn == policy_arn),
        }
    }
}

/// Creates the role with `trust_document`, or inspects the existing one.
///
/// A new role has nothing attached. For an existing role the attached policies
/// decide whether the caller still has to attach `policy_arn`; its trust
/// document is not compared or updated.
pub async fn ensure_role<I: IamApi>(
    iam: &I,
    name: &str,
    trust_document: &str,
    description: &str,
    check: AttachmentCheck,
    policy_arn: &str,
) -> Result<EnsuredRole, Error> {
    let err = match iam.create_role(name, trust_document, description).await {
        Ok(arn) => {
            info!(role = name, %arn, "created role");
            return Ok(EnsuredRole {
                arn,
                state: RoleState::Created,
            });
        }
        Err(e) if e.is_already_exists() => e,
        Err(e) => return Err(e).context(CreateRoleSnafu { name }),
    };
    info!(role = name, "{}", err);

    let attached = iam
        .list_attached_role_policies(name)
        .context(ListAttachedPoliciesSnafu { role: name })
        .await?;

    let state = if check.satisfied_by(&attached, policy_arn) {
        RoleState::ExistingAttached
    } else {
        info!(role = name, attached = attached.len(), %check, "policy not attached to role");
        RoleState::ExistingUnattached
    };

    let arn = iam.get_role(name).context(GetRoleSnafu { name }).await?;
    info!(role = name, %arn, %state, "found existing role");

    Ok(EnsuredRole { arn, state })
}
