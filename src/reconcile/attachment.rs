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
use strum::Display;
use tracing::{error, info};

#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum AttachmentState {
    #[strum(to_string = "Attached")]
    Attached,

    #[strum(to_string = "AlreadyAttached")]
    AlreadyAttached,

    /// The attach call failed. The run still reports the role.
    #[strum(to_string = "Failed: {reason}")]
    Failed { reason: String },
}

impl AttachmentState {
    pub fn is_failed(&self) -> bool {
        matches!(self, AttachmentState::Failed { .. })
    }
}

/// Attaches `policy_arn` to `role_name`. A failure is reported in the returned
/// state and never aborts the run.
pub async fn attach_policy<I: IamApi>(
    iam: &I,
    role_name: &str,
    policy_arn: &str,
) -> AttachmentState {
    match iam.attach_role_policy(role_name, policy_arn).await {
        Ok(()) => {
            info!(role = role_name, policy = policy_arn, "attached policy to role");
            AttachmentState::Attached
        }
        Err(e) => {
            error!(role = role_name, policy = policy_arn, "attach policy failed: {}", e);
            AttachmentState::Failed {
                reason: e.to_string(),
            }
        }
    }
}
