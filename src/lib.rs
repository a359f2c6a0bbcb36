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

use crate::config::Config;
use crate::context::Context;
use crate::reconcile::{Error, Outcome, reconcile_binding};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod config;
pub mod context;
pub mod reconcile;
pub mod service_account;
pub mod types;


/// Logs go to stderr; stdout is reserved for the role ARN.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();
}

/// Reconciles the bucket policy, the role and their attachment in the account
/// the ambient AWS configuration points at.
pub async fn run(config: Config) -> Result<Outcome, Error> {
    // Loading the AWS configuration may query instance metadata for the
    // region, so bad input is rejected first. `reconcile_binding` checks again
    // for callers that bring their own context.
    config.validate()?;
    context::install_crypto_provider();

    let ctx = Context::from_config(&config).await?;
    let outcome = reconcile_binding(&ctx, &config).await?;

    if config.annotate_service_account {
        service_account::annotate_service_account(
            &config.namespace,
            &config.service_account,
            &outcome.role_arn,
        )
        .await?;
    }

    info!(
        role = %outcome.role_arn,
        policy = %outcome.policy_arn,
        role_state = %outcome.role,
        attachment = %outcome.attachment,
        "reconciled forensics binding"
    );
    Ok(outcome)
}
