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
use crate::config::ProviderSelection;
use crate::reconcile::{
    ClusterNotFoundSnafu, DescribeClusterSnafu, Error, InvalidIssuerSnafu, ListProvidersSnafu,
    MissingIssuerSnafu, NoMatchingProviderSnafu, NoProviderRegisteredSnafu,
};
use crate::types::identity::{ClusterIdentity, issuer_host_path, provider_matches_issuer};
use snafu::futures::TryFutureExt;
use snafu::{OptionExt, ResultExt};
use tracing::{info, warn};

/// Finds the cluster's OIDC issuer and the IAM provider that trusts it.
pub async fn resolve_identity<C, I>(
    cluster: &C,
    iam: &I,
    cluster_name: &str,
    selection: ProviderSelection,
) -> Result<ClusterIdentity, Error>
where
    C: ClusterApi,
    I: IamApi,
{
    let issuer = match cluster.describe_cluster_issuer(cluster_name).await {
        Ok(Some(issuer)) => issuer,
        Ok(None) => return MissingIssuerSnafu { name: cluster_name }.fail(),
        Err(e) if e.is_not_found() => return ClusterNotFoundSnafu { name: cluster_name }.fail(),
        Err(e) => return Err(e).context(DescribeClusterSnafu { name: cluster_name }),
    };

    let issuer_host_path =
        issuer_host_path(&issuer).context(InvalidIssuerSnafu { name: cluster_name })?;
    info!(cluster = cluster_name, issuer = %issuer_host_path, "resolved cluster issuer");

    let providers = iam
        .list_open_id_connect_providers()
        .context(ListProvidersSnafu)
        .await?;
    let provider_arn = select_provider(&providers, &issuer_host_path, selection)?;
    info!(provider = %provider_arn, %selection, "selected OIDC provider");

    Ok(ClusterIdentity {
        issuer_host_path,
        provider_arn,
    })
}

fn select_provider(
    providers: &[String],
    issuer_host_path: &str,
    selection: ProviderSelection,
) -> Result<String, Error> {
    let first = providers.first().context(NoProviderRegisteredSnafu)?;

    match selection {
        ProviderSelection::First => {
            if !provider_matches_issuer(first, issuer_host_path) {
                warn!(
                    provider = %first,
                    issuer = issuer_host_path,
                    "first OIDC provider is not registered for the cluster issuer"
                );
            }
            Ok(first.clone())
        }
        ProviderSelection::IssuerMatch => providers
            .iter()
            .find(|arn| provider_matches_issuer(arn, issuer_host_path))
            .cloned()
            .context(NoMatchingProviderSnafu {
                issuer: issuer_host_path,
            }),
    }
}
