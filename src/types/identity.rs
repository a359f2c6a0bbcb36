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

use crate::types::error::{InvalidIssuerUrlSnafu, IssuerError, IssuerWithoutHostSnafu};
use http::Uri;
use snafu::{OptionExt, ResultExt};

const OIDC_PROVIDER_MARKER: &str = ":oidc-provider/";

/// The cluster's OIDC issuer paired with the IAM provider that trusts it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterIdentity {
    /// Issuer host (and port, if any) plus path, without the scheme.
    pub issuer_host_path: String,
    pub provider_arn: String,
}

/// Name and ARN of a managed policy, either listed or attached to a role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicySummary {
    pub name: String,
    pub arn: String,
}

impl PolicySummary {
    pub fn new(name: impl Into<String>, arn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arn: arn.into(),
        }
    }
}

/// Strips the scheme from an issuer url.
///
/// `https://oidc.example.com/id/ABC123` becomes `oidc.example.com/id/ABC123`.
pub fn issuer_host_path(issuer: &str) -> Result<String, IssuerError> {
    let uri: Uri = issuer
        .parse()
        .context(InvalidIssuerUrlSnafu { issuer })?;

    let authority = uri
        .authority()
        .context(IssuerWithoutHostSnafu { issuer })?;

    let mut host_path = authority.host().to_owned();
    if let Some(port) = authority.port_u16() {
        host_path.push_str(&format!(":{}", port));
    }

    // `Uri::path` reports "/" for an absent path
    match uri.path() {
        "/" => {}
        path => host_path.push_str(path),
    }

    Ok(host_path)
}

/// Whether an OIDC provider ARN was registered for `issuer_host_path`.
///
/// Provider ARNs have the form `arn:aws:iam::<account>:oidc-provider/<host/path>`.
pub fn provider_matches_issuer(provider_arn: &str, issuer_host_path: &str) -> bool {
    provider_arn
        .split_once(OIDC_PROVIDER_MARKER)
        .is_some_and(|(_, registered)| registered == issuer_host_path)
}
