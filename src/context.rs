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
use aws_config::{BehaviorVersion, Region, SdkConfig};
use snafu::Snafu;
use tracing::{debug, info};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("could not find region in default profile"))]
    NoRegion,

    #[snafu(display("Kubernetes client error: {}", source))]
    KubeClient { source: kube::Error },

    #[snafu(display("Kubernetes API error: {}", source))]
    Kube { source: kube::Error },
}

/// Clients for the two remote services the binding is reconciled against.
pub struct Context<C, I> {
    pub(crate) cluster: C,
    pub(crate) iam: I,
}

impl<C, I> Context<C, I> {
    pub fn new(cluster: C, iam: I) -> Self {
        Self { cluster, iam }
    }
}

impl Context<aws_sdk_eks::Client, aws_sdk_iam::Client> {
    /// Builds EKS and IAM clients from the ambient AWS configuration, with the
    /// region and profile overrides from `config` applied.
    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        let region = ensure_region(&sdk_config)?;
        info!(%region, "loaded AWS configuration");

        Ok(Self::new(
            aws_sdk_eks::Client::new(&sdk_config),
            aws_sdk_iam::Client::new(&sdk_config),
        ))
    }
}

/// Makes ring the process-wide rustls provider.
///
/// The AWS SDK and kube compile in different rustls providers; with more than
/// one available and no default, rustls panics when kube builds its TLS config.
pub fn install_crypto_provider() {
    // Err means a provider is already installed
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn ensure_region(sdk_config: &SdkConfig) -> Result<String, Error> {
    let region = sdk_config
        .region()
        .map(|region| region.as_ref().to_owned())
        .filter(|region| !region.is_empty());

    match region {
        Some(region) => Ok(region),
        None => {
            debug!("no region in environment, profile or overrides");
            NoRegionSnafu.fail()
        }
    }
}
