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

use crate::context::{Error, KubeClientSnafu, KubeSnafu, install_crypto_provider};
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::api::{Api, Patch, PatchParams};
use snafu::ResultExt;
use snafu::futures::TryFutureExt;
use std::collections::BTreeMap;
use tracing::info;

/// Annotation EKS reads to inject web identity credentials into pods.
pub const ROLE_ARN_ANNOTATION: &str = "eks.amazonaws.com/role-arn";

const FIELD_MANAGER: &str = "forensics-iam";

pub fn new_service_account(namespace: &str, name: &str, role_arn: &str) -> corev1::ServiceAccount {
    corev1::ServiceAccount {
        metadata: metav1::ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            annotations: Some(BTreeMap::from([(
                ROLE_ARN_ANNOTATION.to_owned(),
                role_arn.to_owned(),
            )])),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn new_client(config: kube::Config) -> Result<kube::Client, Error> {
    install_crypto_provider();
    kube::Client::try_from(config).context(KubeClientSnafu)
}

/// Server-side applies the role annotation onto the service account, creating
/// the account if it does not exist yet.
pub async fn annotate_service_account(
    namespace: &str,
    name: &str,
    role_arn: &str,
) -> Result<corev1::ServiceAccount, Error> {
    let config = kube::Config::infer()
        .await
        .map_err(kube::Error::InferConfig)
        .context(KubeClientSnafu)?;
    let client = new_client(config)?;
    let api: Api<corev1::ServiceAccount> = Api::namespaced(client, namespace);

    let service_account = api
        .patch(
            name,
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Apply(&new_service_account(namespace, name, role_arn)),
        )
        .context(KubeSnafu)
        .await?;

    info!(namespace, service_account = name, role = role_arn, "annotated service account");
    Ok(service_account)
}
