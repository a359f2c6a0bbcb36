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

use clap::builder::NonEmptyStringValueParser;
use clap::{Args, ValueEnum};
use snafu::Snafu;
use strum::Display;

pub const DEFAULT_NAMESPACE: &str = "forensics-system";
pub const DEFAULT_SERVICE_ACCOUNT: &str = "forensics-worker";
pub const DEFAULT_POLICY_NAME: &str = "forensics-policy";
pub const DEFAULT_ROLE_NAME: &str = "forensics-role";
pub const DEFAULT_POLICY_DESCRIPTION: &str = "allows writes to the specified s3 bucket";
pub const DEFAULT_ROLE_DESCRIPTION: &str = "Role for writing forensic data to an s3 bucket";

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{} is not set", field))]
    EmptyField { field: &'static str },
}

/// How the OIDC provider is picked from the account's registered providers.
#[derive(ValueEnum, Default, Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ProviderSelection {
    /// Take the first provider IAM lists
    #[default]
    #[strum(to_string = "first")]
    First,

    /// Take the provider registered for the cluster's issuer
    #[strum(to_string = "issuer-match")]
    IssuerMatch,
}

/// What counts as "already attached" for a role that existed before this run.
#[derive(ValueEnum, Default, Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum AttachmentCheck {
    /// Any attached policy
    #[default]
    #[strum(to_string = "any")]
    Any,

    /// Only the forensics policy itself
    #[strum(to_string = "exact")]
    Exact,
}

#[derive(Args, Clone, Debug)]
pub struct Config {
    /// Arn of the bucket, e.g. arn:aws:s3:::forensics/
    #[arg(long, env = "FORENSICS_BUCKET_ARN", value_parser = NonEmptyStringValueParser::new())]
    pub bucket_arn: String,

    /// Name of the cluster whose workloads assume the role
    #[arg(long, env = "FORENSICS_CLUSTER_NAME", value_parser = NonEmptyStringValueParser::new())]
    pub cluster_name: String,

    /// Service account namespace
    #[arg(long, default_value = DEFAULT_NAMESPACE, value_parser = NonEmptyStringValueParser::new())]
    pub namespace: String,

    /// Service account name
    #[arg(
        long,
        default_value = DEFAULT_SERVICE_ACCOUNT,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub service_account: String,

    /// Name of the IAM policy granting bucket access
    #[arg(
        long,
        default_value = DEFAULT_POLICY_NAME,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub policy_name: String,

    /// Name of the IAM role assumed by the service account
    #[arg(long, default_value = DEFAULT_ROLE_NAME, value_parser = NonEmptyStringValueParser::new())]
    pub role_name: String,

    #[arg(long, hide = true, default_value = DEFAULT_POLICY_DESCRIPTION)]
    pub policy_description: String,

    #[arg(long, hide = true, default_value = DEFAULT_ROLE_DESCRIPTION)]
    pub role_description: String,

    /// AWS region, overriding the default profile
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub region: Option<String>,

    /// AWS shared config profile
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub profile: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub provider_selection: ProviderSelection,

    #[arg(long, value_enum, default_value_t)]
    pub attachment_check: AttachmentCheck,

    /// Annotate the service account with the role ARN once the role is bound
    #[arg(long)]
    pub annotate_service_account: bool,
}

impl Config {
    /// Configuration with every optional setting at its default.
    pub fn new(bucket_arn: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        Self {
            bucket_arn: bucket_arn.into(),
            cluster_name: cluster_name.into(),
            namespace: DEFAULT_NAMESPACE.to_owned(),
            service_account: DEFAULT_SERVICE_ACCOUNT.to_owned(),
            policy_name: DEFAULT_POLICY_NAME.to_owned(),
            role_name: DEFAULT_ROLE_NAME.to_owned(),
            policy_description: DEFAULT_POLICY_DESCRIPTION.to_owned(),
            role_description: DEFAULT_ROLE_DESCRIPTION.to_owned(),
            region: None,
            profile: None,
            provider_selection: ProviderSelection::default(),
            attachment_check: AttachmentCheck::default(),
            annotate_service_account: false,
        }
    }

    /// Rejects empty inputs. Runs before any remote call.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("bucketArn", &self.bucket_arn),
            ("clusterName", &self.cluster_name),
            ("namespace", &self.namespace),
            ("serviceAccount", &self.service_account),
            ("policyName", &self.policy_name),
            ("roleName", &self.role_name),
            ("policyDescription", &self.policy_description),
            ("roleDescription", &self.role_description),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return EmptyFieldSnafu { field }.fail();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn test_defaults_from_command_line() {
        let cli = TestCli::try_parse_from([
            "forensics-iam",
            "--bucket-arn",
            "arn:aws:s3:::forensics/",
            "--cluster-name",
            "prod",
        ])
        .unwrap();

        let config = cli.config;
        assert_eq!(config.bucket_arn, "arn:aws:s3:::forensics/");
        assert_eq!(config.cluster_name, "prod");
        assert_eq!(config.namespace, "forensics-system");
        assert_eq!(config.service_account, "forensics-worker");
        assert_eq!(config.policy_name, "forensics-policy");
        assert_eq!(config.role_name, "forensics-role");
        assert_eq!(config.provider_selection, ProviderSelection::First);
        assert_eq!(config.attachment_check, AttachmentCheck::Any);
        assert!(!config.annotate_service_account);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strategies_from_command_line() {
        let cli = TestCli::try_parse_from([
            "forensics-iam",
            "--bucket-arn",
            "arn:aws:s3:::forensics/",
            "--cluster-name",
            "prod",
            "--provider-selection",
            "issuer-match",
            "--attachment-check",
            "exact",
        ])
        .unwrap();

        assert_eq!(cli.config.provider_selection, ProviderSelection::IssuerMatch);
        assert_eq!(cli.config.attachment_check, AttachmentCheck::Exact);
    }

    #[test]
    fn test_empty_values_rejected_by_parser() {
        let result = TestCli::try_parse_from([
            "forensics-iam",
            "--bucket-arn",
            "",
            "--cluster-name",
            "prod",
        ]);
        assert!(result.is_err(), "empty bucket arn must not parse");
    }

    #[test]
    fn test_validate_reports_first_empty_field() {
        let config = Config::new("", "prod");
        assert_eq!(
            config.validate(),
            Err(Error::EmptyField { field: "bucketArn" })
        );

        let mut config = Config::new("arn:aws:s3:::forensics/", "prod");
        config.service_account = "  ".to_owned();
        assert_eq!(
            config.validate(),
            Err(Error::EmptyField {
                field: "serviceAccount"
            })
        );
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(ProviderSelection::IssuerMatch.to_string(), "issuer-match");
        assert_eq!(AttachmentCheck::Exact.to_string(), "exact");
    }
}
