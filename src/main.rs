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

use clap::Parser;
use forensics_iam::config::Config;
use forensics_iam::{init_tracing, run};
use std::process::ExitCode;
use tracing::{debug, error, warn};

shadow_rs::shadow!(build);

#[derive(Parser)]
#[command(name = "forensics-iam", version = build::PKG_VERSION)]
#[command(
    about = "Binds a Kubernetes service account to an IAM role that can write to a forensics bucket",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    debug!(
        version = build::PKG_VERSION,
        commit = build::SHORT_COMMIT,
        "starting"
    );

    match run(cli.config).await {
        Ok(outcome) => {
            if !outcome.is_complete() {
                warn!(
                    role = %outcome.role_arn,
                    attachment = %outcome.attachment,
                    "role is reported but the policy is not attached"
                );
            }
            println!("{}", outcome.role_arn);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
