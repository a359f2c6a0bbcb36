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

use snafu::Snafu;

/// A failed call against one of the remote services, classified by what the
/// reconcilers can do about it.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("{} '{}' already exists", operation, name))]
    AlreadyExists {
        operation: &'static str,
        name: String,
    },

    #[snafu(display("{} '{}' not found", operation, name))]
    NotFound {
        operation: &'static str,
        name: String,
    },

    #[snafu(display("{} failed: {}", operation, message))]
    Service {
        operation: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ApiError::AlreadyExists { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IssuerError {
    #[snafu(display("issuer url '{}' is invalid: {}", issuer, source))]
    InvalidIssuerUrl {
        issuer: String,
        source: http::uri::InvalidUri,
    },

    #[snafu(display("issuer url '{}' has no host", issuer))]
    IssuerWithoutHost { issuer: String },
}
