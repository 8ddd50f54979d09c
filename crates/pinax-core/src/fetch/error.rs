// Copyright 2026 pinax
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

//! Error types for image fetching.

use std::fmt;

/// A per-image fetch failure.
///
/// These errors are tolerated by design: one failing image never aborts its
/// sibling fetches, and nothing propagates to the caller of an attach. The
/// worst outcome is a visually absent image, recoverable by re-provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The reference could not be retrieved at all.
    Request {
        /// The reference that was being fetched.
        reference: String,
        /// Human-readable description of the transport failure.
        detail: String,
    },
    /// The reference was retrieved but its bytes are not a decodable image.
    Decode {
        /// The reference that was being fetched.
        reference: String,
        /// Human-readable description of the decode failure.
        detail: String,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Request { reference, detail } => {
                write!(f, "failed to fetch '{reference}': {detail}")
            }
            FetchError::Decode { reference, detail } => {
                write!(f, "failed to decode image from '{reference}': {detail}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_reference() {
        let err = FetchError::Decode {
            reference: "https://example.com/pin.png".to_string(),
            detail: "not a PNG".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("https://example.com/pin.png"));
        assert!(rendered.contains("not a PNG"));
    }
}
