#![allow(non_shorthand_field_patterns)]
#![doc = "Crate-level error type for configuration, input and output failures."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Remote API failures have their own closed taxonomy in
//! [`ApiError`](crate::ApiError); this type only wraps them when they have to
//! travel through the same channel as local failures, for example in the CLI.

use std::path::{Path, PathBuf};

use crate::normalizer::ApiError;

/// Unified error type returned by the repository list loader, client
/// construction and the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading repository list files.
    #[error("failed to read repository list from {path:?}: {source}")]
    Io {
        /// Location of the repository list file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse repository list: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when user input violates invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps serialization errors when writing reports.
    #[error("failed to serialize report: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps I/O errors that occur while writing reports to the output.
    #[error("failed to write output: {source}")]
    Output {
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Returned when the HTTP client cannot be constructed.
    #[error("client error: {message}")]
    Client {
        /// Human readable message describing the construction failure.
        message: String
    },
    /// Normalized failure reported by the remote API.
    #[error("{source}")]
    Api {
        /// Normalized API error.
        source: ApiError
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a client construction error.
    pub fn client<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Client {
            message: message.into()
        }
    }

    /// Wraps an I/O error raised while writing output.
    pub fn output(source: std::io::Error) -> Self {
        Self::Output {
            source
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<ApiError> for Error {
    fn from(source: ApiError) -> Self {
        Self::Api {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}
