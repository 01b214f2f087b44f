// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors that can occur when building the API configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API base URL '{0}' cannot be used as a base for endpoint paths")]
    CannotBeABase(String),
}

/// Errors that can occur when fetching episodes from the backend
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    DecodeFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to build endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Episode '{id}' has an invalid {field}: {reason}")]
    InvalidField {
        id: String,
        field: &'static str,
        reason: String,
    },
}

/// Errors raised by playback store actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Episode index {index} is out of range for a queue of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors reported by a media element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("No source is loaded")]
    NoSource,

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Errors raised by the player widget
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("No track is loaded")]
    NoTrack,

    #[error("Media error: {0}")]
    Media(#[from] MediaError),
}

/// Errors that can occur when parsing an interactive command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{value}' is not a valid argument for '{command}'")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

/// Errors raised by page views when acting on their content
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("The {section} section is not available: {reason}")]
    SectionUnavailable {
        section: &'static str,
        reason: String,
    },

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
}
