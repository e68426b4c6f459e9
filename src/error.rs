// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Error types
//!
//! Only configuration problems are errors. Invalid readings, duplicate
//! detections and acknowledge misses are ordinary return values.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration could not be loaded or is not safe to run with
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("`{field}` must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("alarm probability must lie in [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),

    #[error("threshold `{0}` defines no bounds")]
    NoBounds(String),

    #[error("threshold `{key}` has a non-finite bound")]
    NonFiniteBound { key: String },

    #[error("threshold `{key}` bounds out of order: {detail}")]
    BoundOrder { key: String, detail: String },

    #[error("threshold `{0}` mixes rising and dual-bound limits")]
    MixedBounds(String),

    #[error("threshold `{0}` has an incomplete dual-bound set")]
    IncompleteDualBound(String),

    #[error("duplicate threshold key `{0}`")]
    DuplicateThreshold(String),

    #[error("duplicate fault code `{0}`")]
    DuplicateFaultCode(String),

    #[error("fault catalog is empty")]
    EmptyCatalog,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
