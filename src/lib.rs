//! # Panen
//!
//! Palm productivity inference server: serves predictions from a
//! pretrained gradient-boosted tree regressor over HTTP.
//!
//! A request carries a batch of land plot records (10 numeric features,
//! 4 categorical text features). Categorical values are mapped to
//! integer codes via vocabularies factorized from a reference dataset
//! at startup, the full feature matrix is assembled in the fixed
//! training column order, and the model returns one rounded prediction
//! per record, in input order.
//!
//! ## Architecture
//!
//! - [`vocab`]: reference dataset ingestion and category factorization
//! - [`encode`]: typed records and fixed-order feature assembly
//! - [`model`]: tree ensemble artifact loading and batch inference
//! - [`service`]: immutable predictor built once at startup
//! - [`api`]: axum routes, status mapping, structured error responses
//! - [`metrics`]: atomic request counters with Prometheus export
//!
//! ## Example
//!
//! ```rust
//! use panen::service::Predictor;
//!
//! let predictor = Predictor::demo().expect("demo predictor builds");
//! assert_eq!(predictor.tree_count(), 2);
//! let predictions = predictor.predict(&[]).expect("empty batch is valid");
//! assert!(predictions.is_empty());
//! ```
//!
//! All shared state (model, vocabularies, column order) is built before
//! the listener binds and never mutated afterwards, so steady-state
//! request handling is lock-free.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // u32 codes -> f32 features is intended
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]

pub mod api;
pub mod encode;
pub mod error;
pub mod metrics;
pub mod model;
pub mod service;
pub mod vocab;

pub use error::{PanenError, Result};

/// Crate version, reported by `/health` and the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
