//! # SenML Forwarder
//!
//! Forwards telemetry readings received from a message broker to a remote
//! HTTP endpoint as compacted SenML packs.
//!
//! Records of a batch are grouped by destination. Each group is rewritten
//! around a base record carrying the longest common name prefix, the earliest
//! time and the shared unit, so every reading only carries what differs.
//! Each group is then POSTed to `<remote>/channels/<channel>/<subtopic>`.
//!
//! ## Example
//!
//! ```rust
//! use senml_forwarder::core::{encode_group, Record, Value};
//!
//! let records = vec![
//!     Record::new("45", "temp", "2580", "sensor:t1", 100.0).with_value(Value::Numeric(20.1)),
//!     Record::new("45", "temp", "2580", "sensor:t2", 101.0).with_value(Value::Numeric(20.3)),
//! ];
//! let pack = encode_group(&records);
//! assert_eq!(pack[0].base_name.as_deref(), Some("sensor:"));
//! assert_eq!(pack[1].time, Some(1.0));
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

/// Core data structures, addressing, grouping and the SenML codec
pub mod core;

/// Forwarder configuration
pub mod config;

/// Error types and result definitions
pub mod error;

/// Delivery to the remote endpoint
pub mod forwarder;

/// Liveness and metrics listener
pub mod http;

/// Inbound message decoding
pub mod parsing;

/// Broker subscription
pub mod stream;

// Re-export commonly used types
pub use config::{ForwardMode, ForwarderConfig};
pub use error::{DeliveryError, Error, Result};
pub use forwarder::{HttpForwarder, MessageRepository};
