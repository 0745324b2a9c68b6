//! Types and traits for recording training metrics.
//!
//! The [`Trainer`](crate::Trainer) stores one [`Record`] per episode into an
//! [`AggregateRecorder`] and flushes it periodically.
//!
//! ```rust
//! use tabrl_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(3.0));
//! record.insert("episode_return", RecordValue::Scalar(-1.0));
//! assert_eq!(record.get_scalar("episode").unwrap(), 3.0);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::AggregateRecorder;
pub use storage::RecordStorage;
