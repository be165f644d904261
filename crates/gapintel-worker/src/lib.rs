//! Contract with the external analysis worker.
//!
//! The worker is opaque: it picks up `pending` rows and writes status and
//! `report_data` back to the database on its own. This crate only pings its
//! health endpoint to keep it warm and watches report status until a run
//! finishes.

pub mod client;
pub mod error;
pub mod poller;
pub mod source;

pub use client::{WorkerClient, WorkerHealth};
pub use error::WorkerError;
pub use poller::{spawn_status_poller, PollerConfig};
pub use source::{DbStatusSource, StatusSnapshot, StatusSource};
