//! Galileo OSNMA (Open Service Navigation Message Authentication) engine.
//!
//! This crate implements the cryptographic core of an OSNMA receiver: DSM
//! reassembly, TESLA key-chain validation, and HMAC tag verification against
//! reconstructed navigation data. It does not perform I/NAV page ingestion,
//! read test-vector files, or drive a report sink over the network; callers
//! feed it fully-formed [`Subframe`](subframe::Subframe)s and receive
//! [`AuthAttempt`](report::AuthAttempt) records and [`Event`](report::Event)s
//! in return.
//!
//! The entry point is [`Engine`](engine::Engine).

pub mod bitfields;
pub mod dsm;
pub mod engine;
pub mod gst;
pub mod maclt;
pub mod merkle_tree;
pub mod navdata;
pub mod pubkey;
pub mod report;
pub mod subframe;
pub mod svn;
pub mod tesla;
pub mod types;
pub mod validation;

pub use engine::{Config, Engine};
pub use gst::Gst;
pub use report::{AuthAttempt, Event, Outcome};
pub use svn::Svn;
