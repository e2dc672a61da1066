// Library root
// -----------
// This crate exposes the catalog client used by the CLI. The binary
// (`main.rs`) parses arguments and hands a bootstrapped client to `ui`.
//
// Module responsibilities:
// - `api`: token-bearing JSON transport (verb selection, header merge,
//   query serialization, path prefixing, body decoding).
// - `asset`: credential-free fetch of signed asset URLs and persistence.
// - `session`: endpoint bases discovered by the bootstrap call.
// - `models`: typed entities mapped from API payloads.
// - `client`: the operations a caller uses, built on the modules above.
// - `config` / `error`: environment configuration and error types.
// - `ui`: terminal flows (interactive menu and printers).
pub mod api;
pub mod asset;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod ui;

pub use client::Blasphemy;
pub use config::Config;
pub use error::{ApiError, SchemaError};
