// Library root
// -----------
// This crate exposes a small library surface for the `moltbook` binary.
//
// Module responsibilities:
// - `api`: the Moltbook API facade — one method per remote operation,
//   request building, auth headers, and uniform error mapping.
// - `transport`: the wire seam — a trait over "send one HTTP request" with
//   a blocking reqwest implementation, so the facade can be tested against
//   a mock.
// - `models`: typed domain models for the endpoints with a stable schema.
// - `config`: the credentials file under the per-user config directory.
// - `cli` / `commands`: clap command tree and the dispatcher mapping each
//   subcommand onto exactly one facade call.
// - `output`: highlighted JSON rendering and status lines.
// - `error`: one uniform error type for every failure path.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod transport;
