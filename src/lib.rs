// Library root
// -----------
// This crate exposes the library surface behind the `isi-toolbox` binary,
// which manages quotas and volumes on a OneFS cluster.
//
// Module responsibilities:
// - `api`: HTTP session and quota/namespace calls against the cluster, and
//   the traits the workflows are written against.
// - `model`: quota records and request bodies.
// - `size`: human-readable sizes ("10G") to bytes and back.
// - `table`: the numbered quota table and row selection.
// - `resize`, `audit`: the interactive resize loop and the missing-quota
//   audit.
// - `commands`: maps command line parameters to a `Command` and runs it.
// - `ui`: terminal prompts and screen control.
// - `config`: optional TOML settings file.
pub mod api;
pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod resize;
pub mod size;
pub mod table;
pub mod ui;

#[cfg(test)]
mod testing;
