//! Host provisioning engine.
//!
//! Brings a machine to its configured state from a checked-out repository:
//! installs the modules assigned to the host in `conf/hosts.yaml`, keeps
//! tracked dotfiles in sync with `$HOME`, and deploys user services to
//! launchd or systemd from `conf/services.yaml`.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load and validate the YAML documents under `conf/`
//! - **[`resources`]**: idempotent `check + apply` primitives (files, packages, …)
//! - **[`modules`]**: named installation units wired to resources
//! - **[`services`]** and **[`dotfiles`]**: artifact generation and sync
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod dotfiles;
pub mod download;
pub mod error;
pub mod exec;
pub mod logging;
pub mod modules;
pub mod platform;
pub mod resources;
pub mod services;
