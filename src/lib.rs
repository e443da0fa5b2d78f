//! `Herald` - A thin wrapper for writing Discord bots
//!
//! This crate validates bot configuration, forwards an allow-listed set of client
//! events to your handlers, and wraps messaging and presence calls so that network
//! failures come back as logged outcomes instead of errors.
//!
//! ```no_run
//! use herald::{config::BotConfig, discord::DiscordClient, init::{Events, init}};
//! use std::sync::Arc;
//!
//! # async fn run() -> herald::errors::Result<()> {
//! let config = BotConfig {
//!     instant_login: true,
//!     ..BotConfig::with_token("Stan Marsh", "token")
//! };
//! let events = Events::new().on("ready", |bot, _event| async move {
//!     let _ = bot.broadcast_message("I just logged in, 'sup lads!").await;
//! });
//! let client = Arc::new(DiscordClient::new(config.discord.clone()));
//! let bot = init(&config, Some(events), client)?.await;
//! # let _ = bot;
//! # Ok(())
//! # }
//! ```

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    // Documentation - missing docs should be added gradually
    missing_docs,
    unreachable_patterns,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

// Note: `unreachable_patterns` is only a warning because serenity marks some
// model enums `#[non_exhaustive]` and not others.

/// Bot handle - validation, event subscriptions, messaging and presence
pub mod bot;
/// Configuration loading for bot identity and client options
pub mod config;
/// Framework-agnostic client seam, events, entity snapshots and outcomes
pub mod core;
/// Serenity/poise implementation of the client seam
pub mod discord;
/// Unified error types and result handling
pub mod errors;
/// One-call setup from configuration and handlers
pub mod init;

#[cfg(test)]
pub mod test_utils;
