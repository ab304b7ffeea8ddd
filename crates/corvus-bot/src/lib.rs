//! Corvus chat assistant core.
//!
//! This crate provides everything between the messaging platform and the
//! LLM providers:
//!
//! - Environment configuration and process state
//! - The authorization gate (allow-lists, grants, daily quotas)
//! - Thread-message and command handlers
//! - LLM provider clients (Anthropic- and OpenAI-style)
//! - Per-thread conversation state with an explicit lifecycle
//! - The daily usage-reset scheduler
//!
//! The platform itself is consumed through the [`gateway::Gateway`] trait;
//! delivery, slash-command registration, and UI widgets live in whatever
//! adapter embeds this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod access;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod llm;
pub mod scheduler;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::BotError;
pub use state::AppState;
