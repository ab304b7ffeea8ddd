//! Core types for the corvus chat assistant.
//!
//! This crate provides the domain types shared by the storage and bot
//! crates:
//!
//! - **Privileges**: [`Privilege`] — the named capability flags grantable
//!   per user (`advanced`, `blocked`)
//! - **Conversation**: [`ChatMessage`], [`ChatHistory`] — the role/content
//!   message model rendered for the LLM providers
//! - **Model parameters**: [`ModelParams`], [`ProviderKind`] — validated
//!   generation parameters, tagged by provider
//! - **Responses**: [`ResponseResult`], [`split_into_chunks`] — generation
//!   outcomes and outbound message chunking

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod chat;
pub mod params;
pub mod privilege;
pub mod response;

pub use chat::{ChatHistory, ChatMessage, WireMessage, ROLE_ASSISTANT, ROLE_DEVELOPER, ROLE_USER};
pub use params::{ModelParams, ParamsError, ProviderKind};
pub use privilege::{Privilege, PrivilegeParseError};
pub use response::{split_into_chunks, ResponseResult, ResponseStatus};
