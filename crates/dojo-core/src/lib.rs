//! # dojo-core
//!
//! Foundation types and utilities for the dojo mock-interview engine.
//!
//! This crate provides the shared vocabulary that the other dojo crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::SessionId`] as a newtype over uuid v7
//! - **Config**: [`config::InterviewConfig`] and [`config::ExperienceLevel`]
//! - **Session model**: [`session::Session`], [`session::Message`],
//!   [`session::SessionMetadata`] and the pure metadata merge
//! - **Transcripts**: [`transcript`] — role-prefixed history rendering
//! - **JSON boundary**: [`json`] — fence stripping + strict decode of
//!   untrusted model output
//! - **Constants**: [`constants`] — question cap, history window, retention
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by dojo-llm and dojo-runtime.

#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod ids;
pub mod json;
pub mod session;
pub mod transcript;
