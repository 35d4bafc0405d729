//! # dojo-llm
//!
//! The text-generation collaborator boundary for the dojo interview engine.
//!
//! - **Trait**: [`Generator`] — submit a structured request, get back text.
//! - **Provider**: [`GeminiProvider`] — non-streaming `generateContent` over
//!   HTTP with a client-level timeout.
//! - **Errors**: [`GeneratorError`] — transport, API, and empty-response
//!   failures. Callers treat every variant the same way: fall back, never
//!   stall the interview.
//!
//! ## Crate Position
//!
//! Depends on nothing internal. Depended on by dojo-runtime.

#![deny(unsafe_code)]

pub mod gemini;
pub mod generator;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use generator::{GenerateRequest, Generator, GeneratorError};
