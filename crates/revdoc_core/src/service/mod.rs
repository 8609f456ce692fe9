//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep CLI callers decoupled from storage details.

pub mod document_service;
pub mod walkthrough;
