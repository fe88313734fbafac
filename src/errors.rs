// ABOUTME: Error types for the promptdesk server, re-exported from the foundation crate
// ABOUTME: Keeps `crate::errors::*` paths stable for handlers, services and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Unified error handling
//!
//! The taxonomy lives in `promptdesk-core` so that record types and errors are
//! shared with any future client crate; the HTTP mapping is enabled through
//! its `http-response` feature.

pub use promptdesk_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
