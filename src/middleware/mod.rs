// ABOUTME: Request-scoped guards and HTTP layers
// ABOUTME: Authorization checks plus the CORS and tracing layers applied to the router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Authentication, role and ownership checks
pub mod authorization;
/// CORS layer built from configuration
pub mod cors;
/// Request tracing layer
pub mod tracing;

pub use authorization::{
    require_authenticated, require_conversation_access, require_ownership, require_role,
};
