// ABOUTME: Security helpers shared by the HTTP layer
// ABOUTME: Currently session cookie handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Session cookie parsing and construction
pub mod cookies;
