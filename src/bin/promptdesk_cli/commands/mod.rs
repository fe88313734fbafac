// ABOUTME: Command implementations for the promptdesk CLI
// ABOUTME: One module per subcommand group
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod templates;
pub mod token;
