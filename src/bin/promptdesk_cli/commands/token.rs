// ABOUTME: Session token issuing for the promptdesk CLI
// ABOUTME: Runs the same upsert path as an interactive sign-in, owner rule included
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use promptdesk_server::auth::{AuthService, LoginIdentity};
use promptdesk_server::errors::AppResult;

/// Sign in `open_id` and print the token to stdout
pub async fn issue(
    auth: &AuthService,
    open_id: String,
    name: Option<String>,
    email: Option<String>,
) -> AppResult<()> {
    let outcome = auth
        .complete_login(LoginIdentity {
            open_id,
            name,
            email,
            login_method: Some("cli".to_owned()),
        })
        .await?;

    eprintln!(
        "User {} ({}) signed in as {}; token valid for {} hours",
        outcome.user.id,
        outcome.user.open_id,
        outcome.user.role,
        auth.sessions().expiry_seconds() / 3600
    );
    println!("{}", outcome.token);
    Ok(())
}
