// ABOUTME: Template catalogue listing for the promptdesk CLI
// ABOUTME: Prints active templates as an aligned table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use promptdesk_server::database_plugins::DatabaseProvider;

/// Print active templates, oldest first
pub async fn list(database: &dyn DatabaseProvider) {
    let templates = database.list_active_templates().await;
    if templates.is_empty() {
        println!("No active templates");
        return;
    }

    println!("{:<6} {:<40} {:<10} Updated", "ID", "Title", "Author");
    for template in templates {
        println!(
            "{:<6} {:<40} {:<10} {}",
            template.id,
            template.title,
            template.created_by,
            template.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}
