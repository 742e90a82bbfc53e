//! Static listings: the example bank and the model catalog.

use colored::Colorize;

use jgq_core::example_bank::QUERY_EXAMPLES;
use jgq_core::models::model_catalog;
use jgq_core::{AppConfig, Role};

pub fn cmd_examples() {
    println!("{}", "Query examples".bold());
    println!("{}", "─".repeat(50));
    for example in QUERY_EXAMPLES {
        println!("{} {}", "#".dimmed(), example.question.cyan());
        println!("{}", example.cypher);
        println!();
    }
}

pub fn cmd_models(config: &AppConfig) {
    println!("{}", "Available models".bold());
    println!("{}", "─".repeat(50));
    for model in model_catalog() {
        println!("  {:<45} {}", model.to_string(), model.label().dimmed());
    }

    println!();
    println!("{}", "Configured".bold());
    for role in Role::ALL {
        println!("  {:<8} {}", role.as_str(), config.models.get(role).to_string().green());
    }
}
