//! Terminal output formatting.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use jgq_core::table::cell_text;
use jgq_core::{QuestionState, ResultTable};

/// Narrowest a column is squeezed to before the table is cut.
const MIN_COLUMN_WIDTH: usize = 6;

/// A spinner shown while models and the database are working.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print the fields a request filled in, in workflow order.
pub fn print_question_state(state: &QuestionState) {
    if let Some(route) = state.route {
        println!("{} {}", "Route:".dimmed(), route.to_string().yellow());
    }

    if let Some(refined) = &state.refined_question {
        section("Refined question");
        println!("{}", refined);
    }

    if let Some(cypher) = &state.cypher_query {
        section("Cypher query");
        println!("{}", cypher.cyan());
    }

    if let Some(table) = &state.cypher_result {
        section("Result");
        print_table(table);
    }

    match &state.final_answer {
        Some(answer) => {
            section("Answer");
            println!("{}", answer);
        }
        None => {
            println!();
            println!(
                "{}",
                "The question is not about the structure or the documentation of the code base."
                    .dimmed()
            );
        }
    }
}

fn section(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(50));
}

/// Print a result table sized to the terminal.
pub fn print_table(table: &ResultTable) {
    if table.is_empty() {
        println!("{}", "No results.".dimmed());
        return;
    }

    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    let widths = column_widths(&table.columns, &cells, term_width());

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad_right(&truncate_visual(c, *w), *w))
        .collect();
    println!("{}", header.join("  ").bold());
    println!("{}", "─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad_right(&truncate_visual(cell, *w), *w))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }

    println!();
    println!("{} row(s)", table.len());
}

/// Natural column widths, shrunk evenly from the widest when over `total`.
fn column_widths(columns: &[String], rows: &[Vec<String>], total: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| UnicodeWidthStr::width(c.as_str()))
        .collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let gaps = 2 * widths.len().saturating_sub(1);
    while widths.iter().sum::<usize>() + gaps > total {
        let Some(widest) = widths
            .iter_mut()
            .filter(|w| **w > MIN_COLUMN_WIDTH)
            .max_by_key(|w| **w)
        else {
            break;
        };
        *widest -= 1;
    }
    widths
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}
