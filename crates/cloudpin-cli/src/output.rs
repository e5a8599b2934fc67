//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use cloudpin_sync::RecordSummary;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a note to stderr.
pub fn note(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print summaries as an aligned table.
pub fn table(summaries: &[RecordSummary]) {
    let width = |column: fn(&RecordSummary) -> &str, header: &str| {
        summaries
            .iter()
            .map(|summary| column(summary).chars().count())
            .chain([header.chars().count()])
            .max()
            .unwrap_or_default()
    };
    let id_width = width(|s| s.id.as_str(), "ID");
    let name_width = width(|s| s.name.as_str(), "NAME");
    let category_width = width(|s| s.category.as_str(), "CATEGORY");

    let header = format!(
        "{:id_width$}  {:name_width$}  {:category_width$}  LOCATION",
        "ID", "NAME", "CATEGORY"
    );
    println!("{}", header.bold());

    for summary in summaries {
        println!(
            "{:id_width$}  {:name_width$}  {:category_width$}  {}",
            summary.id.as_str(),
            summary.name,
            summary.category,
            summary.location
        );
    }
}
