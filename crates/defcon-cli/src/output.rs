use anyhow::Result;
use colored::{ColoredString, Colorize};
use defcon_storage::{Component, Plugin};
use defcon_sync::{ActionKind, ChangeSet, Progress, SyncAction, SyncReport};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn styled_action(action: &SyncAction) -> ColoredString {
    let line = action.to_string();
    match action.kind() {
        ActionKind::Created => line.green(),
        ActionKind::Updated => line.yellow(),
        ActionKind::Unchanged => line.dimmed(),
        ActionKind::Removed => line.red(),
    }
}

/// Prints each action to stdout as the run reports it.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn report(&mut self, action: &SyncAction) {
        println!("{}", styled_action(action));
    }
}

fn total(report: &SyncReport, count: impl Fn(&ChangeSet) -> usize) -> usize {
    [&report.plugins, &report.components, &report.plugin_instances]
        .into_iter()
        .map(count)
        .sum()
}

pub fn summary_line(report: &SyncReport) -> String {
    format!(
        "{} created, {} updated, {} unchanged, {} removed",
        total(report, |s| s.created.len()),
        total(report, |s| s.updated.len()),
        total(report, |s| s.unchanged.len()),
        total(report, |s| s.removed.len()),
    )
}

pub fn print_summary(report: &SyncReport) {
    if report.has_changes() {
        print_success(&summary_line(report));
    } else {
        print_success(&format!("Already up to date ({})", summary_line(report)));
    }
}

pub fn print_components(rows: &[(Component, Vec<String>)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value: Vec<serde_json::Value> = rows
                .iter()
                .map(|(component, plugins)| {
                    serde_json::json!({
                        "id": component.id,
                        "name": component.name,
                        "attributes": component.attributes,
                        "plugins": plugins,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No components found.");
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Name", "Plugins"]);
            for (component, plugins) in rows {
                builder.push_record([
                    component.id.clone(),
                    component.name.clone(),
                    plugins.join(", "),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            println!("Total: {}", rows.len());
        }
    }
    Ok(())
}

pub fn print_plugins(plugins: &[Plugin], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(plugins)?);
        }
        OutputFormat::Table => {
            if plugins.is_empty() {
                println!("No plugins found.");
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Name", "Description"]);
            for plugin in plugins {
                builder.push_record([
                    plugin.id.as_str(),
                    plugin.name.as_str(),
                    plugin.description.as_deref().unwrap_or("-"),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            println!("Total: {}", plugins.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use defcon_storage::UpsertOutcome;

    #[test]
    fn test_styled_action_keeps_text() {
        let action = SyncAction::ComponentRemoved { id: "legacy".into() };
        assert!(styled_action(&action).to_string().contains("Removed legacy"));

        let action = SyncAction::Plugin {
            outcome: UpsertOutcome::Created,
            id: "static".into(),
        };
        assert!(
            styled_action(&action)
                .to_string()
                .contains("Created plugin static")
        );
    }

    #[test]
    fn test_summary_line_counts_all_sections() {
        let mut report = SyncReport::default();
        report.plugins.created.push("static".into());
        report.components.created.push("api".into());
        report.components.unchanged.push("web".into());
        report.plugin_instances.updated.push("api:static".into());
        report.components.removed.push("legacy".into());

        assert_eq!(
            summary_line(&report),
            "2 created, 1 updated, 1 unchanged, 1 removed"
        );
    }
}
