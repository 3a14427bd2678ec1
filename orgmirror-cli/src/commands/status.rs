//! `orgmirror status`: compare local folders with GitHub, read-only.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use orgmirror_core::TracingReporter;
use orgmirror_github::GhCli;
use orgmirror_sync::{pipeline, StatusReport};

use super::{ensure_authenticated, Context};
use crate::console::ConsoleReporter;

/// Arguments for `orgmirror status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// List every misplaced, missing and orphaned repository.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let config = ctx.load_config()?;
        let gh = GhCli::new();
        ensure_authenticated(&gh).await?;

        // JSON output stays clean; progress goes to the log instead.
        let report = if self.json {
            pipeline::status(&config, &gh, &TracingReporter).await?
        } else {
            pipeline::status(&config, &gh, &ConsoleReporter).await?
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&report);
        if self.verbose {
            print_details(&report);
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn rows(report: &StatusReport) -> Vec<MetricRow> {
    let findings = &report.reconciliation;
    let status = if report.in_sync {
        "In Sync".green().to_string()
    } else {
        "Out of Sync".yellow().to_string()
    };
    vec![
        MetricRow {
            metric: "Local repos",
            value: report.local_count.to_string(),
        },
        MetricRow {
            metric: "GitHub repos",
            value: report.remote_count.to_string(),
        },
        MetricRow {
            metric: "Misplaced",
            value: findings.misplaced.len().to_string(),
        },
        MetricRow {
            metric: "Missing locally",
            value: findings.missing.len().to_string(),
        },
        MetricRow {
            metric: "Orphaned locally",
            value: findings.orphaned.len().to_string(),
        },
        MetricRow {
            metric: "Status",
            value: status,
        },
    ]
}

fn print_table(report: &StatusReport) {
    println!();
    println!("{}", "Sync Status".bold());
    let mut table = Table::new(rows(report));
    table.with(Style::rounded());
    println!("{table}");

    if !report.degraded.is_empty() {
        println!(
            "{}",
            format!("Could not list: {}", report.degraded.join(", ")).yellow()
        );
    }
}

fn print_details(report: &StatusReport) {
    let findings = &report.reconciliation;

    if !findings.misplaced.is_empty() {
        println!();
        println!("{}", "Misplaced Repos:".yellow().bold());
        for m in &findings.misplaced {
            println!(
                "  {}: {} -> should be in {}",
                m.name, m.current_org, m.correct_org
            );
        }
    }

    if !findings.missing.is_empty() {
        println!();
        println!("{}", "Missing Locally:".blue().bold());
        for m in &findings.missing {
            println!("  {}/{}", m.org, m.name);
        }
    }

    if !findings.orphaned.is_empty() {
        println!();
        println!("{}", "Orphaned (not on GitHub):".red().bold());
        for o in &findings.orphaned {
            println!("  {}/{}", o.org, o.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use orgmirror_core::types::{OrgName, RepoName};
    use orgmirror_core::{Misplaced, Reconciliation};

    use super::*;

    #[test]
    fn rows_follow_report_counts() {
        let report = StatusReport {
            local_count: 4,
            remote_count: 5,
            in_sync: false,
            reconciliation: Reconciliation {
                misplaced: vec![Misplaced {
                    name: RepoName::from("svc"),
                    current_org: OrgName::from("acme"),
                    correct_org: OrgName::from("other"),
                    local_path: PathBuf::from("/base/acme/svc"),
                }],
                missing: Vec::new(),
                orphaned: Vec::new(),
            },
            degraded: Vec::new(),
        };

        let rows = rows(&report);
        let labels: Vec<&str> = rows.iter().map(|r| r.metric).collect();
        assert_eq!(
            labels,
            [
                "Local repos",
                "GitHub repos",
                "Misplaced",
                "Missing locally",
                "Orphaned locally",
                "Status"
            ]
        );
        assert_eq!(rows[0].value, "4");
        assert_eq!(rows[1].value, "5");
        assert_eq!(rows[2].value, "1");
        assert!(rows[5].value.contains("Out of Sync"));
    }
}
