//! `orgmirror config`: view or edit the organization list.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use orgmirror_core::types::OrgName;
use orgmirror_core::Config;

use super::Context;

/// Arguments for `orgmirror config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the current configuration.
    #[arg(long)]
    pub show: bool,

    /// Add an organization.
    #[arg(long, value_name = "ORG")]
    pub add_org: Option<String>,

    /// Remove an organization.
    #[arg(long, value_name = "ORG")]
    pub remove_org: Option<String>,
}

impl ConfigArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let mut config = ctx.load_config()?;
        let mut changed = false;

        if let Some(org) = self.add_org {
            if config.add_organization(OrgName::from(org.as_str())) {
                println!("{}", format!("Added organization: {org}").green());
                changed = true;
            } else {
                println!("{}", format!("Organization already exists: {org}").yellow());
            }
        }

        if let Some(org) = self.remove_org {
            if config.remove_organization(&OrgName::from(org.as_str())) {
                println!("{}", format!("Removed organization: {org}").green());
                changed = true;
            } else {
                println!("{}", format!("Organization not found: {org}").yellow());
            }
        }

        if changed {
            ctx.save_config(&config)?;
        }

        // With no flags at all, showing is the only useful thing to do.
        if self.show || !changed {
            print_config(ctx, &config);
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    setting: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn rows(ctx: &Context, config: &Config) -> Vec<SettingRow> {
    vec![
        SettingRow {
            setting: "Config file",
            value: ctx.config_path().display().to_string(),
        },
        SettingRow {
            setting: "Base path",
            value: config.base_path.display().to_string(),
        },
        SettingRow {
            setting: "Clone protocol",
            value: config.clone_protocol.to_string(),
        },
        SettingRow {
            setting: "Sync interval",
            value: format!("{}s", config.sync_interval),
        },
        SettingRow {
            setting: "Transfer timeout",
            value: format!("{}s", config.transfer_timeout),
        },
        SettingRow {
            setting: "Auto update remotes",
            value: config.auto_update_remotes.to_string(),
        },
        SettingRow {
            setting: "Organizations",
            value: config.organizations.len().to_string(),
        },
    ]
}

fn print_config(ctx: &Context, config: &Config) {
    println!();
    println!("{}", "Configuration".bold());
    let mut table = Table::new(rows(ctx, config));
    table.with(Style::rounded());
    println!("{table}");

    if !config.organizations.is_empty() {
        println!();
        println!("{}", "Organizations:".bold());
        for org in &config.organizations {
            println!("  - {org}");
        }
    }
}
