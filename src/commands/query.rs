//! One-shot lookups: `keactl subnets`, `option-defs`, `reservations`, `heartbeat`

use anyhow::{Context as _, Result};
use colored::Colorize;
use keakit::{OptionalExt, Subnet4Summary};
use serde::Serialize;

use crate::Context;
use crate::cli::{OptionDefsCommand, ReservationsCommand, SubnetsCommand};
use crate::ui;

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not render result")?;
    println!("{text}");
    Ok(())
}

pub fn subnets(ctx: &Context, cmd: &SubnetsCommand) -> Result<()> {
    let client = ctx.client()?;
    let host = ctx.host()?;

    match cmd {
        SubnetsCommand::List => {
            let subnets = client.remote_subnet4_list(host).found()?.unwrap_or_default();
            if subnets.is_empty() {
                ui::info(&format!("No subnets on {host}"));
                return Ok(());
            }
            ui::header(&format!("Subnets on {host}"));
            for subnet in &subnets {
                println!("{}", subnet_row(subnet));
            }
            println!();
            ui::dim(&format!("{} subnet(s)", subnets.len()));
            Ok(())
        }
        SubnetsCommand::Get(selector) => {
            let subnet = match (&selector.prefix, selector.id) {
                (Some(prefix), _) => client.remote_subnet4_get_by_prefix(host, prefix)?,
                (None, Some(id)) => client.remote_subnet4_get_by_id(host, id)?,
                (None, None) => anyhow::bail!("Pass --prefix or --id"),
            };
            print_json(&subnet)
        }
    }
}

fn subnet_row(subnet: &Subnet4Summary) -> String {
    let mut row = format!("  {:>12}  {:<20}", subnet.id, subnet.subnet);
    if let Some(network) = subnet.shared_network_name.as_deref().filter(|n| !n.is_empty()) {
        row.push_str(&format!("  network={network}"));
    }
    if !subnet.metadata.server_tags.is_empty() {
        row.push_str(&format!(
            "  {}",
            format!("[{}]", subnet.metadata.server_tags.join(", ")).dimmed()
        ));
    }
    row
}

pub fn option_defs(ctx: &Context, cmd: &OptionDefsCommand) -> Result<()> {
    let client = ctx.client()?;
    let host = ctx.host()?;

    match cmd {
        OptionDefsCommand::Get { code, space } => {
            let def = client.remote_option_def4_get(host, space, *code)?;
            print_json(&def)
        }
    }
}

pub fn reservations(ctx: &Context, cmd: &ReservationsCommand) -> Result<()> {
    let client = ctx.client()?;
    let host = ctx.host()?;

    match cmd {
        ReservationsCommand::List { subnet_id } => {
            let hosts = client
                .reservation_get_all(host, *subnet_id)
                .found()?
                .unwrap_or_default();
            if hosts.is_empty() {
                ui::info(&format!("No reservations in subnet {subnet_id}"));
                return Ok(());
            }
            ui::header(&format!("Reservations in subnet {subnet_id}"));
            for r in &hosts {
                println!(
                    "  {:<16} {:<18} {}",
                    r.ip_address,
                    r.hw_address,
                    r.hostname.dimmed()
                );
            }
            Ok(())
        }
        ReservationsCommand::Get { ip, subnet_id } => {
            let reservation = client.reservation_get(host, *subnet_id, ip)?;
            print_json(&reservation)
        }
    }
}

pub fn heartbeat(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let host = ctx.host()?;
    let beat = client.ha_heartbeat(host)?;

    ui::header(&format!("HA heartbeat: {host}"));
    ui::kv("state", &beat.state);
    ui::kv("date-time", &beat.date_time);
    ui::kv("scopes", &beat.scopes.join(", "));
    ui::kv("unsent updates", &beat.unsent_update_count.to_string());
    Ok(())
}
