//! `keactl leases`

use anyhow::Result;
use colored::Colorize;
use keakit::{Lease4, OptionalExt};

use crate::Context;
use crate::cli::LeasesCommand;
use crate::commands::query::print_json;
use crate::ui;

pub fn run(ctx: &Context, cmd: &LeasesCommand) -> Result<()> {
    let client = ctx.client()?;
    let host = ctx.host()?;

    match cmd {
        LeasesCommand::List { subnet_ids } => {
            let filter = (!subnet_ids.is_empty()).then_some(subnet_ids.as_slice());
            let leases = client.lease4_get_all(host, filter).found()?.unwrap_or_default();
            print_leases(&leases);
            Ok(())
        }
        LeasesCommand::Get { ip } => {
            let lease = client.lease4_get(host, ip)?;
            print_json(&lease)
        }
        LeasesCommand::ByHostname { hostname } => {
            let leases = client
                .lease4_get_by_hostname(host, hostname)
                .found()?
                .unwrap_or_default();
            print_leases(&leases);
            Ok(())
        }
        LeasesCommand::ByMac { mac } => {
            let leases = client
                .lease4_get_by_hw_address(host, mac)
                .found()?
                .unwrap_or_default();
            print_leases(&leases);
            Ok(())
        }
        LeasesCommand::Delete { ip } => {
            let text = client.lease4_del(host, ip)?;
            ui::success(&text);
            Ok(())
        }
    }
}

fn lease_state(state: i64) -> &'static str {
    match state {
        0 => "default",
        1 => "declined",
        2 => "expired-reclaimed",
        _ => "unknown",
    }
}

fn print_leases(leases: &[Lease4]) {
    if leases.is_empty() {
        ui::info("No leases found");
        return;
    }
    for lease in leases {
        println!(
            "  {:<16} {:<18} {:>12}  {:<18} {}",
            lease.ip_address,
            lease.hw_address,
            lease.subnet_id,
            lease_state(lease.state),
            lease.hostname.dimmed()
        );
    }
    println!();
    ui::dim(&format!("{} lease(s)", leases.len()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_state_names() {
        assert_eq!(lease_state(0), "default");
        assert_eq!(lease_state(2), "expired-reclaimed");
        assert_eq!(lease_state(7), "unknown");
    }
}
