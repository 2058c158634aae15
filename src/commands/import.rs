//! `keactl import` - print an existing entity as a manifest fragment

use anyhow::{Context as _, Result};
use keakit::Client;
use keakit::reconcile::{
    Lifecycle, OptionDefLifecycle, ReservationLifecycle, ReservationRef, SubnetLifecycle,
};

use crate::Context;
use crate::cli::ImportCommand;
use crate::manifest::{Entry, Manifest};

pub fn run(ctx: &Context, cmd: &ImportCommand) -> Result<()> {
    let client = ctx.client()?;
    let host = ctx.host()?;
    let manifest = import(&client, host, cmd)?;
    print!("{}", manifest.to_toml()?);
    Ok(())
}

/// Read one entity into a single-entry manifest
pub fn import(client: &Client, host: &str, cmd: &ImportCommand) -> Result<Manifest> {
    let mut manifest = Manifest::default();

    match cmd {
        ImportCommand::Subnet { prefix } => {
            let mut state = SubnetLifecycle::new(client, host)?
                .import(prefix)?
                .with_context(|| format!("No subnet {prefix} on {host}"))?;
            state.id = None;
            manifest.subnets.push(Entry::new(state));
        }
        ImportCommand::OptionDef { code, space } => {
            let id = format!("{space}/{code}");
            let state = OptionDefLifecycle::new(client, host)?
                .import(&id)?
                .with_context(|| format!("No option definition {id} on {host}"))?;
            manifest.option_defs.push(Entry::new(state));
        }
        ImportCommand::Reservation { ip, subnet_id } => {
            let lifecycle = ReservationLifecycle::new(client, host)?;
            let state = match subnet_id {
                Some(subnet_id) => lifecycle.read(&ReservationRef {
                    subnet_id: *subnet_id,
                    ip_address: ip.clone(),
                })?,
                None => lifecycle.import(ip)?,
            }
            .with_context(|| format!("No reservation for {ip} on {host}"))?;
            manifest.reservations.push(Entry::new(state));
        }
    }

    Ok(manifest)
}
