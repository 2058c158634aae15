use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keactl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative management of Kea DHCPv4 configuration backends", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: ~/.config/keactl/config.toml)
    #[arg(long, global = true, env = "KEACTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kea control agent host
    #[arg(long, global = true, env = "KEA_HOSTNAME")]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan(PlanArgs),

    /// Make the servers match the manifest
    Apply(ApplyArgs),

    /// Remove everything the manifest declares
    Destroy(DestroyArgs),

    /// Print an existing entity as a manifest fragment
    #[command(subcommand)]
    Import(ImportCommand),

    /// Query subnets
    #[command(subcommand)]
    Subnets(SubnetsCommand),

    /// Query option definitions
    #[command(subcommand)]
    OptionDefs(OptionDefsCommand),

    /// Query host reservations
    #[command(subcommand)]
    Reservations(ReservationsCommand),

    /// Query and delete leases
    #[command(subcommand)]
    Leases(LeasesCommand),

    /// Show the HA heartbeat of a server
    Heartbeat,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Manifest Commands
// ============================================================================

#[derive(Args)]
pub struct ManifestArgs {
    /// Manifest file
    #[arg(short, long, default_value = "keactl.toml")]
    pub manifest: PathBuf,

    /// Only act on KIND or KIND.NAME (e.g. subnets, subnet.10.0.0.0/8)
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Show the plan without applying it
    #[arg(short, long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel requests
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Args)]
pub struct DestroyArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

// ============================================================================
// Import
// ============================================================================

#[derive(Subcommand)]
pub enum ImportCommand {
    /// Import a subnet by CIDR prefix
    Subnet {
        /// Prefix, e.g. 192.168.1.0/24
        prefix: String,
    },

    /// Import an option definition by code
    OptionDef {
        /// Option code
        code: u16,

        /// Option space
        #[arg(long, default_value = "dhcp4")]
        space: String,
    },

    /// Import a reservation by address
    Reservation {
        /// Reserved address
        ip: String,

        /// Owning subnet (looked up from the address when omitted)
        #[arg(long)]
        subnet_id: Option<u32>,
    },
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Subcommand)]
pub enum SubnetsCommand {
    /// List all subnets
    List,

    /// Show one subnet
    Get(SubnetSelector),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct SubnetSelector {
    /// Look up by CIDR prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Look up by subnet ID
    #[arg(long)]
    pub id: Option<u32>,
}

#[derive(Subcommand)]
pub enum OptionDefsCommand {
    /// Show one option definition
    Get {
        /// Option code
        code: u16,

        /// Option space
        #[arg(long, default_value = "dhcp4")]
        space: String,
    },
}

#[derive(Subcommand)]
pub enum ReservationsCommand {
    /// List reservations in a subnet
    List {
        /// Subnet ID
        #[arg(long)]
        subnet_id: u32,
    },

    /// Show one reservation
    Get {
        /// Reserved address
        ip: String,

        /// Subnet ID
        #[arg(long)]
        subnet_id: u32,
    },
}

#[derive(Subcommand)]
pub enum LeasesCommand {
    /// List leases, optionally restricted to subnets
    List {
        /// Subnet IDs (repeatable)
        #[arg(long = "subnet-id")]
        subnet_ids: Vec<u32>,
    },

    /// Show the lease for an address
    Get {
        /// Leased address
        ip: String,
    },

    /// Find leases by client hostname
    ByHostname {
        /// Client hostname
        hostname: String,
    },

    /// Find leases by hardware address
    ByMac {
        /// Hardware address
        mac: String,
    },

    /// Delete the lease for an address
    Delete {
        /// Leased address
        ip: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "keactl", "--host", "kea1", "apply", "--yes", "--jobs", "8", "-t", "subnets",
        ])
        .unwrap();
        assert_eq!(cli.host.as_deref(), Some("kea1"));
        match cli.command {
            Command::Apply(args) => {
                assert!(args.yes);
                assert_eq!(args.jobs, 8);
                assert_eq!(args.manifest.target.as_deref(), Some("subnets"));
                assert_eq!(args.manifest.manifest, PathBuf::from("keactl.toml"));
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_subnet_selector_requires_one() {
        assert!(Cli::try_parse_from(["keactl", "subnets", "get"]).is_err());
        assert!(
            Cli::try_parse_from(["keactl", "subnets", "get", "--prefix", "a", "--id", "1"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["keactl", "subnets", "get", "--id", "10000"]).is_ok());
    }

    #[test]
    fn test_lease_subnet_ids_repeat() {
        let cli = Cli::try_parse_from([
            "keactl", "leases", "list", "--subnet-id", "1", "--subnet-id", "2",
        ])
        .unwrap();
        match cli.command {
            Command::Leases(LeasesCommand::List { subnet_ids }) => {
                assert_eq!(subnet_ids, vec![1, 2]);
            }
            _ => panic!("expected leases list"),
        }
    }
}
