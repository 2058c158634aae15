// Manifest-driven commands
pub mod apply;
pub mod import;
pub mod plan;

// Ad-hoc queries
pub mod leases;
pub mod query;
