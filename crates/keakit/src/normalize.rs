//! Identifier derivation and input validation.
//!
//! Everything here runs before a request is built, so a bad address never
//! reaches the network.

use crate::error::{Error, Result};
use ipnet::Ipv4Net;
use macaddr::MacAddr6;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Derive a subnet ID from a CIDR prefix.
///
/// The network address is taken from before the `/`, its dots are dropped and
/// the remaining digits are read as a number: `192.168.225.0/24` becomes
/// `1921682250` and `10.0.0.0/8` becomes `10000`. Kea subnet IDs are 32-bit,
/// so a digit run that does not fit (e.g. `255.255.255.255`) is rejected.
///
/// Two different prefixes can share an ID (`1.11.1.0` and `11.1.1.0` both
/// give `11110`); the server rejects the second `remote-subnet4-set` in that
/// case.
pub fn subnet_id_from_prefix(prefix: &str) -> Result<u32> {
    let address = prefix.split('/').next().unwrap_or_default();
    let digits: String = address
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect();

    if digits.is_empty() {
        return Err(Error::validation("subnet", format!("`{prefix}` has no network address")));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation(
            "subnet",
            format!("`{prefix}` does not reduce to a numeric id (got `{digits}`)"),
        ));
    }
    digits.parse::<u32>().map_err(|_| {
        Error::validation(
            "subnet",
            format!("id `{digits}` derived from `{prefix}` does not fit in 32 bits"),
        )
    })
}

/// Parse and validate an IPv4 CIDR prefix.
///
/// Host bits must be zero: `192.168.1.0/24` is accepted, `192.168.1.5/24`
/// is not.
pub fn parse_prefix(prefix: &str) -> Result<Ipv4Net> {
    let net = Ipv4Net::from_str(prefix.trim())
        .map_err(|e| Error::validation("subnet", format!("`{prefix}`: {e}")))?;
    if net.addr() != net.network() {
        return Err(Error::validation(
            "subnet",
            format!("`{prefix}` has host bits set, expected {}", net.trunc()),
        ));
    }
    Ok(net)
}

/// Parse an IPv4 address, naming `field` on failure.
pub fn parse_ipv4(field: &str, value: &str) -> Result<Ipv4Addr> {
    Ipv4Addr::from_str(value.trim())
        .map_err(|_| Error::validation(field, format!("`{value}` is not a valid IPv4 address")))
}

/// Normalize a MAC address to lowercase colon-separated form.
///
/// Accepts `:`/`-` separated octets and Cisco dotted form.
pub fn normalize_mac(field: &str, value: &str) -> Result<String> {
    let mac = MacAddr6::from_str(value.trim())
        .map_err(|_| Error::validation(field, format!("`{value}` is not a valid MAC address")))?;
    let octets: Vec<String> = mac.as_bytes().iter().map(|b| format!("{b:02x}")).collect();
    Ok(octets.join(":"))
}
