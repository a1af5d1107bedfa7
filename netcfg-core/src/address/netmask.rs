//! IPv4/IPv6 value construction with the config-file netmask conventions.
//!
//! Device configs write masks three ways: a prefix length (`/24`), a netmask
//! (`255.255.255.0`) or a wildcard/host mask (`0.0.0.255`). They also use
//! `A 0.0.0.0` for a single host, which the standard reading would turn into
//! `0.0.0.0/0`. [`network_from_mask`] reads `A 0.0.0.0` as `A/32` unless the
//! address itself is `0.0.0.0`, so the default-route idiom keeps meaning
//! `0.0.0.0/0`.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;

/// Maximum IPv4 prefix length.
pub const MAX_V4_LENGTH: u8 = 32;
/// Maximum IPv6 prefix length.
pub const MAX_V6_LENGTH: u8 = 128;

/// Reasons a literal fails validation. Rendered into [`crate::span::Validity`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("expected 4 octets in {0:?}")]
    Ipv4Shape(String),
    #[error("octet {octet} (> 255) not permitted in {text:?}")]
    OctetRange { octet: String, text: String },
    #[error("leading zeros are not permitted in {text:?}")]
    LeadingZero { text: String },
    #[error("{0:?} is not a valid netmask")]
    Netmask(String),
    #[error("{0:?} is not a valid prefix length")]
    Prefix(String),
    #[error("{0} has host bits set")]
    HostBits(String),
    #[error("{0:?} does not appear to be an IPv6 address")]
    Ipv6(String),
}

/// Parse a dotted quad, rejecting out-of-range octets and leading zeros.
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr, AddressError> {
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 4 {
        return Err(AddressError::Ipv4Shape(text.to_string()));
    }

    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::Ipv4Shape(text.to_string()));
        }
        let out_of_range = || AddressError::OctetRange {
            octet: part.to_string(),
            text: text.to_string(),
        };
        if part.len() > 3 {
            return Err(out_of_range());
        }
        if part.len() > 1 && part.starts_with('0') {
            return Err(AddressError::LeadingZero {
                text: text.to_string(),
            });
        }
        let value: u16 = part.parse().map_err(|_| out_of_range())?;
        *slot = u8::try_from(value).map_err(|_| out_of_range())?;
    }

    Ok(Ipv4Addr::from(octets))
}

pub fn parse_ipv6(text: &str) -> Result<Ipv6Addr, AddressError> {
    text.parse().map_err(|_| AddressError::Ipv6(text.to_string()))
}

/// Parse a decimal prefix length no larger than `max`.
pub fn parse_prefix(text: &str, max: u8) -> Result<u8, AddressError> {
    let invalid = || AddressError::Prefix(text.to_string());
    if text.is_empty() || text.len() > 3 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: u8 = text.parse().map_err(|_| invalid())?;
    if value > max {
        return Err(invalid());
    }
    Ok(value)
}

/// Netmask bits for an IPv4 prefix length.
pub fn cidr_mask(len: u8) -> u32 {
    let len = len.min(MAX_V4_LENGTH);
    let right_len = u32::from(MAX_V4_LENGTH - len);
    let all_bits = u32::MAX as u64;
    ((all_bits >> right_len) << right_len) as u32
}

fn cidr_mask_v6(len: u8) -> u128 {
    let len = len.min(MAX_V6_LENGTH);
    if len == 0 {
        0
    } else {
        u128::MAX << (MAX_V6_LENGTH - len)
    }
}

/// Prefix length of a contiguous high-order-ones mask.
fn prefix_from_bits(bits: u32) -> Option<u8> {
    let ones = bits.leading_ones();
    if ones + bits.trailing_zeros() == 32 {
        u8::try_from(ones).ok()
    } else {
        None
    }
}

/// Prefix length of a dotted mask, read first as a netmask and then as a
/// wildcard (host) mask.
pub fn prefix_from_dotted(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    prefix_from_bits(bits).or_else(|| prefix_from_bits(!bits))
}

/// An IPv4 network: a base address and a prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Network {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Network {
    /// Build a network. With `strict`, an address carrying bits outside the
    /// prefix is rejected; otherwise it is masked down to the network base.
    pub fn new(addr: Ipv4Addr, prefix: u8, strict: bool) -> Result<Self, AddressError> {
        if prefix > MAX_V4_LENGTH {
            return Err(AddressError::Prefix(prefix.to_string()));
        }
        let bits = u32::from(addr);
        let base = bits & cidr_mask(prefix);
        if strict && base != bits {
            return Err(AddressError::HostBits(format!("{addr}/{prefix}")));
        }
        Ok(Self {
            addr: Ipv4Addr::from(base),
            prefix,
        })
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::from(cidr_mask(self.prefix))
    }
}

impl fmt::Display for Ipv4Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// An IPv6 network: a base address and a prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6Network {
    addr: Ipv6Addr,
    prefix: u8,
}

impl Ipv6Network {
    pub fn new(addr: Ipv6Addr, prefix: u8, strict: bool) -> Result<Self, AddressError> {
        if prefix > MAX_V6_LENGTH {
            return Err(AddressError::Prefix(prefix.to_string()));
        }
        let bits = u128::from(addr);
        let base = bits & cidr_mask_v6(prefix);
        if strict && base != bits {
            return Err(AddressError::HostBits(format!("{addr}/{prefix}")));
        }
        Ok(Self {
            addr: Ipv6Addr::from(base),
            prefix,
        })
    }

    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }
}

impl fmt::Display for Ipv6Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// Build a network from an address and a mask written either as a dotted
/// quad or as a prefix length.
///
/// ```
/// use netcfg_core::address::netmask::network_from_mask;
///
/// let host = network_from_mask("10.10.10.10", "0.0.0.0", true).unwrap();
/// assert_eq!(host.to_string(), "10.10.10.10/32");
/// let default = network_from_mask("0.0.0.0", "0.0.0.0", true).unwrap();
/// assert_eq!(default.to_string(), "0.0.0.0/0");
/// ```
pub fn network_from_mask(
    addr: &str,
    mask: &str,
    strict: bool,
) -> Result<Ipv4Network, AddressError> {
    let address = parse_ipv4(addr)?;
    let prefix = if mask.contains('.') {
        let dotted = parse_ipv4(mask).map_err(|_| AddressError::Netmask(mask.to_string()))?;
        if dotted.is_unspecified() && !address.is_unspecified() {
            MAX_V4_LENGTH
        } else {
            prefix_from_dotted(dotted).ok_or_else(|| AddressError::Netmask(mask.to_string()))?
        }
    } else {
        parse_prefix(mask, MAX_V4_LENGTH)?
    };
    Ipv4Network::new(address, prefix, strict)
}

/// Parse `A.B.C.D/len`.
pub fn parse_ipv4_network(text: &str, strict: bool) -> Result<Ipv4Network, AddressError> {
    match text.split_once('/') {
        Some((addr, len)) => {
            let address = parse_ipv4(addr)?;
            let prefix = parse_prefix(len, MAX_V4_LENGTH)?;
            Ipv4Network::new(address, prefix, strict)
        }
        None => Ipv4Network::new(parse_ipv4(text)?, MAX_V4_LENGTH, strict),
    }
}

/// Parse `addr/len` for IPv6.
pub fn parse_ipv6_network(text: &str, strict: bool) -> Result<Ipv6Network, AddressError> {
    match text.split_once('/') {
        Some((addr, len)) => {
            let address = parse_ipv6(addr)?;
            let prefix = parse_prefix(len, MAX_V6_LENGTH)?;
            Ipv6Network::new(address, prefix, strict)
        }
        None => Ipv6Network::new(parse_ipv6(text)?, MAX_V6_LENGTH, strict),
    }
}
