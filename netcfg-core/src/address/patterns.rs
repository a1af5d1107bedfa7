//! Regex building blocks and the ordered shape table.
//!
//! Every shape is delimited by `(?:\s|^)` and `(?:\s|$)` so a literal is
//! never matched inside a larger token, and so `A.B.C.D/len` can never be
//! taken for a bare address.

use lazy_static::lazy_static;
use regex::Regex;

/// One IPv4 octet in 0..=255 without leading zeros.
const OCTET: &str = r"(?:[1-9]?[0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])";

/// Dotted quad tolerating 0..=999 octets, for malformed input.
const IPV4_SIMPLE: &str = r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b";

/// Octet values of a contiguous low-order-ones (wildcard) mask.
const LOW_ONES: &str = r"(?:0|1|3|7|15|31|63|127|255)";

/// Octet values of a contiguous high-order-ones mask.
const HIGH_ONES: &str = r"(?:0|128|192|224|240|248|252|254)";

/// IPv4 prefix length 0..=32.
const V4_PREFIX: &str = r"(?:[1-2]?[0-9]|3[0-2])";

/// IPv6 prefix length 0..=128.
const V6_PREFIX: &str = r"(?:[1-9]?[0-9]|1[0-1][0-9]|12[0-8])\b";

const V6_GROUP: &str = r"[0-9a-fA-F]{1,4}";

/// Interface scope such as `%eth0`, matched but left outside the capture.
const V6_SCOPE: &str = r"(?:%[^\s/]+)?";

const LEAD: &str = r"(?:\s|^)";
const TRAIL: &str = r"(?:\s|$)";

fn ipv4_strict() -> String {
    format!(r"\b(?:{OCTET}\.){{3}}{OCTET}\b")
}

fn wildcard_mask() -> String {
    let l = LOW_ONES;
    format!(r"\b(?:{l}(?:\.255){{3}}|0\.{l}(?:\.255){{2}}|(?:0\.){{2}}{l}\.255|(?:0\.){{3}}{l})\b")
}

fn high_mask() -> String {
    let h = HIGH_ONES;
    format!(r"\b(?:{h}\.0\.0\.0|255\.{h}\.0\.0|(?:255\.){{2}}{h}\.0|(?:255\.){{3}}{h})\b")
}

/// IPv6 address with every zero-compression position and an optional
/// embedded IPv4 tail.
fn ipv6() -> String {
    let h = V6_GROUP;
    let v4 = ipv4_strict();
    let hex_led = [
        format!(r"(?:{h}:){{7}}(?:{h}\b|:)"),
        format!(r"(?:{h}:){{6}}(?::{h}\b|{v4}|:)"),
        format!(r"(?:{h}:){{5}}(?:(?::{h}){{1,2}}\b|:{v4}|:)"),
        format!(r"(?:{h}:){{4}}(?:(?::{h}){{1,3}}\b|(?::{h})?:{v4}|:)"),
        format!(r"(?:{h}:){{3}}(?:(?::{h}){{1,4}}\b|(?::{h}){{0,2}}:{v4}|:)"),
        format!(r"(?:{h}:){{2}}(?:(?::{h}){{1,5}}\b|(?::{h}){{0,3}}:{v4}|:)"),
        format!(r"(?:{h}:)(?:(?::{h}){{1,6}}\b|(?::{h}){{0,4}}:{v4}|:)"),
    ]
    .join("|");
    let colon_led = format!(r":(?:(?::{h}){{1,7}}\b|(?::{h}){{0,5}}:{v4}|:)");
    format!(r"(?:\b(?:{hex_led})|{colon_led})")
}

/// The kind of literal a capture group holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Address,
    NetAddress,
    NetMask,
    Network,
    Ipv6Address,
    Ipv6Network,
}

/// A named capture group and the role of the literal it holds. Its position
/// in [`Shape::captures`] is its positional group index minus one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Capture {
    pub name: &'static str,
    pub role: Role,
}

/// One entry of the precedence table: a matcher and the roles that classify
/// its captures.
#[derive(Debug)]
pub(crate) struct Shape {
    pub label: &'static str,
    pub regex: Regex,
    pub captures: &'static [Capture],
}

const fn cap(name: &'static str, role: Role) -> Capture {
    Capture { name, role }
}

const RANGE: &[Capture] = &[
    cap("ipv4_address", Role::Address),
    cap("ipv4_address1", Role::Address),
    cap("ipv4_address2", Role::Address),
];
const NET_MASK_ADDRESS: &[Capture] = &[
    cap("ipv4_netaddress", Role::NetAddress),
    cap("ipv4_netmask", Role::NetMask),
    cap("ipv4_address", Role::Address),
];
const NETWORK_ADDRESS: &[Capture] = &[
    cap("ipv4_network", Role::Network),
    cap("ipv4_address", Role::Address),
];
const NET_MASK: &[Capture] = &[
    cap("ipv4_netaddress", Role::NetAddress),
    cap("ipv4_netmask", Role::NetMask),
];
const TWO_ADDRESSES: &[Capture] = &[
    cap("ipv4_address", Role::Address),
    cap("ipv4_address1", Role::Address),
];
const NETWORK: &[Capture] = &[cap("ipv4_network", Role::Network)];
const ADDRESS: &[Capture] = &[cap("ipv4_address", Role::Address)];
const V6_NETWORK_ADDRESS: &[Capture] = &[
    cap("ipv6_network", Role::Ipv6Network),
    cap("ipv6_address", Role::Ipv6Address),
];
const V6_NETWORK: &[Capture] = &[cap("ipv6_network", Role::Ipv6Network)];
const V6_ADDRESS: &[Capture] = &[cap("ipv6_address", Role::Ipv6Address)];

fn shape(label: &'static str, pattern: String, captures: &'static [Capture]) -> Shape {
    Shape {
        label,
        regex: Regex::new(&pattern).expect("static address pattern"),
        captures,
    }
}

/// Build the ten shapes in precedence order for one octet dialect.
fn build_shapes(a: &str) -> Vec<Shape> {
    let v6 = ipv6();
    vec![
        shape(
            "range",
            format!(
                r"{LEAD}\brange\s(?P<ipv4_address>{a})\s(?P<ipv4_address1>{a})\s(?:.*)(?P<ipv4_address2>{a}){TRAIL}"
            ),
            RANGE,
        ),
        shape(
            "netaddress_netmask_address",
            format!(
                r"{LEAD}(?P<ipv4_netaddress>{a})\s(?P<ipv4_netmask>{a})\s(?:.*)(?P<ipv4_address>{a}){TRAIL}"
            ),
            NET_MASK_ADDRESS,
        ),
        shape(
            "network_address",
            format!(
                r"{LEAD}(?P<ipv4_network>{a}/{V4_PREFIX})\s(?:.*)(?P<ipv4_address>{a}){TRAIL}"
            ),
            NETWORK_ADDRESS,
        ),
        shape(
            "netaddress_netmask",
            format!(r"{LEAD}(?P<ipv4_netaddress>{a})\s(?P<ipv4_netmask>{a}){TRAIL}"),
            NET_MASK,
        ),
        shape(
            "two_addresses",
            format!(r"{LEAD}(?P<ipv4_address>{a})\s(?:.+)(?P<ipv4_address1>{a}){TRAIL}"),
            TWO_ADDRESSES,
        ),
        shape(
            "network",
            format!(r"{LEAD}(?P<ipv4_network>{a}/{V4_PREFIX}){TRAIL}"),
            NETWORK,
        ),
        shape(
            "address",
            format!(r"{LEAD}(?P<ipv4_address>{a}){TRAIL}"),
            ADDRESS,
        ),
        shape(
            "ipv6_network_address",
            format!(
                r"{LEAD}(?P<ipv6_network>{v6}/{V6_PREFIX})\s(?:.*)\s(?P<ipv6_address>{v6}){V6_SCOPE}{TRAIL}"
            ),
            V6_NETWORK_ADDRESS,
        ),
        shape(
            "ipv6_network",
            format!(r"{LEAD}(?P<ipv6_network>{v6}/{V6_PREFIX}){TRAIL}"),
            V6_NETWORK,
        ),
        shape(
            "ipv6_address",
            format!(r"{LEAD}(?P<ipv6_address>{v6}){V6_SCOPE}{TRAIL}"),
            V6_ADDRESS,
        ),
    ]
}

lazy_static! {
    pub(crate) static ref STRICT_SHAPES: Vec<Shape> = build_shapes(&ipv4_strict());
    pub(crate) static ref SIMPLE_SHAPES: Vec<Shape> = build_shapes(IPV4_SIMPLE);

    /// A lone strict address, not followed by `/len`.
    pub(crate) static ref SINGLE_ADDRESS: Regex =
        Regex::new(&format!(r"{LEAD}(?P<ipv4_address>{}){TRAIL}", ipv4_strict()))
            .expect("static address pattern");

    /// Address plus dotted mask or `/len`.
    pub(crate) static ref ADDRESS_WITH_MASK: Regex = Regex::new(&format!(
        r"{LEAD}(?P<ipv4_address>{a})(?:\s(?P<dotted_mask>{w}|{m})|(?P<slash>/)(?P<prefix_len>{V4_PREFIX})){TRAIL}",
        a = ipv4_strict(),
        w = wildcard_mask(),
        m = high_mask(),
    ))
    .expect("static network pattern");
}
