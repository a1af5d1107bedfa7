//! IPv4/IPv6 literal extraction from one configuration line.
//!
//! [`extract_addresses`] walks an ordered table of line shapes (a `range`
//! statement, address plus mask plus next hop, a lone network, ...). The
//! first shape that matches decides which substrings are literals and what
//! kind each one is. Every literal is then validated and normalized, and the
//! outcome is returned as a [`Span`] over the exact substring.

pub mod netmask;
mod patterns;

use log::debug;
use regex::{Captures, Match};
use thiserror::Error;

use crate::span::{Span, SpanKind};
use netmask::{network_from_mask, parse_ipv4, parse_ipv4_network, parse_ipv6, parse_ipv6_network};
use patterns::{Role, Shape, ADDRESS_WITH_MASK, SIMPLE_SHAPES, SINGLE_ADDRESS, STRICT_SHAPES};

pub use netmask::AddressError;

/// Literals resolved per line. Later captures are not evaluated.
pub const MAX_LITERALS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Reject networks whose address has host bits set.
    pub strict: bool,
    /// Match dotted quads with any 1-3 digit octets so malformed literals
    /// are reported instead of skipped.
    pub simple: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("shape `{shape}` declares capture `{name}` at group {expected}, found {found:?}")]
    CaptureMismatch {
        shape: &'static str,
        name: &'static str,
        expected: usize,
        found: Option<usize>,
    },
}

struct Literal<'h> {
    role: Role,
    found: Match<'h>,
}

impl Literal<'_> {
    fn text(&self) -> &str {
        self.found.as_str()
    }

    fn span(&self, kind: SpanKind) -> Span {
        Span::new(self.found.start(), self.found.end(), kind)
    }
}

/// Classify every address, network and netmask literal of `line`.
///
/// ```
/// use netcfg_core::address::{extract_addresses, ExtractOptions};
/// use netcfg_core::span::SpanKind;
///
/// let spans = extract_addresses("ip route 0.0.0.0 0.0.0.0 10.10.10.129", &ExtractOptions::default())
///     .unwrap();
/// let kinds: Vec<_> = spans.iter().map(|s| s.kind).collect();
/// assert_eq!(kinds, vec![SpanKind::Ipv4Address, SpanKind::Ipv4Netmask, SpanKind::Ipv4Address]);
/// assert_eq!(spans[0].value.as_deref(), Some("0.0.0.0/0"));
/// ```
pub fn extract_addresses(line: &str, options: &ExtractOptions) -> Result<Vec<Span>, ExtractError> {
    let shapes: &[Shape] = if options.simple {
        &SIMPLE_SHAPES
    } else {
        &STRICT_SHAPES
    };

    for (index, shape) in shapes.iter().enumerate() {
        let Some(caps) = shape.regex.captures(line) else {
            continue;
        };
        debug!("shape {} ({}) matched {line:?}", index + 1, shape.label);
        let literals = bind(shape, &caps)?;
        return Ok(resolve(&literals, options.strict));
    }
    Ok(Vec::new())
}

/// Pair each declared capture with its match, checking that the compiled
/// pattern binds every declared name to the declared position.
fn bind<'h>(shape: &Shape, caps: &Captures<'h>) -> Result<Vec<Literal<'h>>, ExtractError> {
    let mut literals = Vec::with_capacity(shape.captures.len());
    for (slot, capture) in shape.captures.iter().enumerate().take(MAX_LITERALS) {
        let expected = slot + 1;
        let found = shape
            .regex
            .capture_names()
            .position(|name| name == Some(capture.name));
        if found != Some(expected) {
            return Err(ExtractError::CaptureMismatch {
                shape: shape.label,
                name: capture.name,
                expected,
                found,
            });
        }
        if let Some(found) = caps.get(expected) {
            literals.push(Literal {
                role: capture.role,
                found,
            });
        }
    }
    Ok(literals)
}

fn resolve(literals: &[Literal<'_>], strict: bool) -> Vec<Span> {
    let mut spans = Vec::with_capacity(literals.len());
    let mut rest = literals;

    if let [address, mask, tail @ ..] = literals {
        if address.role == Role::NetAddress && mask.role == Role::NetMask {
            spans.extend(resolve_net_mask(address, mask, strict));
            rest = tail;
        }
    }

    spans.extend(rest.iter().map(|literal| resolve_one(literal, strict)));
    spans
}

fn resolve_net_mask(address: &Literal<'_>, mask: &Literal<'_>, strict: bool) -> [Span; 2] {
    let address_span = address.span(SpanKind::Ipv4Address);
    let mask_span = mask.span(SpanKind::Ipv4Netmask);

    match (parse_ipv4(address.text()), parse_ipv4(mask.text())) {
        (Err(err), mask_check) => {
            let mask_span = match mask_check {
                Ok(_) => mask_span,
                Err(mask_err) => mask_span.invalid(mask_err.to_string()),
            };
            [address_span.invalid(err.to_string()), mask_span]
        }
        (Ok(addr), Err(err)) => [
            address_span.with_value(addr.to_string()),
            mask_span.invalid(err.to_string()),
        ],
        (Ok(_), Ok(_)) => match network_from_mask(address.text(), mask.text(), strict) {
            Ok(network) => [
                address_span.with_value(network.to_string()),
                mask_span.with_value(network.prefix().to_string()),
            ],
            Err(err) => {
                let reason = err.to_string();
                [address_span.invalid(reason.clone()), mask_span.invalid(reason)]
            }
        },
    }
}

fn resolve_one(literal: &Literal<'_>, strict: bool) -> Span {
    let text = literal.text();
    let outcome = match literal.role {
        // A stray mask outside the pair path is still checked as a quad.
        Role::Address | Role::NetAddress | Role::NetMask => parse_ipv4(text).map(|a| a.to_string()),
        Role::Network => parse_ipv4_network(text, strict).map(|n| n.to_string()),
        Role::Ipv6Address => parse_ipv6(text).map(|a| a.to_string()),
        Role::Ipv6Network => parse_ipv6_network(text, strict).map(|n| n.to_string()),
    };
    let kind = match literal.role {
        Role::Address | Role::NetAddress => SpanKind::Ipv4Address,
        Role::NetMask => SpanKind::Ipv4Netmask,
        Role::Network => SpanKind::Ipv4Network,
        Role::Ipv6Address => SpanKind::Ipv6Address,
        Role::Ipv6Network => SpanKind::Ipv6Network,
    };
    with_outcome(literal.span(kind), outcome)
}

fn with_outcome(span: Span, outcome: Result<String, AddressError>) -> Span {
    match outcome {
        Ok(value) => span.with_value(value),
        Err(err) => span.invalid(err.to_string()),
    }
}

/// The one bare IPv4 address of `line`, or `None` when there is none or more
/// than one.
pub fn extract_ipv4_address(line: &str) -> Option<Span> {
    // Resume after the literal, not after the trailing delimiter, so two
    // literals separated by a single space are both seen.
    let mut found = None;
    let mut at = 0;
    while let Some(literal) = SINGLE_ADDRESS
        .captures_at(line, at)
        .and_then(|caps| caps.name("ipv4_address"))
    {
        if found.is_some() {
            debug!("ambiguous address literals in {line:?}");
            return None;
        }
        at = literal.end();
        found = Some(literal);
    }
    let first = found?;
    let span = Span::new(first.start(), first.end(), SpanKind::Ipv4Address);
    Some(with_outcome(
        span,
        parse_ipv4(first.as_str()).map(|a| a.to_string()),
    ))
}

/// An address with its dotted netmask or `/len`, resolved into a network.
///
/// The returned spans are the address (kind [`SpanKind::Ipv4Network`], value
/// the computed network), the `/` when present, and the mask.
pub fn extract_ipv4_network(line: &str, strict: bool) -> Vec<Span> {
    let Some(caps) = ADDRESS_WITH_MASK.captures(line) else {
        return Vec::new();
    };
    let (Some(address), Some(mask)) = (
        caps.name("ipv4_address"),
        caps.name("dotted_mask").or_else(|| caps.name("prefix_len")),
    ) else {
        return Vec::new();
    };

    let mut spans = vec![Span::new(address.start(), address.end(), SpanKind::Ipv4Network)];
    if let Some(slash) = caps.name("slash") {
        spans.push(Span::new(slash.start(), slash.end(), SpanKind::Slash));
    }
    spans.push(Span::new(mask.start(), mask.end(), SpanKind::Ipv4Netmask));

    match network_from_mask(address.as_str(), mask.as_str(), strict) {
        Ok(network) => {
            let value = network.to_string();
            spans[0].value = Some(value);
            if let Some(last) = spans.last_mut() {
                last.value = Some(network.prefix().to_string());
            }
            spans
        }
        Err(err) => {
            let reason = err.to_string();
            spans.into_iter().map(|s| s.invalid(reason.clone())).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{extract_addresses, extract_ipv4_address, extract_ipv4_network, ExtractOptions};
    use crate::span::{Span, SpanKind, Validity};

    fn strict() -> ExtractOptions {
        ExtractOptions {
            strict: true,
            simple: false,
        }
    }

    fn simple() -> ExtractOptions {
        ExtractOptions {
            strict: false,
            simple: true,
        }
    }

    fn summary(line: &str, spans: &[Span]) -> Vec<(String, SpanKind, Option<String>, bool)> {
        spans
            .iter()
            .map(|s| {
                (
                    line[s.start..s.stop].to_string(),
                    s.kind,
                    s.value.clone(),
                    s.validity.is_ok(),
                )
            })
            .collect()
    }

    fn ok(text: &str, kind: SpanKind, value: &str) -> (String, SpanKind, Option<String>, bool) {
        (text.to_string(), kind, Some(value.to_string()), true)
    }

    #[test]
    fn single_address_covers_exact_substring() {
        let line = "neighbor 10.1.2.3 remote-as 65001";
        let spans = extract_addresses(line, &ExtractOptions::default()).expect("extract");
        assert_eq!(
            summary(line, &spans),
            vec![ok("10.1.2.3", SpanKind::Ipv4Address, "10.1.2.3")]
        );
        assert_eq!((spans[0].start, spans[0].stop), (9, 17));
    }

    #[test]
    fn no_literal_yields_empty_list() {
        let spans = extract_addresses("interface GigabitEthernet0/1", &strict()).expect("extract");
        assert!(spans.is_empty());
        let embedded = extract_addresses("description host-10.0.0.1", &strict()).expect("extract");
        assert!(embedded.is_empty());
    }

    #[test]
    fn static_default_route_with_next_hop() {
        let line = "ip route 0.0.0.0 0.0.0.0 10.10.10.129";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(
            summary(line, &spans),
            vec![
                ok("0.0.0.0", SpanKind::Ipv4Address, "0.0.0.0/0"),
                ok("0.0.0.0", SpanKind::Ipv4Netmask, "0"),
                ok("10.10.10.129", SpanKind::Ipv4Address, "10.10.10.129"),
            ]
        );
    }

    #[test]
    fn zero_mask_on_host_reads_as_single_host() {
        let line = "permit ip 10.10.10.10 0.0.0.0";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(
            summary(line, &spans),
            vec![
                ok("10.10.10.10", SpanKind::Ipv4Address, "10.10.10.10/32"),
                ok("0.0.0.0", SpanKind::Ipv4Netmask, "32"),
            ]
        );
    }

    #[test]
    fn wildcard_mask_with_host_bits_marks_both_spans() {
        let line = "permit 103.103.183.0 0.0.255.255";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(spans.len(), 2);
        assert_eq!(
            spans[0].validity,
            Validity::Invalid("103.103.183.0/16 has host bits set".to_string())
        );
        assert_eq!(spans[0].validity, spans[1].validity);

        let loose = extract_addresses(line, &ExtractOptions::default()).expect("extract");
        assert_eq!(loose[0].value.as_deref(), Some("103.103.0.0/16"));
    }

    #[test]
    fn range_statement_yields_three_addresses() {
        let line = "range 10.0.0.10 10.0.0.20 gateway 10.0.0.1";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(
            summary(line, &spans),
            vec![
                ok("10.0.0.10", SpanKind::Ipv4Address, "10.0.0.10"),
                ok("10.0.0.20", SpanKind::Ipv4Address, "10.0.0.20"),
                ok("10.0.0.1", SpanKind::Ipv4Address, "10.0.0.1"),
            ]
        );
    }

    #[test]
    fn network_then_address() {
        let line = "ip route 172.16.0.0/12 via 192.168.1.254";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(
            summary(line, &spans),
            vec![
                ok("172.16.0.0/12", SpanKind::Ipv4Network, "172.16.0.0/12"),
                ok("192.168.1.254", SpanKind::Ipv4Address, "192.168.1.254"),
            ]
        );
    }

    #[test]
    fn host_prefixes_up_to_thirty_two_are_networks() {
        for len in [0, 8, 24, 30, 31, 32] {
            let line = format!("network 10.0.0.0/{len}");
            let spans = extract_addresses(&line, &ExtractOptions::default()).expect("extract");
            assert_eq!(spans.len(), 1, "{line}");
            assert_eq!(spans[0].kind, SpanKind::Ipv4Network, "{line}");
        }
    }

    #[test]
    fn trailing_prefix_is_not_swallowed_by_address_shape() {
        let line = "ip prefix-list P1 seq 5 permit 10.0.0.0/33";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert!(spans.is_empty(), "{spans:?}");
    }

    #[test]
    fn strict_network_with_host_bits_is_invalid() {
        let line = "ip address 192.168.0.1/24";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(spans[0].kind, SpanKind::Ipv4Network);
        assert_eq!(
            spans[0].validity,
            Validity::Invalid("192.168.0.1/24 has host bits set".to_string())
        );
        let loose = extract_addresses(line, &ExtractOptions::default()).expect("extract");
        assert_eq!(loose[0].value.as_deref(), Some("192.168.0.0/24"));
    }

    #[test]
    fn permissive_mode_reports_out_of_range_octets() {
        let line = "ip address 999.999.999.999";
        let spans = extract_addresses(line, &simple()).expect("extract");
        assert_eq!(spans.len(), 1);
        assert_eq!(line[spans[0].start..spans[0].stop].to_string(), "999.999.999.999");
        assert!(!spans[0].validity.is_ok());
        assert_eq!(spans[0].value, None);

        let skipped = extract_addresses(line, &strict()).expect("extract");
        assert!(skipped.is_empty());
    }

    #[test]
    fn permissive_invalid_netaddress_keeps_mask_span() {
        let line = "permit 10.0.300.0 0.0.0.255";
        let spans = extract_addresses(line, &simple()).expect("extract");
        assert_eq!(spans.len(), 2);
        assert!(!spans[0].validity.is_ok());
        assert!(spans[1].validity.is_ok());
        assert_eq!(spans[1].kind, SpanKind::Ipv4Netmask);
    }

    #[test]
    fn fourth_literal_is_not_evaluated() {
        let line = "range 10.0.0.1 10.0.0.2 10.0.0.3 10.0.0.4";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn ipv6_network_and_address() {
        let line = "ipv6 route 2001:db8:0:1::/64 via 2001:db8::1";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(
            summary(line, &spans),
            vec![
                ok("2001:db8:0:1::/64", SpanKind::Ipv6Network, "2001:db8:0:1::/64"),
                ok("2001:db8::1", SpanKind::Ipv6Address, "2001:db8::1"),
            ]
        );
    }

    #[test]
    fn ipv6_scope_is_left_out_of_the_span() {
        let line = "ipv6 neighbor fe80::1%eth0";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(
            summary(line, &spans),
            vec![ok("fe80::1", SpanKind::Ipv6Address, "fe80::1")]
        );
    }

    #[test]
    fn ipv6_values_are_canonical() {
        let line = "ipv6 address 2001:DB8:0:0:0:0:0:1";
        let spans = extract_addresses(line, &strict()).expect("extract");
        assert_eq!(spans[0].value.as_deref(), Some("2001:db8::1"));
    }

    #[test]
    fn single_address_extractor_rejects_ambiguity() {
        let span = extract_ipv4_address("router-id 1.1.1.1").expect("one address");
        assert_eq!((span.start, span.stop), (10, 17));
        assert_eq!(span.value.as_deref(), Some("1.1.1.1"));
        assert_eq!(extract_ipv4_address("neighbor 1.1.1.1 update 2.2.2.2"), None);
        assert_eq!(extract_ipv4_address("permit 1.1.1.1 2.2.2.2"), None);
        assert_eq!(extract_ipv4_address("hostname edge"), None);
        assert_eq!(extract_ipv4_address("ip address 10.0.0.1/24"), None);
    }

    #[test]
    fn network_extractor_with_prefix_length() {
        let line = "ip address 99.99.16.9/28";
        let spans = extract_ipv4_network(line, false);
        let kinds: Vec<_> = spans.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SpanKind::Ipv4Network, SpanKind::Slash, SpanKind::Ipv4Netmask]
        );
        assert_eq!(spans[0].value.as_deref(), Some("99.99.16.0/28"));
        assert_eq!(&line[spans[2].start..spans[2].stop], "28");
    }

    #[test]
    fn network_extractor_with_dotted_mask() {
        let spans = extract_ipv4_network("ip address 10.1.1.1 255.255.255.252", false);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].value.as_deref(), Some("10.1.1.0/30"));
        assert_eq!(spans[1].value.as_deref(), Some("30"));

        let failed = extract_ipv4_network("ip address 10.1.1.1 255.255.255.252", true);
        assert!(failed.iter().all(|s| s.validity == failed[0].validity));
        assert!(!failed[0].validity.is_ok());

        assert!(extract_ipv4_network("hostname edge", true).is_empty());
    }
}
