//! Textual CIDR parsing.
//!
//! The teacher leans on `std::net`'s own `FromStr` impls for address text
//! (see `AddressFamily::from_ipaddr`'s `InnerIpAddr = std::net::Ipv4Addr` /
//! `Ipv6Addr` association in `src/types/af.rs`) rather than hand-rolling a
//! dotted-quad or `::`-compression parser. This module does the same:
//! `std::net::Ipv4Addr`/`Ipv6Addr::from_str` already implement the grammar
//! in §6 verbatim (RFC 4291 §2.2 `::` compression included), so parsing a
//! `Prefix` is address-parsing plus a `/len` suffix on top.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::arena::Arena;
use crate::error::{TrieError, TrieResult};
use crate::prefix::{prefix_create, Prefix};

/// Parses IPv4 dotted-quad or IPv6 colon-hex text, with an optional
/// `/N` mask suffix, into a `Prefix` of the address family's full bit
/// width (or `N` bits, if given). Family is detected by the presence of
/// `:` (IPv6) vs `.` with no `:` (IPv4), per §4.1.
pub fn ip_to_prefix<'a>(arena: &'a Arena, text: &str) -> TrieResult<Prefix<'a>> {
    let (addr_part, mask_part) = match text.find('/') {
        Some(idx) => (&text[..idx], Some(&text[idx + 1..])),
        None => (text, None),
    };

    if addr_part.contains(':') {
        let addr = Ipv6Addr::from_str(addr_part).map_err(|_| TrieError::InvalidInput)?;
        let len = resolve_len(mask_part, 128)?;
        prefix_create(arena, &addr.octets(), len)
    } else if addr_part.contains('.') {
        let addr = Ipv4Addr::from_str(addr_part).map_err(|_| TrieError::InvalidInput)?;
        let len = resolve_len(mask_part, 32)?;
        prefix_create(arena, &addr.octets(), len)
    } else {
        Err(TrieError::InvalidInput)
    }
}

fn resolve_len(mask_part: Option<&str>, width: u16) -> TrieResult<u16> {
    match mask_part {
        None => Ok(width),
        Some(text) => {
            let n: u16 = text.parse().map_err(|_| TrieError::InvalidInput)?;
            if n > width {
                return Err(TrieError::InvalidInput);
            }
            Ok(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ipv4_without_mask() {
        let arena = Arena::new();
        let p = ip_to_prefix(&arena, "192.168.1.10").unwrap();
        assert_eq!(p.len(), 32);
        assert_eq!(p.as_bytes(), &[192, 168, 1, 10]);
    }

    #[test]
    fn parses_ipv4_with_mask() {
        let arena = Arena::new();
        let p = ip_to_prefix(&arena, "192.168.0.0/16").unwrap();
        assert_eq!(p.len(), 16);
        assert_eq!(p.as_bytes(), &[192, 168]);
    }

    #[test]
    fn parses_ipv6_with_compression_and_mask() {
        let arena = Arena::new();
        let p = ip_to_prefix(&arena, "AAAA:BBBB:CCCC::/64").unwrap();
        assert_eq!(p.len(), 64);
        assert_eq!(&p.as_bytes()[..6], &[0xAA, 0xAA, 0xBB, 0xBB, 0xCC, 0xCC]);
    }

    #[test]
    fn parses_ipv4_mapped_ipv6() {
        let arena = Arena::new();
        let p = ip_to_prefix(&arena, "::ffff:192.168.1.1").unwrap();
        assert_eq!(p.len(), 128);
    }

    #[test]
    fn rejects_malformed_text() {
        let arena = Arena::new();
        assert_eq!(
            ip_to_prefix(&arena, "not-an-address").unwrap_err(),
            TrieError::InvalidInput
        );
    }

    #[test]
    fn rejects_out_of_range_mask() {
        let arena = Arena::new();
        assert_eq!(
            ip_to_prefix(&arena, "10.0.0.0/33").unwrap_err(),
            TrieError::InvalidInput
        );
        assert_eq!(
            ip_to_prefix(&arena, "::/129").unwrap_err(),
            TrieError::InvalidInput
        );
    }
}
