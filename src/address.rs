//! Provides validation and classification of scan-target strings.

use std::str::FromStr;

use cidr_utils::cidr::Ipv4Cidr;

/// Checks whether a string is a well-formed dotted-decimal IPv4 address.
///
/// Anything containing a colon is rejected up front, which throws out IPv6
/// without parsing it. The string is validated, not rewritten: leading
/// zeroes are accepted as-is and no canonical form is produced.
///
/// ```rust
/// # use titlescan::address::is_ipv4;
/// assert!(is_ipv4("1.2.3.4"));
/// assert!(!is_ipv4("1.2.3.256"));
/// assert!(!is_ipv4("2001:db8::1"));
/// ```
#[must_use]
pub fn is_ipv4(ip: &str) -> bool {
    if ip.contains(':') {
        return false;
    }

    let mut parts = 0;
    for part in ip.split('.') {
        if part.is_empty() || part.len() > 3 {
            return false;
        }
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        // At most 3 digits, so u16 cannot overflow.
        let value: u16 = part.parse().unwrap_or(u16::MAX);
        if value > 255 {
            return false;
        }
        parts += 1;
    }

    parts == 4
}

/// The syntactic shape of a literal target handed straight to masscan.
///
/// Classification is diagnostic only: an `Unknown` literal is still written
/// to the list file, it just earns the operator a warning first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A bare dotted-decimal IPv4 address.
    Address,
    /// An IPv4 CIDR block such as `10.0.0.0/8`.
    Cidr,
    /// A `start-end` address range with IPv4 on both sides.
    Range,
    /// None of the shapes masscan list files understand.
    Unknown,
}

impl TargetKind {
    /// Classifies a literal target string.
    #[must_use]
    pub fn of(target: &str) -> Self {
        if is_ipv4(target) {
            return Self::Address;
        }
        if Ipv4Cidr::from_str(target).is_ok() {
            return Self::Cidr;
        }
        if let Some((start, end)) = target.split_once('-') {
            if is_ipv4(start) && is_ipv4(end) {
                return Self::Range;
            }
        }
        Self::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::{is_ipv4, TargetKind};

    #[test]
    fn accepts_dotted_quads() {
        assert!(is_ipv4("1.2.3.4"));
        assert!(is_ipv4("0.0.0.0"));
        assert!(is_ipv4("255.255.255.255"));
    }

    #[test]
    fn accepts_leading_zeroes_verbatim() {
        assert!(is_ipv4("001.002.003.004"));
    }

    #[test]
    fn rejects_out_of_range_octets() {
        assert!(!is_ipv4("1.2.3.256"));
        assert!(!is_ipv4("999.1.1.1"));
    }

    #[test]
    fn rejects_wrong_group_counts() {
        assert!(!is_ipv4("1.2.3"));
        assert!(!is_ipv4("1.2.3.4.5"));
        assert!(!is_ipv4(""));
    }

    #[test]
    fn rejects_empty_and_oversized_groups() {
        assert!(!is_ipv4("1..3.4"));
        assert!(!is_ipv4("1.2.3.4."));
        assert!(!is_ipv4("1.2.3.0004"));
    }

    #[test]
    fn rejects_non_digits() {
        assert!(!is_ipv4("a.b.c.d"));
        assert!(!is_ipv4("1.2.3.4x"));
        assert!(!is_ipv4("1.2.-3.4"));
    }

    #[test]
    fn rejects_ipv6() {
        assert!(!is_ipv4("2001:db8::1"));
        assert!(!is_ipv4("::1"));
    }

    #[test]
    fn classifies_target_shapes() {
        assert_eq!(TargetKind::of("192.168.0.1"), TargetKind::Address);
        assert_eq!(TargetKind::of("192.168.0.0/24"), TargetKind::Cidr);
        assert_eq!(TargetKind::of("10.0.0.1-10.0.0.50"), TargetKind::Range);
        assert_eq!(TargetKind::of("example.com"), TargetKind::Unknown);
        assert_eq!(TargetKind::of("10.0.0.1-example"), TargetKind::Unknown);
    }
}
