use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

static IPV4_OCTET: &str = r"(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

/// A target offered by a portal, as reported by sendtargets discovery.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    endpoint: String,
    name: String,
}

impl TargetRef {
    pub fn new<S: AsRef<str>>(endpoint: S, name: S) -> Self {
        TargetRef {
            endpoint: endpoint.as_ref().to_string(),
            name: name.as_ref().to_string(),
        }
    }

    /// portal as `ip:port` (or `host:port`)
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// target iqn
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.name, self.endpoint)
    }
}

/// Dotted-quad IPv4 only, hostnames and IPv6 are rejected.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let pattern = format!(
        "^{o}\\.{o}\\.{o}\\.{o}$",
        o = IPV4_OCTET
    );
    Regex::new(&pattern)
        .map(|re| re.is_match(ip))
        .unwrap_or(false)
}

/// Keeps every line made of exactly two whitespace separated tokens,
/// `<endpoint> <iqn>`, in the order received.
pub fn parse_targets(text: &str) -> Vec<TargetRef> {
    text.lines()
        .filter_map(|line| {
            let parts = line.split_whitespace().collect::<Vec<&str>>();
            match parts.as_slice() {
                [endpoint, name] => Some(TargetRef::new(*endpoint, *name)),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_valid_ipv4() {
        for ip in ["192.168.1.50", "0.0.0.0", "255.255.255.255", "10.0.0.1", "01.2.3.4"] {
            assert!(is_valid_ipv4(ip), "{}", ip);
        }
    }

    #[test]
    fn test_invalid_ipv4() {
        for ip in [
            "256.1.1.1",
            "1.1.1.300",
            "1.1.1",
            "1.1.1.1.1",
            "a.b.c.d",
            "1.1.1.x",
            "storage.local",
            "::1",
            "1.1.1.1 ",
            "",
        ] {
            assert!(!is_valid_ipv4(ip), "{}", ip);
        }
    }

    #[test]
    fn test_parse_targets() {
        let text = "\
192.168.1.50:3260,1 iqn.2020-01.com.example:disk1
iscsiadm: connection login retries exceeded

  10.0.0.2:3260   iqn.2020-01.com.example:disk2
10.0.0.3:3260 iqn.2020-01.com.example:disk3 extra
";
        let targets = parse_targets(text);
        assert_eq!(
            targets,
            vec![
                TargetRef::new("192.168.1.50:3260,1", "iqn.2020-01.com.example:disk1"),
                TargetRef::new("10.0.0.2:3260", "iqn.2020-01.com.example:disk2"),
            ]
        );
        assert_eq!(
            targets[1].to_string(),
            "iqn.2020-01.com.example:disk2 at 10.0.0.2:3260"
        );
    }

    #[test]
    fn test_parse_targets_empty() {
        assert!(parse_targets("").is_empty());
        assert!(parse_targets("iscsiadm: No portals found\n").is_empty());
    }
}
