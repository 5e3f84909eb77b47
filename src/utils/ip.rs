//! Client IP extraction from proxy headers, with normalization and a
//! local/private classification stored alongside each conversation record.

use std::net::{IpAddr, Ipv4Addr};

use axum::http::HeaderMap;

const FALLBACK_IP: &str = "127.0.0.1";

/// Headers consulted in order; the first non-empty value wins.
const IP_HEADERS: [&str; 5] = [
    "x-forwarded-for",
    "x-real-ip",
    "x-client-ip",
    "cf-connecting-ip",
    "x-cluster-client-ip",
];

#[derive(Debug, Clone)]
pub struct IpInfo {
    pub ip: String,
    pub is_local: bool,
    pub is_private: bool,
}

pub fn client_ip(headers: &HeaderMap) -> String {
    for name in IP_HEADERS {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            // x-forwarded-for may carry a proxy chain; the first entry is
            // the original client.
            let first = value.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    FALLBACK_IP.to_string()
}

/// Syntax-check the extracted value; anything unparseable becomes loopback.
pub fn normalize_ip(ip: &str) -> String {
    let trimmed = ip.trim();
    if trimmed.parse::<IpAddr>().is_ok() {
        trimmed.to_string()
    } else {
        FALLBACK_IP.to_string()
    }
}

pub fn ip_info(ip: &str) -> IpInfo {
    let normalized = normalize_ip(ip);
    let parsed: IpAddr = normalized
        .parse()
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    IpInfo {
        is_local: parsed.is_loopback(),
        is_private: match parsed {
            IpAddr::V4(v4) => v4.is_private(),
            IpAddr::V6(_) => false,
        },
        ip: normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_chain_takes_the_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1, 10.0.0.2"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.1"));
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn real_ip_used_when_forwarded_for_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_ip(&headers), "198.51.100.4");
    }

    #[test]
    fn no_headers_falls_back_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new()), FALLBACK_IP);
    }

    #[test]
    fn garbage_normalizes_to_loopback() {
        assert_eq!(normalize_ip("not-an-ip"), FALLBACK_IP);
        assert_eq!(normalize_ip(""), FALLBACK_IP);
        assert_eq!(normalize_ip(" 192.168.1.10 "), "192.168.1.10");
    }

    #[test]
    fn classification_flags() {
        let info = ip_info("192.168.1.10");
        assert!(info.is_private);
        assert!(!info.is_local);

        let info = ip_info("127.0.0.1");
        assert!(info.is_local);

        let info = ip_info("203.0.113.7");
        assert!(!info.is_private);
        assert!(!info.is_local);
    }
}
