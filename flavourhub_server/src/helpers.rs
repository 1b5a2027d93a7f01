use std::{net::IpAddr, str::FromStr, sync::OnceLock};

use actix_web::HttpRequest;
use log::*;
use regex::Regex;

use crate::config::ServerOptions;

fn forwarded_for_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"for="?(?P<ip>[^;,"]+)"?"#).ok()).as_ref()
}

/// Extracts the first `for=` address from a `Forwarded` header value.
pub fn parse_forwarded_header(value: &str) -> Option<IpAddr> {
    forwarded_for_pattern()?
        .captures(value)
        .and_then(|caps| caps.name("ip"))
        .map(|m| m.as_str().trim())
        .and_then(|s| IpAddr::from_str(s).ok())
}

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The first address in the `X-Forwarded-For` header, iif `use_x_forwarded_for` is set in the configuration.
/// 2. The `Forwarded` header, iif `use_forwarded` is set in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, options: &ServerOptions) -> Option<IpAddr> {
    let mut result = None;
    if options.use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        result = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| IpAddr::from_str(s.trim()).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if options.use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        result = req.headers().get("Forwarded").and_then(|v| v.to_str().ok()).and_then(parse_forwarded_header);
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.peer_addr();
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr.map(|a| a.ip())
    })
}

/// A printable version of [`get_remote_ip`] for log messages.
pub fn remote_ip_label(req: &HttpRequest, options: &ServerOptions) -> String {
    get_remote_ip(req, options).map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string())
}
