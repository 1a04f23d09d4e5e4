use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use bridge_common::ShopId;
use log::{debug, trace};
use regex::Regex;
use serde::Deserialize;

use crate::{config::ProxyConfig, errors::ServerError};

pub const SHOP_ID_HEADER: &str = "X-Shop-Id";

/// Get the remote IP address from the request. It uses 4 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The `CF-Connecting-IP` header, iif `use_cf_connecting_ip` is set to true in the configuration.
/// 2. The first address in the `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true.
/// 3. The `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 4. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, proxy: &ProxyConfig) -> Option<IpAddr> {
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::trim);
    let mut result = None;
    if proxy.use_cf_connecting_ip {
        trace!("Checking CF-Connecting-IP header");
        result = header("CF-Connecting-IP").and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = result {
            debug!("Using CF-Connecting-IP header for remote address: {ip}");
        }
    }
    if proxy.use_x_forwarded_for && result.is_none() {
        trace!("Checking X-Forwarded-For header");
        result = header("X-Forwarded-For")
            .and_then(|s| s.split(',').next())
            .and_then(|s| IpAddr::from_str(s.trim()).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if proxy.use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        result = header("Forwarded").and_then(parse_forwarded_for);
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.peer_addr().map(|a| a.ip());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr
    })
}

/// Extracts the client address from a `Forwarded` header value, e.g. `for=192.0.2.60;proto=http;by=203.0.113.43`.
fn parse_forwarded_for(value: &str) -> Option<IpAddr> {
    let re = Regex::new(r#"(?i)for="?\[?(?P<ip>[0-9a-fA-F:.]+)"#).ok()?;
    re.captures(value).and_then(|caps| caps.name("ip")).and_then(|m| IpAddr::from_str(m.as_str()).ok())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopQuery {
    pub shop: Option<String>,
}

/// The tenant a request is for: the `shop` query parameter, else the `X-Shop-Id` header, else `fallback` (a body
/// field, for example).
pub fn resolve_shop_id(req: &HttpRequest, query: &ShopQuery, fallback: Option<&str>) -> Result<ShopId, ServerError> {
    let header = req.headers().get(SHOP_ID_HEADER).and_then(|v| v.to_str().ok());
    let raw = query
        .shop
        .as_deref()
        .or(header)
        .or(fallback)
        .filter(|s| !s.trim().is_empty())
        .ok_or(ServerError::MissingShop)?;
    let shop = ShopId::from_str(raw)?;
    Ok(shop)
}

/// The request's `User-Agent` header, if present.
pub fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers().get("User-Agent").and_then(|v| v.to_str().ok()).map(String::from).filter(|s| !s.trim().is_empty())
}
