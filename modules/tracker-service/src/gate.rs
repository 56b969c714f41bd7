//! Access gate for mutating routes.
//!
//! The service has no accounts. By default writes are accepted only from the
//! host the service runs on; the agent that feeds the tracker posts over
//! loopback.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

/// Decides whether a caller may mutate collections.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, caller: SocketAddr) -> bool;

    /// Name used in startup logging
    fn name(&self) -> &'static str;
}

/// Accepts `127.0.0.1`, `::1` and `::ffff:127.0.0.1` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackAuthorizer;

impl Authorizer for LoopbackAuthorizer {
    fn authorize(&self, caller: SocketAddr) -> bool {
        is_loopback_origin(caller.ip())
    }

    fn name(&self) -> &'static str {
        "loopback"
    }
}

/// Accepts everyone. For embedding behind another auth layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _caller: SocketAddr) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "allow-all"
    }
}

/// Build the authorizer named by the `WRITE_ACCESS` setting.
///
/// - `loopback` (default): LoopbackAuthorizer
/// - `open`: AllowAll, for deployments that sit behind their own auth proxy
pub fn create_authorizer(mode: &str) -> Result<Arc<dyn Authorizer>, String> {
    match mode.trim().to_lowercase().as_str() {
        "" | "loopback" | "local" => Ok(Arc::new(LoopbackAuthorizer)),
        "open" | "allow-all" => {
            log::warn!("WRITE_ACCESS=open: every caller may modify collections");
            Ok(Arc::new(AllowAll))
        }
        other => Err(format!(
            "Unknown WRITE_ACCESS '{}'. Use 'loopback' or 'open'.",
            other
        )),
    }
}

pub fn is_loopback_origin(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4 == Ipv4Addr::LOCALHOST,
        IpAddr::V6(v6) => {
            v6 == Ipv6Addr::LOCALHOST || v6.to_ipv4_mapped() == Some(Ipv4Addr::LOCALHOST)
        }
    }
}
