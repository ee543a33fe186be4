mod logging;

use ferrous_forwarder_domain::{CliOverrides, Config, ServerConfig};
use std::net::{IpAddr, SocketAddr};

pub use logging::init_logging;

pub fn load_config(
    path: Option<&str>,
    overrides: CliOverrides,
) -> anyhow::Result<(Config, Vec<String>)> {
    Ok(Config::load(path, overrides)?)
}

/// Listening address from `bind_address` and `port`; IPv6 may be bracketed.
pub fn bind_address(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    let host = server
        .bind_address
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');
    let ip: IpAddr = host
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address {}: {}", server.bind_address, e))?;
    Ok(SocketAddr::new(ip, server.port))
}
