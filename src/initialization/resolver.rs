//! DNS resolver initialization.

use std::net::IpAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::dns::{DnsResolver, HickoryResolver};
use crate::error_handling::InitializationError;

/// Builds the shared resolver from the configured name servers.
///
/// Without `--nameserver` the resolver's default upstreams are used. Hickory's
/// own retries are disabled; the per-attempt timeout is the query timeout.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if a name server address
/// cannot be queried (unspecified or multicast).
pub fn init_resolver(config: &Config) -> Result<Arc<dyn DnsResolver>, InitializationError> {
    if let Some(bad) = config.nameserver.iter().find(|ip| !is_queryable(ip)) {
        return Err(InitializationError::DnsResolverError(format!(
            "{bad} cannot be used as a name server"
        )));
    }

    if config.nameserver.is_empty() {
        log::info!("Using the resolver's default upstream name servers");
    } else {
        log::info!(
            "Querying name servers: {}",
            config
                .nameserver
                .iter()
                .map(IpAddr::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(Arc::new(HickoryResolver::with_nameservers(
        &config.nameserver,
        config.query_timeout(),
    )))
}

fn is_queryable(ip: &IpAddr) -> bool {
    !ip.is_unspecified() && !ip.is_multicast()
}
