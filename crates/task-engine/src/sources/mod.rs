//! Concrete HTTP enumeration sources
//!
//! Each source wraps one third-party API behind the
//! [`SubdomainSource`](crate::source::SubdomainSource) contract. A
//! source with no configured credential reports no names instead of
//! erroring, so an unconfigured deployment still enumerates with
//! whatever sources remain.

mod censys;
mod certspotter;
mod crtsh;
mod securitytrails;

pub use censys::Censys;
pub use certspotter::CertSpotter;
pub use crtsh::CrtSh;
pub use securitytrails::SecurityTrails;

use std::time::Duration;

/// Per-request timeout for all sources
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Keep names that fall under the apex, excluding the apex itself
pub(crate) fn is_subdomain_of(name: &str, domain: &str) -> bool {
    name.ends_with(domain) && name != domain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_subdomain_of() {
        assert!(is_subdomain_of("www.acme.com", "acme.com"));
        assert!(is_subdomain_of("a.b.acme.com", "acme.com"));
        assert!(!is_subdomain_of("acme.com", "acme.com"));
        assert!(!is_subdomain_of("acme.org", "acme.com"));
    }
}
