use std::cell::OnceCell;

use trust_dns_resolver::{Resolver, error::ResolveError};

use super::MxRecord;
use crate::log::{debug, trace};

/// Source of MX records.
pub trait MxLookup {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl MxLookup for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = Resolver::mx_lookup(self, domain)?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

/// System resolver (`/etc/resolv.conf` or platform equivalent), built on first
/// lookup. If it cannot be built every lookup fails.
#[derive(Default)]
pub struct SystemResolver {
    inner: OnceCell<Option<Resolver>>,
}

impl SystemResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MxLookup for SystemResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let resolver = self.inner.get_or_init(|| match Resolver::from_system_conf() {
            Ok(resolver) => Some(resolver),
            Err(err) => {
                debug!("system resolver unavailable: {err}");
                None
            }
        });
        match resolver {
            Some(resolver) => resolver.lookup_mx(domain),
            None => Err(ResolveError::from("system resolver unavailable")),
        }
    }
}

impl<L: MxLookup + ?Sized> MxLookup for &L {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        (**self).lookup_mx(domain)
    }
}

/// Mail servers for `domain`, most preferred first.
///
/// Records are sorted by preference only; equal preferences keep the order
/// the resolver returned them in. Null MX entries (`0 .`) are dropped. Any
/// failure, including an undecodable domain, gives an empty list.
pub fn find_mail_servers<R: MxLookup + ?Sized>(resolver: &R, domain: &str) -> Vec<String> {
    let Some(ascii) = normalize_domain(domain) else {
        debug!("cannot look up MX for {domain:?}");
        return Vec::new();
    };
    let mut records = match resolver.lookup_mx(&ascii) {
        Ok(records) => records,
        Err(err) => {
            debug!("MX lookup for {ascii} failed: {err}");
            return Vec::new();
        }
    };
    records.sort_by_key(|record| record.preference);
    trace!("MX records for {ascii}: {records:?}");
    records
        .into_iter()
        .map(|record| record.exchange)
        .filter(|exchange| !exchange.is_empty())
        .collect()
}

pub(crate) fn normalize_domain(domain: &str) -> Option<String> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return None;
    }
    idna::domain_to_ascii(trimmed).ok()
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}
