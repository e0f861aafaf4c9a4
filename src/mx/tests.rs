use super::{MxLookup, MxRecord, find_mail_servers, resolver};
use trust_dns_resolver::error::ResolveError;

type LookupResult = Result<Vec<MxRecord>, ResolveError>;
type LookupFn = dyn Fn(&str) -> LookupResult;

pub(crate) struct StubResolver {
    pub on_lookup: Box<LookupFn>,
}

impl StubResolver {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> LookupResult + 'static,
    {
        Self {
            on_lookup: Box::new(f),
        }
    }

    pub(crate) fn with_records(records: Vec<MxRecord>) -> Self {
        Self::new(move |_| Ok(records.clone()))
    }
}

impl MxLookup for StubResolver {
    fn lookup_mx(&self, domain: &str) -> LookupResult {
        (self.on_lookup)(domain)
    }
}

#[test]
fn orders_hosts_by_preference() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "example.com");
        Ok(vec![
            MxRecord::new(20, "mx2.example.com"),
            MxRecord::new(10, "mx1.example.com"),
            MxRecord::new(30, "mx3.example.com"),
        ])
    });

    let hosts = find_mail_servers(&stub, "example.com");
    assert_eq!(
        hosts,
        vec!["mx1.example.com", "mx2.example.com", "mx3.example.com"]
    );
}

#[test]
fn equal_preferences_keep_resolver_order() {
    let stub = StubResolver::with_records(vec![
        MxRecord::new(10, "b.example.com"),
        MxRecord::new(5, "first.example.com"),
        MxRecord::new(10, "a.example.com"),
        MxRecord::new(10, "c.example.com"),
    ]);

    let hosts = find_mail_servers(&stub, "example.com");
    assert_eq!(
        hosts,
        vec![
            "first.example.com",
            "b.example.com",
            "a.example.com",
            "c.example.com"
        ]
    );
}

#[test]
fn lookup_failure_yields_no_hosts() {
    let stub = StubResolver::new(|_| Err(ResolveError::from("SERVFAIL")));
    assert!(find_mail_servers(&stub, "example.com").is_empty());
}

#[test]
fn no_records_yields_no_hosts() {
    let stub = StubResolver::with_records(Vec::new());
    assert!(find_mail_servers(&stub, "example.com").is_empty());
}

#[test]
fn empty_domain_skips_lookup() {
    let stub = StubResolver::new(|domain| panic!("unexpected lookup for {domain:?}"));
    assert!(find_mail_servers(&stub, "").is_empty());
    assert!(find_mail_servers(&stub, "   ").is_empty());
}

#[test]
fn null_mx_is_dropped() {
    let stub = StubResolver::with_records(vec![MxRecord::new(0, "")]);
    assert!(find_mail_servers(&stub, "example.com").is_empty());
}

#[test]
fn unicode_domain_is_queried_as_punycode() {
    let stub = StubResolver::new(|domain| {
        assert_eq!(domain, "xn--bcher-kva.example");
        Ok(vec![MxRecord::new(10, "mx.xn--bcher-kva.example")])
    });
    assert_eq!(
        find_mail_servers(&stub, "bücher.example"),
        vec!["mx.xn--bcher-kva.example"]
    );
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
    assert_eq!(resolver::normalize_exchange(".".to_string()), "");
}
