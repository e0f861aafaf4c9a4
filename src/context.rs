use std::time::Duration;

use crate::address::split_address;
use crate::error::ValidateError;
use crate::log::debug;
use crate::mx::{MxLookup, SystemResolver, find_mail_servers};
use crate::probe::{self, Dial, TcpDialer};
use crate::report::ProbeReport;

pub const DEFAULT_PORT: u16 = 25;
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Identity presented to remote servers, plus connection settings.
///
/// Build it once and share it: nothing mutates it after construction, so a
/// single context can serve any number of threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    local_host: String,
    from_address: String,
    port: u16,
    deadline: Duration,
}

impl ValidationContext {
    /// `local_host` goes into HELO/EHLO, `from_address` into MAIL FROM.
    pub fn new(local_host: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            local_host: local_host.into(),
            from_address: from_address.into(),
            port: DEFAULT_PORT,
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Hard limit on each connection, from the moment it is opened. Zero
    /// disables it.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn local_host(&self) -> &str {
        &self.local_host
    }

    pub fn from_address(&self) -> &str {
        &self.from_address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Check whether `email` is accepted by one of its domain's mail servers.
    pub fn validate(&self, email: &str) -> Result<(), ValidateError> {
        self.probe(email).into_result()
    }

    /// Same as [`validate`](Self::validate), keeping the hosts tried and the
    /// SMTP transcript.
    pub fn probe(&self, email: &str) -> ProbeReport {
        self.probe_with(email, &SystemResolver::new(), &TcpDialer)
    }

    /// Probe with a caller-supplied resolver and dialer.
    pub fn probe_with<R, D>(&self, email: &str, resolver: &R, dialer: &D) -> ProbeReport
    where
        R: MxLookup + ?Sized,
        D: Dial + ?Sized,
    {
        let mut report = ProbeReport::new(email);
        let outcome = self.run(email, resolver, dialer, &mut report);
        report.outcome = outcome;
        report
    }

    fn run<R, D>(
        &self,
        email: &str,
        resolver: &R,
        dialer: &D,
        report: &mut ProbeReport,
    ) -> Result<(), ValidateError>
    where
        R: MxLookup + ?Sized,
        D: Dial + ?Sized,
    {
        let parts = split_address(email)?;
        report.mail_servers = find_mail_servers(resolver, parts.domain);
        if report.mail_servers.is_empty() {
            debug!("no mail server found for {}", parts.domain);
            return Err(ValidateError::NoMailServers {
                domain: parts.domain.to_string(),
            });
        }
        let hosts = report.mail_servers.clone();
        probe::probe_hosts(self, email, &hosts, dialer, report)
    }
}
