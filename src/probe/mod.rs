//! SMTP probe: connect to the MX hosts in order and run HELO / MAIL FROM /
//! RCPT TO without ever sending DATA.
//!
//! Only a failure to establish the connection moves on to the next host.
//! Anything a connected server says is the answer for the whole call.

mod deadline;
mod dial;
mod session;

pub use dial::{Dial, TcpDialer};
pub use session::{SmtpError, SmtpReply};

use std::fmt;

use crate::context::ValidationContext;
use crate::error::{ProtocolError, ValidateError};
use crate::log::{debug, trace};
use crate::report::ProbeReport;

use deadline::Deadline;
use session::SmtpClient;

/// Step of the handshake a host was in when the probe stopped.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
    Connect,
    Hello,
    MailFrom,
    RcptTo,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Hello => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
        })
    }
}

/// Result of probing one host. Only `Unreachable` lets the caller try the
/// next host.
enum HostOutcome {
    Unreachable(SmtpError),
    Accepted,
    Rejected(ProtocolError),
}

pub(crate) fn probe_hosts<D: Dial + ?Sized>(
    ctx: &ValidationContext,
    email: &str,
    hosts: &[String],
    dialer: &D,
    report: &mut ProbeReport,
) -> Result<(), ValidateError> {
    for host in hosts {
        report.hosts_tried.push(host.clone());
        match probe_host(ctx, email, host, dialer, &mut report.transcript) {
            HostOutcome::Unreachable(err) => {
                debug!("{host}: connection failed ({err}), trying next mail server");
                report.transcript.push(format!("[{host}] ! {err}"));
            }
            HostOutcome::Accepted => {
                debug!("{host}: recipient {email} accepted");
                report.accepted_by = Some(host.clone());
                return Ok(());
            }
            HostOutcome::Rejected(err) => {
                debug!("{host}: stopped at {} ({err})", err.stage);
                return Err(err.into());
            }
        }
    }
    Err(ValidateError::Unreachable {
        hosts: hosts.to_vec(),
    })
}

fn probe_host<D: Dial + ?Sized>(
    ctx: &ValidationContext,
    email: &str,
    host: &str,
    dialer: &D,
    transcript: &mut Vec<String>,
) -> HostOutcome {
    trace!("dialing {host}:{}", ctx.port());
    let stream = match dialer.dial(host, ctx.port(), ctx.deadline()) {
        Ok(stream) => stream,
        Err(err) => return HostOutcome::Unreachable(err.into()),
    };
    let deadline = match Deadline::arm(&stream, ctx.deadline()) {
        Ok(deadline) => deadline,
        Err(err) => return HostOutcome::Unreachable(err.into()),
    };
    let mut client = match SmtpClient::new(stream, host) {
        Ok(client) => client,
        Err(err) => return HostOutcome::Unreachable(err),
    };

    // The banner is read while the client is being set up, so a host that
    // never greets counts as unreachable.
    if let Err(err) = client.read_banner() {
        transcript.extend(client.take_transcript());
        return HostOutcome::Unreachable(classify(err, &deadline));
    }

    let outcome = match handshake(&mut client, ctx, email) {
        Ok(()) => HostOutcome::Accepted,
        Err((stage, err)) => {
            HostOutcome::Rejected(ProtocolError::new(host, stage, classify(err, &deadline)))
        }
    };
    transcript.extend(client.take_transcript());
    outcome
}

fn handshake(
    client: &mut SmtpClient,
    ctx: &ValidationContext,
    email: &str,
) -> Result<(), (ProbeStage, SmtpError)> {
    client
        .hello(ctx.local_host())
        .map_err(|err| (ProbeStage::Hello, err))?;
    client
        .mail(ctx.from_address())
        .map_err(|err| (ProbeStage::MailFrom, err))?;
    client.rcpt(email).map_err(|err| (ProbeStage::RcptTo, err))
}

/// I/O failures after the watchdog fired are reported as the deadline.
fn classify(err: SmtpError, deadline: &Deadline) -> SmtpError {
    match err {
        SmtpError::Io(_) if deadline.expired() => SmtpError::DeadlineExceeded {
            after: deadline.after(),
        },
        other => other,
    }
}
