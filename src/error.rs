use thiserror::Error;

use crate::probe::{ProbeStage, SmtpError};

/// Failure of a single validation call.
///
/// Each variant is a distinct outcome; only [`ValidateError::Protocol`]
/// carries a real SMTP reply code (see [`ValidateError::smtp_code`]).
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The address does not contain exactly one `@`.
    #[error("invalid email format")]
    Format,
    /// The MX lookup produced no host (missing records and DNS failures alike).
    #[error("unable to get mail server from MX records")]
    NoMailServers { domain: String },
    /// Every MX host failed to accept a connection.
    #[error("unable to connect to any mail server")]
    Unreachable { hosts: Vec<String> },
    /// A connected server refused HELO, MAIL FROM or RCPT TO, or the session
    /// broke down while one of them was in flight.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Discriminant of [`ValidateError`], handy for reporting.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Resolution,
    Connectivity,
    Protocol,
}

impl ValidateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format => ErrorKind::Format,
            Self::NoMailServers { .. } => ErrorKind::Resolution,
            Self::Unreachable { .. } => ErrorKind::Connectivity,
            Self::Protocol(_) => ErrorKind::Protocol,
        }
    }

    /// SMTP reply code returned by the server, if the failure is a reply.
    pub fn smtp_code(&self) -> Option<u16> {
        match self {
            Self::Protocol(err) => err.smtp_code(),
            _ => None,
        }
    }

    /// First three characters of the message.
    ///
    /// For server replies this is the SMTP code; for every other failure it is
    /// just the start of the English description (`"inv"`, `"una"`). Prefer
    /// [`kind`](Self::kind) and [`smtp_code`](Self::smtp_code).
    pub fn code(&self) -> String {
        self.to_string().chars().take(3).collect()
    }
}

/// Protocol-level failure on the host that accepted the connection.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ProtocolError {
    pub host: String,
    pub stage: ProbeStage,
    #[source]
    pub source: SmtpError,
}

impl ProtocolError {
    pub fn new(host: impl Into<String>, stage: ProbeStage, source: SmtpError) -> Self {
        Self {
            host: host.into(),
            stage,
            source,
        }
    }

    pub fn smtp_code(&self) -> Option<u16> {
        match &self.source {
            SmtpError::Reply { code, .. } => Some(*code),
            _ => None,
        }
    }
}
