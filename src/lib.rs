#![forbid(unsafe_code)]
//! mailprobe_lib — SMTP deliverability probe (MX lookup + HELO/MAIL/RCPT, no DATA)
//!
//! ```no_run
//! use mailprobe_lib::ValidationContext;
//!
//! let ctx = ValidationContext::new("probe.example.org", "bounce@example.org");
//! match ctx.validate("user@example.com") {
//!     Ok(()) => println!("accepted"),
//!     Err(err) => println!("rejected: {err} (code {})", err.code()),
//! }
//! ```

mod log;

pub mod address;
pub mod context;
pub mod error;
pub mod mx;
pub mod probe;
pub mod report;

pub use address::{EmailParts, split_address};
pub use context::ValidationContext;
pub use error::{ErrorKind, ProtocolError, ValidateError};
pub use mx::{MxLookup, MxRecord, SystemResolver, find_mail_servers};
pub use probe::{Dial, ProbeStage, SmtpError, SmtpReply, TcpDialer};
pub use report::ProbeReport;
