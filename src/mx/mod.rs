//! Mail-exchange discovery.
//!
//! [`find_mail_servers`] turns a domain into the ordered list of hosts the
//! probe should try. Lookup failures are not reported: they all collapse into
//! an empty list, which the caller treats as "no mail server".

mod resolver;
mod types;

pub use resolver::{MxLookup, SystemResolver, find_mail_servers};
pub use types::MxRecord;

#[cfg(test)]
pub(crate) mod tests;
