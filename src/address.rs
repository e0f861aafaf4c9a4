use crate::error::ValidateError;

/// Local part and domain of an address, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailParts<'a> {
    pub local: &'a str,
    pub domain: &'a str,
}

/// Split `email` around its single `@`.
///
/// Only the separator count is checked: zero or several `@` is a
/// [`ValidateError::Format`]. Empty segments go through unchanged, an empty
/// domain simply resolves to no mail server later on.
pub fn split_address(email: &str) -> Result<EmailParts<'_>, ValidateError> {
    let mut segments = email.split('@');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(local), Some(domain), None) => Ok(EmailParts { local, domain }),
        _ => Err(ValidateError::Format),
    }
}
