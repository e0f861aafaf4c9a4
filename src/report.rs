use crate::error::ValidateError;

/// Everything observed during one validation call.
#[derive(Debug)]
pub struct ProbeReport {
    pub email: String,
    /// MX hosts in the order they were going to be tried.
    pub mail_servers: Vec<String>,
    pub hosts_tried: Vec<String>,
    pub accepted_by: Option<String>,
    /// `[host] C: ...` / `[host] S: ...` lines, plus `[host] ! ...` for
    /// connection failures.
    pub transcript: Vec<String>,
    pub outcome: Result<(), ValidateError>,
}

impl ProbeReport {
    pub(crate) fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            mail_servers: Vec::new(),
            hosts_tried: Vec::new(),
            accepted_by: None,
            transcript: Vec::new(),
            outcome: Ok(()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&ValidateError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<(), ValidateError> {
        self.outcome
    }
}
