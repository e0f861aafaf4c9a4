use anyhow::Result;
use mailprobe_lib::{ErrorKind, ProbeReport};

use crate::args::OutputFormat;

pub fn print_report(report: &ProbeReport, format: OutputFormat, transcript: bool) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!("{}", render_human(report));
            if transcript {
                for line in &report.transcript {
                    println!("  {line}");
                }
            }
        }
        OutputFormat::Json => {
            #[cfg(feature = "with-serde")]
            {
                let payload = ReportPayload::new(report, transcript);
                println!("{}", serde_json::to_string(&payload)?);
            }
            #[cfg(not(feature = "with-serde"))]
            {
                let _ = transcript;
                anyhow::bail!("format=json requires the 'with-serde' feature");
            }
        }
    }
    Ok(())
}

pub fn render_human(report: &ProbeReport) -> String {
    match report.error() {
        None => match &report.accepted_by {
            Some(host) => format!("{}: valid (accepted by {host})", report.email),
            None => format!("{}: valid", report.email),
        },
        Some(err) => format!(
            "{}: invalid [{}] {err} (code {})",
            report.email,
            kind_label(err.kind()),
            err.code()
        ),
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Format => "format",
        ErrorKind::Resolution => "resolution",
        ErrorKind::Connectivity => "connectivity",
        ErrorKind::Protocol => "protocol",
    }
}

#[cfg(feature = "with-serde")]
#[derive(serde::Serialize)]
struct ReportPayload<'a> {
    email: &'a str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    smtp_code: Option<u16>,
    mail_servers: &'a [String],
    hosts_tried: &'a [String],
    accepted_by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcript: Option<&'a [String]>,
}

#[cfg(feature = "with-serde")]
impl<'a> ReportPayload<'a> {
    fn new(report: &'a ProbeReport, transcript: bool) -> Self {
        let err = report.error();
        Self {
            email: &report.email,
            valid: report.is_valid(),
            kind: err.map(|e| e.kind()),
            message: err.map(|e| e.to_string()),
            smtp_code: err.and_then(|e| e.smtp_code()),
            mail_servers: &report.mail_servers,
            hosts_tried: &report.hosts_tried,
            accepted_by: report.accepted_by.as_deref(),
            transcript: transcript.then_some(report.transcript.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprobe_lib::ValidateError;

    fn report(outcome: Result<(), ValidateError>, accepted_by: Option<&str>) -> ProbeReport {
        ProbeReport {
            email: "user@example.com".to_string(),
            mail_servers: vec!["mx.example.com".to_string()],
            hosts_tried: vec!["mx.example.com".to_string()],
            accepted_by: accepted_by.map(str::to_string),
            transcript: Vec::new(),
            outcome,
        }
    }

    #[test]
    fn human_success_names_the_host() {
        let line = render_human(&report(Ok(()), Some("mx.example.com")));
        assert_eq!(line, "user@example.com: valid (accepted by mx.example.com)");
    }

    #[test]
    fn human_failure_shows_kind_and_code() {
        let line = render_human(&report(Err(ValidateError::Format), None));
        assert_eq!(
            line,
            "user@example.com: invalid [format] invalid email format (code inv)"
        );
    }
}
