use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by the SMTP client while talking to a server.
#[derive(Debug, Error)]
pub enum SmtpError {
    /// The server answered with an unexpected reply code.
    #[error("{code} {message}")]
    Reply { code: u16, message: String },
    #[error("connection closed: deadline of {after:?} exceeded")]
    DeadlineExceeded { after: Duration },
    #[error("invalid SMTP reply: {0}")]
    Malformed(String),
    #[error("smtp: a line must not contain CR or LF")]
    InvalidLine,
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    /// `expected` may be a full code (`250`) or a prefix (`25`, `2`).
    fn expect(self, expected: u16) -> Result<Self, SmtpError> {
        if self.code.to_string().starts_with(&expected.to_string()) {
            Ok(self)
        } else {
            Err(SmtpError::Reply {
                code: self.code,
                message: self.message(),
            })
        }
    }
}

/// Minimal plain-text SMTP client: banner, EHLO/HELO, MAIL FROM, RCPT TO.
pub(crate) struct SmtpClient {
    server_name: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    extensions: Vec<String>,
    transcript: Vec<String>,
}

impl SmtpClient {
    pub(crate) fn new(stream: TcpStream, server_name: &str) -> Result<Self, SmtpError> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            server_name: server_name.to_string(),
            stream,
            reader,
            extensions: Vec::new(),
            transcript: Vec::new(),
        })
    }

    pub(crate) fn read_banner(&mut self) -> Result<SmtpReply, SmtpError> {
        let reply = parse_reply(&mut self.reader)?;
        self.record_reply(&reply);
        reply.expect(220)
    }

    /// EHLO, falling back to HELO when the server refuses EHLO.
    pub(crate) fn hello(&mut self, local_name: &str) -> Result<(), SmtpError> {
        validate_line(local_name)?;
        match self.command(&format!("EHLO {local_name}"), 250) {
            Ok(reply) => {
                self.extensions = reply
                    .lines
                    .iter()
                    .skip(1)
                    .filter_map(|line| line.split_whitespace().next())
                    .map(str::to_ascii_uppercase)
                    .collect();
                Ok(())
            }
            Err(SmtpError::Reply { .. }) => self
                .command(&format!("HELO {local_name}"), 250)
                .map(|_| ()),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn mail(&mut self, from: &str) -> Result<(), SmtpError> {
        validate_line(from)?;
        let mut cmd = format!("MAIL FROM:<{from}>");
        if self.has_extension("8BITMIME") {
            cmd.push_str(" BODY=8BITMIME");
        }
        self.command(&cmd, 250).map(|_| ())
    }

    pub(crate) fn rcpt(&mut self, to: &str) -> Result<(), SmtpError> {
        validate_line(to)?;
        self.command(&format!("RCPT TO:<{to}>"), 25).map(|_| ())
    }

    pub(crate) fn has_extension(&self, name: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(name))
    }

    pub(crate) fn take_transcript(&mut self) -> Vec<String> {
        std::mem::take(&mut self.transcript)
    }

    fn command(&mut self, command: &str, expected: u16) -> Result<SmtpReply, SmtpError> {
        self.record("C", command);
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()?;
        let reply = parse_reply(&mut self.reader)?;
        self.record_reply(&reply);
        reply.expect(expected)
    }

    fn record(&mut self, direction: &str, message: &str) {
        self.transcript
            .push(format!("[{}] {direction}: {message}", self.server_name));
    }

    fn record_reply(&mut self, reply: &SmtpReply) {
        if reply.lines.is_empty() {
            self.record("S", &reply.code.to_string());
        } else {
            for line in &reply.lines {
                self.record("S", &format!("{} {}", reply.code, line));
            }
        }
    }
}

fn validate_line(value: &str) -> Result<(), SmtpError> {
    if value.contains(['\r', '\n']) {
        return Err(SmtpError::InvalidLine);
    }
    Ok(())
}

/// Longest reply line accepted, CRLF included.
const MAX_REPLY_LINE: usize = 8 * 512;
/// Most lines accepted in one multi-line reply.
const MAX_REPLY_LINES: usize = 256;

/// Read one (possibly multi-line) reply.
///
/// Lines are read as raw bytes; anything that is not UTF-8 is replaced so
/// the reply code survives 8-bit server text.
pub(crate) fn parse_reply<R: BufRead>(reader: &mut R) -> Result<SmtpReply, SmtpError> {
    let mut code = None;
    let mut lines = Vec::new();
    loop {
        if lines.len() == MAX_REPLY_LINES {
            return Err(SmtpError::Malformed(format!(
                "reply longer than {MAX_REPLY_LINES} lines"
            )));
        }
        let mut buf = Vec::new();
        let bytes = reader
            .by_ref()
            .take(MAX_REPLY_LINE as u64 + 1)
            .read_until(b'\n', &mut buf)?;
        if bytes == 0 {
            return Err(SmtpError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            )));
        }
        if bytes > MAX_REPLY_LINE && !buf.ends_with(b"\n") {
            return Err(SmtpError::Malformed(format!(
                "reply line longer than {MAX_REPLY_LINE} bytes"
            )));
        }
        let text = String::from_utf8_lossy(&buf);
        let raw = text.trim_end_matches(['\r', '\n']);

        let code_part = raw.get(..3).ok_or_else(|| SmtpError::Malformed(raw.to_string()))?;
        let parsed = code_part
            .parse::<u16>()
            .ok()
            .filter(|c| (100..600).contains(c))
            .ok_or_else(|| SmtpError::Malformed(raw.to_string()))?;
        match code {
            Some(existing) if existing != parsed => {
                return Err(SmtpError::Malformed(format!(
                    "inconsistent reply codes: {existing} vs {parsed}"
                )));
            }
            Some(_) => {}
            None => code = Some(parsed),
        }

        let continuation = match raw.as_bytes().get(3) {
            None | Some(b' ') => false,
            Some(b'-') => true,
            Some(_) => return Err(SmtpError::Malformed(raw.to_string())),
        };
        lines.push(raw.get(4..).unwrap_or_default().to_string());
        if !continuation {
            return Ok(SmtpReply {
                code: parsed,
                lines,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<SmtpReply, SmtpError> {
        parse_reply(&mut input.as_bytes())
    }

    #[test]
    fn parses_single_line_reply() {
        let reply = parse("250 2.1.0 Ok\r\n").expect("reply");
        assert_eq!(reply.code, 250);
        assert_eq!(reply.lines, vec!["2.1.0 Ok"]);
        assert!(reply.is_positive_completion());
    }

    #[test]
    fn parses_multiline_reply() {
        let reply = parse("250-mx.example.com\r\n250-SIZE 1000\r\n250 8BITMIME\r\n").expect("reply");
        assert_eq!(reply.code, 250);
        assert_eq!(reply.lines.len(), 3);
        assert_eq!(reply.message(), "mx.example.com\nSIZE 1000\n8BITMIME");
    }

    #[test]
    fn accepts_bare_code() {
        let reply = parse("221\r\n").expect("reply");
        assert_eq!(reply.code, 221);
        assert_eq!(reply.lines, vec![""]);
    }

    #[test]
    fn rejects_inconsistent_codes() {
        let err = parse("250-first\r\n251 second\r\n").expect_err("mismatch");
        assert!(matches!(err, SmtpError::Malformed(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse("hello\r\n"), Err(SmtpError::Malformed(_))));
        assert!(matches!(parse("25\r\n"), Err(SmtpError::Malformed(_))));
        assert!(matches!(parse("250xOk\r\n"), Err(SmtpError::Malformed(_))));
        assert!(matches!(parse("999 nope\r\n"), Err(SmtpError::Malformed(_))));
    }

    #[test]
    fn eof_is_an_io_error() {
        let err = parse("250-partial\r\n").expect_err("eof");
        assert!(matches!(err, SmtpError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn non_utf8_text_keeps_the_code() {
        let reply = parse_reply(&mut &b"550 5.1.1 utilisateur inconnu \xe0 ce domaine\r\n"[..])
            .expect("reply");
        assert_eq!(reply.code, 550);
        assert_eq!(reply.lines, vec!["5.1.1 utilisateur inconnu \u{FFFD} ce domaine"]);
        let err = reply.expect(250).expect_err("rejection");
        assert!(err.to_string().starts_with("550 5.1.1 utilisateur inconnu"));
    }

    #[test]
    fn overlong_line_is_refused() {
        let mut input = b"250 ".to_vec();
        input.extend(std::iter::repeat_n(b'x', MAX_REPLY_LINE * 2));
        input.extend_from_slice(b"\r\n");
        let err = parse_reply(&mut input.as_slice()).expect_err("too long");
        assert!(matches!(err, SmtpError::Malformed(ref msg) if msg.contains("longer than")));
    }

    #[test]
    fn line_at_the_limit_is_accepted() {
        let mut input = b"250 ".to_vec();
        input.extend(std::iter::repeat_n(b'x', MAX_REPLY_LINE - 6));
        input.extend_from_slice(b"\r\n");
        assert_eq!(input.len(), MAX_REPLY_LINE);
        let reply = parse_reply(&mut input.as_slice()).expect("within limit");
        assert_eq!(reply.lines[0].len(), MAX_REPLY_LINE - 6);
    }

    #[test]
    fn endless_continuation_is_refused() {
        let input = "250-more\r\n".repeat(MAX_REPLY_LINES + 1);
        let err = parse(&input).expect_err("too many lines");
        assert!(matches!(err, SmtpError::Malformed(_)));
    }

    #[test]
    fn expect_matches_code_prefix() {
        let reply = SmtpReply {
            code: 251,
            lines: vec!["will forward".into()],
        };
        assert!(reply.clone().expect(25).is_ok());
        let err = reply.expect(250).expect_err("exact code");
        assert_eq!(err.to_string(), "251 will forward");
    }

    #[test]
    fn reply_error_starts_with_code() {
        let err = SmtpError::Reply {
            code: 550,
            message: "5.1.1 User unknown".into(),
        };
        assert_eq!(err.to_string(), "550 5.1.1 User unknown");
    }

    #[test]
    fn line_validation_refuses_crlf() {
        assert!(validate_line("bounce@example.org").is_ok());
        assert!(matches!(
            validate_line("a@b\r\nDATA"),
            Err(SmtpError::InvalidLine)
        ));
    }
}
