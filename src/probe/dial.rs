use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Opens the transport connection to a mail server.
pub trait Dial {
    /// Connect to `host:port`. A zero `timeout` leaves the OS default in place.
    fn dial(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream>;
}

/// Plain TCP, trying every resolved socket address in turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dial for TcpDialer {
    fn dial(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            let attempt = if timeout.is_zero() {
                TcpStream::connect(addr)
            } else {
                TcpStream::connect_timeout(&addr, timeout)
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no socket address available",
            )
        }))
    }
}

impl<D: Dial + ?Sized> Dial for &D {
    fn dial(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
        (**self).dial(host, port, timeout)
    }
}
