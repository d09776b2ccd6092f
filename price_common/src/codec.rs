//! Newline-framed text stream used by every tier.
//!
//! Each request or response unit is one `\n`-terminated line. Reads strip the
//! terminator (and a preceding `\r`), and bytes that are not valid UTF-8 are
//! replaced rather than failing the connection, so a garbled line simply decodes
//! to an invalid command. Lines are capped at [`MAX_LINE_LEN`] bytes; an
//! oversized line is discarded up to its terminator and reported as
//! [`PriceError::LineTooLong`], leaving the stream positioned at the next line.
use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use crate::error::PriceError;
use crate::result::Result;

/// Longest accepted line, excluding its terminator.
pub const MAX_LINE_LEN: usize = 4096;

/// Buffered duplex line stream over a TCP connection.
pub struct LineStream {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl LineStream {
    /// Wrap an accepted or connected stream.
    pub fn new(stream: TcpStream) -> Result<Self> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: stream,
        })
    }

    /// Connect to `addr`, bounding the connect and every later read/write by `timeout`.
    pub fn connect(addr: &str, timeout: Option<Duration>) -> Result<Self> {
        let stream = match timeout {
            Some(limit) => connect_with_timeout(addr, limit)?,
            None => TcpStream::connect(addr)?,
        };
        debug!("Connected to {}", addr);
        let line_stream = Self::new(stream)?;
        line_stream.set_timeout(timeout)?;
        Ok(line_stream)
    }

    /// Apply the same read and write timeout to both handles of the socket.
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        for handle in [self.reader.get_ref(), &self.writer] {
            handle.set_read_timeout(timeout)?;
            handle.set_write_timeout(timeout)?;
        }
        Ok(())
    }

    /// Read the next line. Returns `None` once the peer has closed the stream.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        // Room for the payload plus a `\r\n` terminator.
        let limit = MAX_LINE_LEN + 2;
        if (&mut self.reader).take(limit as u64).read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.len() == limit && buf.last() != Some(&b'\n') {
            self.discard_rest_of_line()?;
            return Err(PriceError::LineTooLong(MAX_LINE_LEN));
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        if buf.len() > MAX_LINE_LEN {
            return Err(PriceError::LineTooLong(MAX_LINE_LEN));
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    fn discard_rest_of_line(&mut self) -> Result<()> {
        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|b| *b == b'\n') {
                Some(end) => {
                    self.reader.consume(end + 1);
                    return Ok(());
                }
                None => {
                    let len = available.len();
                    self.reader.consume(len);
                }
            }
        }
    }

    /// Write `line` followed by a newline and flush it.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let mut framed = Vec::with_capacity(line.len() + 1);
        framed.extend_from_slice(line.as_bytes());
        framed.push(b'\n');
        self.writer.write_all(&framed)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Send one line and wait for exactly one line back.
    pub fn request(&mut self, line: &str) -> Result<String> {
        self.write_line(line)?;
        self.read_line()?.ok_or_else(|| {
            io::Error::new(ErrorKind::UnexpectedEof, "peer closed before replying").into()
        })
    }

    /// Address of the remote end.
    pub fn peer_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.writer.peer_addr()?)
    }
}

fn connect_with_timeout(addr: &str, limit: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for candidate in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&candidate, limit) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(ErrorKind::InvalidInput, format!("no address resolved for {addr}"))
    }))
}
