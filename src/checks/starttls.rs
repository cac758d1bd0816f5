//! STARTTLS negotiation
//!
//! Runs the plaintext part of a connection (SMTP or IMAP) up to the point
//! where the server expects a TLS ClientHello on the same socket.

use crate::utils::{ConfigError, NegotiationError};
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Client name sent in the SMTP `EHLO` command unless configured otherwise
pub const DEFAULT_CLIENT_NAME: &str = "mail.example.com";

/// Longest response line accepted, terminator included
pub const MAX_LINE_LEN: u64 = 8192;

/// Plaintext handshake to run before the TLS upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StarttlsProtocol {
    #[default]
    None,
    Smtp,
    Imap,
}

impl FromStr for StarttlsProtocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(StarttlsProtocol::None),
            "smtp" => Ok(StarttlsProtocol::Smtp),
            "imap" => Ok(StarttlsProtocol::Imap),
            other => Err(ConfigError::unknown_protocol(other)),
        }
    }
}

impl fmt::Display for StarttlsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarttlsProtocol::None => write!(f, "none"),
            StarttlsProtocol::Smtp => write!(f, "smtp"),
            StarttlsProtocol::Imap => write!(f, "imap"),
        }
    }
}

/// Line-oriented view over a duplex byte stream
///
/// `read_line` only ever yields complete lines; if the peer closes the
/// stream before a terminator arrives the read fails.
pub struct LineStream<S> {
    inner: BufReader<S>,
}

impl<S> LineStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: BufReader::new(stream),
        }
    }

    /// Read one line, without its `\r\n` or `\n` terminator
    pub async fn read_line(&mut self) -> Result<String, NegotiationError> {
        let mut buf = Vec::new();
        let n = (&mut self.inner)
            .take(MAX_LINE_LEN)
            .read_until(b'\n', &mut buf)
            .await?;
        if n == 0 {
            return Err(NegotiationError::ConnectionClosed);
        }
        if buf.last() != Some(&b'\n') {
            if n as u64 >= MAX_LINE_LEN {
                return Err(NegotiationError::LineTooLong {
                    limit: MAX_LINE_LEN,
                });
            }
            return Err(NegotiationError::PartialLine {
                partial: String::from_utf8_lossy(&buf).into_owned(),
            });
        }
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        let line = String::from_utf8_lossy(&buf).into_owned();
        tracing::debug!("S: {}", line);
        Ok(line)
    }

    /// Write one line followed by `\r\n`
    pub async fn write_line(&mut self, line: &str) -> Result<(), NegotiationError> {
        tracing::debug!("C: {}", line);
        let stream = self.inner.get_mut();
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\r\n").await?;
        stream.flush().await?;
        Ok(())
    }

    /// Give the stream back; fails if the server sent bytes we have not read
    pub fn into_inner(self) -> Result<S, NegotiationError> {
        if !self.inner.buffer().is_empty() {
            return Err(NegotiationError::UnexpectedData);
        }
        Ok(self.inner.into_inner())
    }
}

/// Run the plaintext handshake for `protocol` and return the stream ready
/// for the TLS upgrade.
pub async fn negotiate<S>(
    stream: S,
    protocol: StarttlsProtocol,
    client_name: &str,
) -> Result<S, NegotiationError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if protocol == StarttlsProtocol::None {
        return Ok(stream);
    }

    tracing::debug!("Starting {} STARTTLS negotiation", protocol);
    let mut lines = LineStream::new(stream);
    match protocol {
        StarttlsProtocol::None => {}
        StarttlsProtocol::Smtp => smtp(&mut lines, client_name).await?,
        StarttlsProtocol::Imap => imap(&mut lines).await?,
    }
    lines.into_inner()
}

fn expect_prefix(
    line: String,
    prefix: &str,
    stage: &'static str,
) -> Result<String, NegotiationError> {
    if line.starts_with(prefix) {
        Ok(line)
    } else {
        Err(NegotiationError::UnexpectedResponse { stage, line })
    }
}

async fn smtp<S>(lines: &mut LineStream<S>, client_name: &str) -> Result<(), NegotiationError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    expect_prefix(lines.read_line().await?, "220 ", "SMTP greeting")?;
    lines.write_line(&format!("EHLO {}", client_name)).await?;
    expect_prefix(lines.read_line().await?, "250-", "EHLO response")?;

    let mut found = false;
    let last = loop {
        let line = lines.read_line().await?;
        if line.starts_with("250-STARTTLS") {
            found = true;
        }
        if !line.starts_with("250-") {
            break line;
        }
    };
    expect_prefix(last, "250 ", "EHLO response")?;
    if !found {
        return Err(NegotiationError::StarttlsUnsupported { protocol: "SMTP" });
    }

    lines.write_line("STARTTLS").await?;
    expect_prefix(lines.read_line().await?, "220 ", "STARTTLS response")?;
    Ok(())
}

/// Whether `word` appears in `line` delimited by non-word characters
fn contains_word(line: &str, word: &str) -> bool {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|token| token == word)
}

async fn imap<S>(lines: &mut LineStream<S>) -> Result<(), NegotiationError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    expect_prefix(lines.read_line().await?, "* OK", "IMAP greeting")?;
    lines.write_line("a CAPABILITY").await?;

    let capability = expect_prefix(
        lines.read_line().await?,
        "* CAPABILITY",
        "IMAP CAPABILITY response",
    )?;
    if !contains_word(&capability, "STARTTLS") {
        return Err(NegotiationError::StarttlsUnsupported { protocol: "IMAP" });
    }
    expect_prefix(lines.read_line().await?, "a OK", "IMAP CAPABILITY response")?;

    lines.write_line("a STARTTLS").await?;
    expect_prefix(lines.read_line().await?, "a OK", "IMAP STARTTLS response")?;
    Ok(())
}
