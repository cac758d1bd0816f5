//! TLS certificate chain retrieval
//!
//! Connects to a server, runs any STARTTLS negotiation, performs a verified
//! TLS handshake and returns the certificate chain the server presented.
//! The whole attempt runs under a single timeout; dropping the attempt on
//! expiry closes the socket.

use crate::checks::port;
use crate::checks::starttls::{self, StarttlsProtocol, DEFAULT_CLIENT_NAME};
use crate::models::{Certificate, Chain};
use crate::utils::ConnectError;
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// Install the ring crypto provider for rustls if no provider is set yet
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Everything needed to fetch one server's certificate chain
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    /// DNS name to connect to and verify against
    pub servername: String,
    /// Port specifier; see [`port::resolve`]
    pub port: Option<String>,
    /// STARTTLS protocol override; wins over the one the port implies
    pub protocol: Option<String>,
    /// Limit for connect through handshake; `None` or zero means no limit
    pub timeout: Option<Duration>,
    /// Trust these certificates instead of the Mozilla root store
    pub ca: Option<Vec<CertificateDer<'static>>>,
    /// Name sent in the SMTP `EHLO` command
    pub client_name: String,
}

impl ConnectRequest {
    pub fn new(servername: impl Into<String>) -> Self {
        Self {
            servername: servername.into(),
            port: None,
            protocol: None,
            timeout: None,
            ca: None,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }

    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn ca(mut self, ca: Vec<CertificateDer<'static>>) -> Self {
        self.ca = Some(ca);
        self
    }

    pub fn client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }
}

/// Connection parameters after all configuration has been validated
struct Resolved {
    port: u16,
    protocol: StarttlsProtocol,
    server_name: ServerName<'static>,
    connector: TlsConnector,
}

/// Fetch the certificate chain for `request`.
///
/// Configuration problems (unknown port or protocol, bad server name) are
/// reported before any connection is made. Exactly one socket is opened.
pub async fn fetch_chain(request: &ConnectRequest) -> Result<Chain, ConnectError> {
    let resolved = resolve(request)?;

    let attempt = establish(request, resolved);
    match request.timeout.filter(|t| !t.is_zero()) {
        Some(limit) => tokio::time::timeout(limit, attempt)
            .await
            .map_err(|_| ConnectError::Timeout)?,
        None => attempt.await,
    }
}

fn resolve(request: &ConnectRequest) -> Result<Resolved, ConnectError> {
    let port_info = port::resolve(request.port.as_deref())?;
    let protocol = match request.protocol.as_deref().filter(|p| !p.is_empty()) {
        Some(name) => name.parse::<StarttlsProtocol>()?,
        None => port_info.protocol.unwrap_or_default(),
    };

    let server_name = ServerName::try_from(request.servername.clone()).map_err(|_| {
        ConnectError::InvalidServerName {
            name: request.servername.clone(),
        }
    })?;

    let connector = build_connector(request.ca.as_deref())?;

    Ok(Resolved {
        port: port_info.port,
        protocol,
        server_name,
        connector,
    })
}

fn build_connector(ca: Option<&[CertificateDer<'static>]>) -> Result<TlsConnector, ConnectError> {
    install_crypto_provider();

    let root_store = match ca {
        Some(certs) => {
            let mut store = RootCertStore::empty();
            for cert in certs {
                store
                    .add(cert.clone())
                    .map_err(|e| ConnectError::TlsConfig {
                        message: format!("Invalid CA certificate: {}", e),
                    })?;
            }
            store
        }
        None => RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned()),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

async fn establish(request: &ConnectRequest, resolved: Resolved) -> Result<Chain, ConnectError> {
    let host = request.servername.as_str();

    tracing::debug!("Connecting to {}:{}", host, resolved.port);
    let stream = TcpStream::connect((host, resolved.port))
        .await
        .map_err(|e| ConnectError::Tcp {
            host: host.to_string(),
            port: resolved.port,
            message: e.to_string(),
        })?;

    let stream = starttls::negotiate(stream, resolved.protocol, &request.client_name).await?;

    tracing::debug!("Starting TLS handshake with {}", host);
    let tls_stream = resolved
        .connector
        .connect(resolved.server_name, stream)
        .await
        .map_err(classify_handshake_error)?;

    let (_, connection) = tls_stream.get_ref();
    let presented = connection
        .peer_certificates()
        .filter(|certs| !certs.is_empty())
        .ok_or(ConnectError::NoCertificates)?;

    let mut chain = Chain::from_der_iter(presented.iter().map(|c| c.as_ref()))?;
    let anchors = request
        .ca
        .as_deref()
        .unwrap_or(webpki_root_certs::TLS_SERVER_ROOT_CERTS);
    append_trust_anchor(&mut chain, anchors);

    tracing::debug!("Received {} certificate(s) from {}", chain.len(), host);
    Ok(chain)
}

/// Verification failures are authorization errors; everything else is a
/// handshake failure.
fn classify_handshake_error(err: std::io::Error) -> ConnectError {
    let tls_error = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>());

    match tls_error {
        Some(e @ rustls::Error::InvalidCertificate(_)) => ConnectError::Unauthorized {
            message: e.to_string(),
        },
        _ => ConnectError::Handshake {
            message: err.to_string(),
        },
    }
}

/// Complete the chain with the trusted root the server did not send.
/// `anchors` is the CA override, or the Mozilla roots as full certificates.
fn append_trust_anchor(chain: &mut Chain, anchors: &[CertificateDer<'static>]) {
    let Some(last) = chain.last() else {
        return;
    };
    if last.is_self_signed() {
        return;
    }

    let issuer = last.issuer.clone();
    let root = anchors
        .iter()
        .filter_map(|der| Certificate::from_der(der.as_ref()).ok())
        .find(|candidate| {
            candidate.subject == issuer && chain.iter().all(|c| c.raw_der != candidate.raw_der)
        });

    if let Some(root) = root {
        tracing::debug!("Appending trusted root {}", root.display_name());
        chain.push(root);
    }
}
