//! Shared test fixtures: generated certificates and a local scripted server

#![allow(dead_code)]

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair, SerialNumber,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use sslexpiry::checks::tls::install_crypto_provider;
use std::net::SocketAddr;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;

pub struct TestCa {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl TestCa {
    pub fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }
}

pub struct TestLeaf {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl TestLeaf {
    pub fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }

    pub fn private_key(&self) -> PrivateKeyDer<'static> {
        PrivatePkcs8KeyDer::from(self.key.serialize_der()).into()
    }
}

fn name(cn: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    dn.push(DnType::OrganizationName, "Test");
    dn
}

pub fn days_from_now(days: i64) -> OffsetDateTime {
    OffsetDateTime::now_utc() + Duration::days(days)
}

pub fn generate_ca(cn: &str) -> TestCa {
    generate_ca_valid(cn, days_from_now(-10), days_from_now(365))
}

pub fn generate_ca_valid(
    cn: &str,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> TestCa {
    let key = KeyPair::generate().unwrap();
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = name(cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.not_before = not_before;
    params.not_after = not_after;
    params.serial_number = Some(SerialNumber::from_slice(&[0x10, 0x01]));
    let cert = params.self_signed(&key).unwrap();
    TestCa { cert, key }
}

pub fn generate_leaf(
    ca: &TestCa,
    host: &str,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> TestLeaf {
    let key = KeyPair::generate().unwrap();
    let mut params = CertificateParams::new(vec![host.to_string()]).unwrap();
    params.distinguished_name = name(host);
    params.not_before = not_before;
    params.not_after = not_after;
    params.serial_number = Some(SerialNumber::from_slice(&[0x0a, 0xbc]));
    let cert = params.signed_by(&key, &ca.cert, &ca.key).unwrap();
    TestLeaf { cert, key }
}

/// What the server does on the plaintext socket before TLS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Go straight to TLS
    Tls,
    Smtp,
    SmtpWithoutStarttls,
    Imap,
    /// Never send anything; wait for the client to hang up
    Silent,
}

async fn read_line<R: AsyncBufReadExt + Unpin>(reader: &mut R, transcript: &mut Vec<String>) {
    let mut line = String::new();
    if reader.read_line(&mut line).await.unwrap_or(0) > 0 {
        transcript.push(line.trim_end().to_string());
    }
}

/// Run the plaintext part of `script`; returns whether to continue to TLS
async fn run_script(socket: &mut TcpStream, script: Script, transcript: &mut Vec<String>) -> bool {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);

    match script {
        Script::Tls => true,
        Script::Smtp | Script::SmtpWithoutStarttls => {
            writer.write_all(b"220 foo ESMTP\r\n").await.unwrap();
            read_line(&mut reader, transcript).await;
            if script == Script::SmtpWithoutStarttls {
                writer.write_all(b"250-foo\r\n250 PIPELINING\r\n").await.unwrap();
                read_line(&mut reader, transcript).await;
                return false;
            }
            writer
                .write_all(b"250-foo\r\n250-STARTTLS\r\n250 PIPELINING\r\n")
                .await
                .unwrap();
            read_line(&mut reader, transcript).await;
            writer
                .write_all(b"220 2.0.0 Ready to start TLS\r\n")
                .await
                .unwrap();
            true
        }
        Script::Imap => {
            writer.write_all(b"* OK Ready\r\n").await.unwrap();
            read_line(&mut reader, transcript).await;
            writer
                .write_all(b"* CAPABILITY IMAP4rev1 IDLE STARTTLS\r\na OK\r\n")
                .await
                .unwrap();
            read_line(&mut reader, transcript).await;
            writer.write_all(b"a OK Begin TLS now\r\n").await.unwrap();
            true
        }
        Script::Silent => {
            let mut buf = [0u8; 64];
            if let Ok(0) = reader.read(&mut buf).await {
                transcript.push("EOF".to_string());
            }
            false
        }
    }
}

/// Start a one-shot server on localhost. The handle yields every line the
/// client sent during the plaintext phase.
pub async fn spawn_server(
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
    script: Script,
) -> (SocketAddr, JoinHandle<Vec<String>>) {
    install_crypto_provider();
    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(chain, key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut transcript = Vec::new();
        let (mut socket, _) = listener.accept().await.unwrap();
        if run_script(&mut socket, script, &mut transcript).await {
            if let Ok(mut tls) = acceptor.accept(socket).await {
                let mut buf = [0u8; 64];
                let _ = tls.read(&mut buf).await;
            }
        }
        transcript
    });

    (addr, handle)
}
