//! Outbound transport establishment.
//!
//! TCP connect, optionally upgraded to TLS. Certificates are validated
//! against the system trust store by default; `insecure_skip_verify` opts
//! in to a verifier that accepts anything, for legacy notification servers
//! still running self-signed certificates.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::router::ServerTarget;

/// Marker trait for the byte streams a connection can run over.
pub trait IrcStream: AsyncRead + AsyncWrite + Send + Unpin {}
impl<T: AsyncRead + AsyncWrite + Send + Unpin> IrcStream for T {}

/// A connected, possibly TLS-wrapped, byte stream.
pub type BoxedStream = Box<dyn IrcStream>;

/// Establish the transport for a target: TCP, then TLS when requested.
pub async fn connect(
    target: &ServerTarget,
    insecure_skip_verify: bool,
) -> Result<BoxedStream, DispatchError> {
    let tcp = TcpStream::connect((target.host.as_str(), target.port))
        .await
        .map_err(|e| DispatchError::Connect {
            host: target.host.clone(),
            port: target.port,
            source: e,
        })?;

    if !target.secure {
        return Ok(Box::new(tcp));
    }

    let tls = upgrade_to_tls(tcp, &target.host, !insecure_skip_verify).await?;
    Ok(Box::new(tls))
}

/// Upgrade a TCP stream to TLS for an outbound connection.
async fn upgrade_to_tls(
    tcp_stream: TcpStream,
    hostname: &str,
    verify_cert: bool,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>, DispatchError> {
    let config = if verify_cert {
        let mut roots = RootCertStore::empty();
        let certs = rustls_native_certs::load_native_certs();
        for cert in certs.certs {
            if let Err(e) = roots.add(cert) {
                warn!("Failed to add root cert: {}", e);
            }
        }
        for e in &certs.errors {
            warn!("Error loading native certs: {}", e);
        }
        ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth()
    } else {
        // Dangerous: skip certificate verification (self-signed legacy servers only)
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousNoVerifier))
            .with_no_client_auth()
    };

    let connector = TlsConnector::from(Arc::new(config));
    let server_name = ServerName::try_from(hostname.to_string()).map_err(|e| DispatchError::Tls {
        host: hostname.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })?;

    let tls_stream =
        connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| DispatchError::Tls {
                host: hostname.to_string(),
                source: e,
            })?;

    debug!(hostname = %hostname, verify = verify_cert, "TLS handshake completed");

    Ok(tls_stream)
}

/// Certificate verifier that accepts all certificates.
#[derive(Debug)]
struct DangerousNoVerifier;

impl ServerCertVerifier for DangerousNoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        tokio_rustls::rustls::crypto::aws_lc_rs::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
