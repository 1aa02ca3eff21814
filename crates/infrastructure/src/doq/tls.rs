//! rustls configuration for both ends of a DoQ connection.

use doq_gateway_domain::config::TlsConfig;
use doq_gateway_domain::{AlpnMode, DomainError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Certificate chain and private key the listener presents.
pub struct TlsIdentity {
    pub cert_chain: Vec<CertificateDer<'static>>,
    pub private_key: PrivateKeyDer<'static>,
}

impl TlsIdentity {
    /// Reads the configured PEM files, or generates a throwaway
    /// self-signed identity for `localhost` when none are configured.
    pub fn load(config: &TlsConfig) -> Result<Self, DomainError> {
        match (&config.cert_file, &config.key_file) {
            (Some(cert_file), Some(key_file)) => {
                let identity = Self::from_pem_files(cert_file, key_file)?;
                info!(cert = %cert_file.display(), "Loaded TLS certificate");
                Ok(identity)
            }
            _ => {
                warn!("No TLS certificate configured, generating a self-signed certificate for localhost");
                Self::self_signed(vec!["localhost".to_string()])
            }
        }
    }

    pub fn from_pem_files(cert_file: &Path, key_file: &Path) -> Result<Self, DomainError> {
        Ok(Self {
            cert_chain: load_certs(cert_file)?,
            private_key: load_private_key(key_file)?,
        })
    }

    pub fn self_signed(names: Vec<String>) -> Result<Self, DomainError> {
        let rcgen::CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(names)
            .map_err(|e| DomainError::Tls(format!("certificate generation failed: {}", e)))?;

        Ok(Self {
            cert_chain: vec![cert.der().clone()],
            private_key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der())),
        })
    }

    /// Leaf certificate, for clients that pin it as a root.
    pub fn leaf(&self) -> Option<&CertificateDer<'static>> {
        self.cert_chain.first()
    }
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, DomainError> {
    let file = File::open(path)
        .map_err(|e| DomainError::Tls(format!("cannot open {}: {}", path.display(), e)))?;
    let mut reader = BufReader::new(file);

    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DomainError::Tls(format!("invalid certificate PEM {}: {}", path.display(), e)))?;

    if certs.is_empty() {
        return Err(DomainError::Tls(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, DomainError> {
    let file = File::open(path)
        .map_err(|e| DomainError::Tls(format!("cannot open {}: {}", path.display(), e)))?;
    let mut reader = BufReader::new(file);

    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| DomainError::Tls(format!("invalid key PEM {}: {}", path.display(), e)))?
        .ok_or_else(|| DomainError::Tls(format!("no private key found in {}", path.display())))
}

fn ensure_crypto_provider() {
    // Fails only when a provider is already installed.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

pub fn server_config(
    identity: TlsIdentity,
    alpn_mode: AlpnMode,
) -> Result<rustls::ServerConfig, DomainError> {
    ensure_crypto_provider();

    let mut config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(identity.cert_chain, identity.private_key)
        .map_err(|e| DomainError::Tls(e.to_string()))?;
    config.alpn_protocols = alpn_mode.alpn_protocols();

    Ok(config)
}

pub fn client_config(
    alpn_mode: AlpnMode,
    insecure_skip_verify: bool,
    extra_roots: &[CertificateDer<'static>],
) -> Result<rustls::ClientConfig, DomainError> {
    ensure_crypto_provider();

    let mut config = if insecure_skip_verify {
        rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(SkipServerVerification::new()))
            .with_no_client_auth()
    } else {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        for cert in extra_roots {
            roots
                .add(cert.clone())
                .map_err(|e| DomainError::Tls(format!("invalid root certificate: {}", e)))?;
        }
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth()
    };
    config.alpn_protocols = alpn_mode.alpn_protocols();

    Ok(config)
}

/// Accepts any server certificate but still checks handshake signatures.
#[derive(Debug)]
struct SkipServerVerification(Arc<CryptoProvider>);

impl SkipServerVerification {
    fn new() -> Self {
        Self(Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
    }
}

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
