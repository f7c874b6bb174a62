//! Webhook server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::Error;

/// PEM files used to serve HTTPS
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsPaths {
    /// Server certificate chain
    pub cert: PathBuf,
    /// Private key for the certificate
    pub key: PathBuf,
}

/// Configuration for the webhook server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// TLS material; plain HTTP when absent
    pub tls: Option<TlsPaths>,
}

impl ServerConfig {
    /// Build a config, checking that certificate and key are given together
    pub fn new(
        addr: SocketAddr,
        tls_cert: Option<PathBuf>,
        tls_key: Option<PathBuf>,
    ) -> Result<Self, Error> {
        let tls = match (tls_cert, tls_key) {
            (Some(cert), Some(key)) => Some(TlsPaths { cert, key }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(Error::server("config", "--tls-cert requires --tls-key"))
            }
            (None, Some(_)) => {
                return Err(Error::server("config", "--tls-key requires --tls-cert"))
            }
        };

        Ok(Self { addr, tls })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 9443)),
            tls: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        crate::DEFAULT_WEBHOOK_ADDR
            .parse()
            .expect("default address should parse")
    }

    #[test]
    fn default_matches_documented_address() {
        assert_eq!(ServerConfig::default().addr, addr());
    }

    #[test]
    fn tls_files_travel_together() {
        let config = ServerConfig::new(
            addr(),
            Some(PathBuf::from("/certs/tls.crt")),
            Some(PathBuf::from("/certs/tls.key")),
        )
        .expect("paired TLS files should be accepted");
        assert!(config.tls.is_some());

        let plain = ServerConfig::new(addr(), None, None).expect("plain HTTP is allowed");
        assert!(plain.tls.is_none());
    }

    #[test]
    fn lone_tls_file_is_rejected() {
        let err = ServerConfig::new(addr(), Some(PathBuf::from("/certs/tls.crt")), None)
            .expect_err("cert without key should fail");
        assert!(err.to_string().contains("--tls-key"));

        let err = ServerConfig::new(addr(), None, Some(PathBuf::from("/certs/tls.key")))
            .expect_err("key without cert should fail");
        assert!(err.to_string().contains("--tls-cert"));
    }
}
