//! Error types for the classification and trust/build core.
//!
//! Command handlers wrap these in `anyhow` with extra context; only `main`
//! decides how a failure maps to a process exit status.

use std::io;
use std::path::PathBuf;

/// Errors raised by heuristic classification and chroot orchestration.
#[derive(Debug, thiserror::Error)]
pub enum MixError {
    /// A heuristic list exists but could not be read.
    #[error("failed to read heuristic list {}", path.display())]
    HeuristicRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A missing heuristic list could not be created or written.
    #[error("failed to initialize heuristic list {}", path.display())]
    HeuristicInit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Whether a certificate exists could not be determined.
    #[error("failed to check trust material {}", path.display())]
    TrustCheck {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Signing key pair generation failed.
    #[error("failed to generate signing key pair: {0}")]
    KeyGeneration(String),

    /// The certificate template could not be self-signed.
    #[error("failed to sign certificate template: {0}")]
    CertificateSign(String),

    /// The chroot builder collaborator reported a failure.
    #[error("chroot construction failed: {0:#}")]
    ChrootBuild(anyhow::Error),
}

impl MixError {
    /// Fatal errors must terminate the overall build.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MixError::TrustCheck { .. }
                | MixError::KeyGeneration(_)
                | MixError::CertificateSign(_)
                | MixError::ChrootBuild(_)
        )
    }
}

pub type MixResult<T> = std::result::Result<T, MixError>;
