//! Trust bootstrap and chroot build orchestration.
//!
//! The certificate file is the only signal consulted: if it is missing, this
//! is the first chroot build of the mix and fresh signing material is minted
//! and handed to the builder; otherwise the existing material is reused.
//!
//! Failures come back as [`MixError`] values marked fatal. Terminating the
//! process is left to `main`.

use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    KeyUsagePurpose, SerialNumber,
};
use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime};

use crate::error::{MixError, MixResult};

/// Common name stamped on generated certificates.
pub const CERT_COMMON_NAME: &str = "Mixer Swupd Root";

/// Validity window of a generated certificate.
pub const CERT_VALID_DAYS: i64 = 365;

/// Freshly generated signing key pair and certificate template.
pub struct TrustMaterial {
    pub key_pair: KeyPair,
    pub template: CertificateParams,
}

/// Where a mix stands with respect to trust material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustState {
    NoTrustMaterial,
    TrustMaterialPresent,
}

/// How the caller's sign flag is treated when the certificate already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningPolicy {
    /// Reusing an existing certificate always signs, whatever the caller asked.
    #[default]
    ForceOnReuse,
    /// The caller's flag is passed through in both branches.
    HonorCaller,
}

impl SigningPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "force-on-reuse" | "force" => Some(Self::ForceOnReuse),
            "honor-caller" | "honor" => Some(Self::HonorCaller),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForceOnReuse => "force-on-reuse",
            Self::HonorCaller => "honor-caller",
        }
    }
}

/// Source of new signing material.
pub trait TrustGenerator {
    fn create_key_pair(&self) -> MixResult<KeyPair>;
    fn create_cert_template(&self) -> MixResult<CertificateParams>;
}

/// Default generator backed by `rcgen`.
#[derive(Debug, Clone, Default)]
pub struct RcgenGenerator;

impl TrustGenerator for RcgenGenerator {
    fn create_key_pair(&self) -> MixResult<KeyPair> {
        create_key_pair()
    }

    fn create_cert_template(&self) -> MixResult<CertificateParams> {
        Ok(create_cert_template())
    }
}

/// Generate a new signing key pair.
pub fn create_key_pair() -> MixResult<KeyPair> {
    KeyPair::generate().map_err(|e| MixError::KeyGeneration(e.to_string()))
}

/// Build a code-signing certificate template valid from now.
pub fn create_cert_template() -> CertificateParams {
    let mut params = CertificateParams::default();

    let not_before = OffsetDateTime::now_utc() - Duration::minutes(5);
    params.not_before = not_before;
    params.not_after = not_before + Duration::days(CERT_VALID_DAYS);
    params.is_ca = IsCa::NoCa;
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::CodeSigning];

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, CERT_COMMON_NAME);
    dn.push(DnType::OrganizationName, "Mixer");
    params.distinguished_name = dn;

    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let serial = (nanos.unsigned_abs() % u128::from(u64::MAX)).max(1) as u64;
    params.serial_number = Some(SerialNumber::from(serial));

    params
}

/// External collaborator that materializes the mix chroots.
pub trait ChrootBuilder {
    /// Build every chroot of the mix.
    ///
    /// `material` is `Some` only on the first build of a mix, when the
    /// builder is expected to persist it next to the certificate path.
    fn build_chroots(&mut self, material: Option<&TrustMaterial>, sign: bool)
        -> anyhow::Result<()>;
}

/// Decides once per mix whether signing material must be generated.
pub struct TrustBootstrap<G = RcgenGenerator> {
    cert_path: PathBuf,
    policy: SigningPolicy,
    generator: G,
}

impl TrustBootstrap<RcgenGenerator> {
    pub fn new(cert_path: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: cert_path.into(),
            policy: SigningPolicy::default(),
            generator: RcgenGenerator,
        }
    }
}

impl<G: TrustGenerator> TrustBootstrap<G> {
    pub fn with_policy(mut self, policy: SigningPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_generator<H: TrustGenerator>(self, generator: H) -> TrustBootstrap<H> {
        TrustBootstrap {
            cert_path: self.cert_path,
            policy: self.policy,
            generator,
        }
    }

    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    /// Current trust state; an unreadable certificate location is an error,
    /// not a missing certificate.
    pub fn state(&self) -> MixResult<TrustState> {
        let present = self
            .cert_path
            .try_exists()
            .map_err(|source| MixError::TrustCheck {
                path: self.cert_path.clone(),
                source,
            })?;
        Ok(if present {
            TrustState::TrustMaterialPresent
        } else {
            TrustState::NoTrustMaterial
        })
    }

    /// Run one chroot build, minting trust material first if none exists.
    ///
    /// Returns the state the mix was in before the call.
    pub fn ensure_chroots_built<B: ChrootBuilder + ?Sized>(
        &self,
        builder: &mut B,
        sign: bool,
    ) -> MixResult<TrustState> {
        let state = self.state()?;
        match state {
            TrustState::NoTrustMaterial => {
                println!("Generating certificate for signature validation...");
                let key_pair = self.generator.create_key_pair()?;
                let template = self.generator.create_cert_template()?;
                let material = TrustMaterial { key_pair, template };
                tracing::info!(cert = %self.cert_path.display(), sign, "bootstrapping trust material");
                builder
                    .build_chroots(Some(&material), sign)
                    .map_err(MixError::ChrootBuild)?;
            }
            TrustState::TrustMaterialPresent => {
                let sign = match self.policy {
                    SigningPolicy::ForceOnReuse => true,
                    SigningPolicy::HonorCaller => sign,
                };
                tracing::info!(cert = %self.cert_path.display(), sign, "reusing trust material");
                builder
                    .build_chroots(None, sign)
                    .map_err(MixError::ChrootBuild)?;
            }
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_policy_parse() {
        assert_eq!(
            SigningPolicy::parse("force-on-reuse"),
            Some(SigningPolicy::ForceOnReuse)
        );
        assert_eq!(
            SigningPolicy::parse(" Honor-Caller "),
            Some(SigningPolicy::HonorCaller)
        );
        assert_eq!(SigningPolicy::parse("sometimes"), None);
        assert_eq!(SigningPolicy::default(), SigningPolicy::ForceOnReuse);
    }

    #[test]
    fn test_cert_template_is_code_signing() {
        let t = create_cert_template();
        assert!(t.not_after > t.not_before);
        assert_eq!(t.extended_key_usages, vec![ExtendedKeyUsagePurpose::CodeSigning]);
        assert!(t.serial_number.is_some());
    }

    #[test]
    fn test_template_self_signs() {
        let key = create_key_pair().unwrap();
        let cert = create_cert_template().self_signed(&key).unwrap();
        assert!(cert.pem().starts_with("-----BEGIN CERTIFICATE-----"));
    }
}
