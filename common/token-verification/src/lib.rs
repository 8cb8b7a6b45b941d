pub mod cache;
pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod jwks;
pub mod resolver;
pub mod signature;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::CachingKeySetSource;
pub use claims::{validate_claims, Audience, Claims};
pub use config::{AudienceShape, IssuerTemplate, VerifierConfig};
pub use error::{VerifyError, VerifyResult};
pub use extractors::{bearer_token, AuthContext};
pub use jwks::{JwksFetcher, Key, KeySet, KeySetSource, DEFAULT_AUTHORITY};
pub use resolver::{armor_certificate, resolve};
pub use signature::{RawClaims, TokenHeader, SUPPORTED_ALGORITHM};
pub use verifier::{TokenVerifier, TokenVerifierBuilder};
