//! Turns a published key into a verification key.
//!
//! Keys are trusted through their embedded signing certificate rather than the
//! bare `n`/`e` components: the first `x5c` entry is re-armored as PEM, parsed
//! as X.509, and its RSA subject public key becomes the decoding key.

use jsonwebtoken::DecodingKey;
use x509_parser::pem::parse_x509_pem;
use x509_parser::public_key::PublicKey;

use crate::error::{VerifyError, VerifyResult};
use crate::jwks::KeySet;

pub const PEM_HEADER: &str = "-----BEGIN CERTIFICATE-----";
pub const PEM_FOOTER: &str = "-----END CERTIFICATE-----";
pub const PEM_LINE_WIDTH: usize = 64;

/// Wrap a bare base64 DER certificate in PEM armor, 64 characters per line.
pub fn armor_certificate(der_base64: &str) -> String {
    let mut pem = String::with_capacity(
        PEM_HEADER.len() + PEM_FOOTER.len() + der_base64.len() + der_base64.len() / PEM_LINE_WIDTH + 3,
    );
    pem.push_str(PEM_HEADER);
    pem.push('\n');

    let mut rest = der_base64;
    while !rest.is_empty() {
        let split = rest
            .char_indices()
            .nth(PEM_LINE_WIDTH)
            .map_or(rest.len(), |(index, _)| index);
        let (line, tail) = rest.split_at(split);
        pem.push_str(line);
        pem.push('\n');
        rest = tail;
    }

    pem.push_str(PEM_FOOTER);
    pem
}

/// Locate `kid` in the key set and build its decoding key.
pub fn resolve(key_set: &KeySet, kid: &str) -> VerifyResult<DecodingKey> {
    let key = key_set
        .find(kid)
        .ok_or_else(|| VerifyError::KeyNotFound(kid.to_owned()))?;
    let certificate = key
        .x5c
        .first()
        .ok_or_else(|| VerifyError::invalid_key(kid, "certificate chain (x5c) is empty"))?;
    decoding_key_from_certificate(kid, certificate)
}

pub fn decoding_key_from_certificate(kid: &str, der_base64: &str) -> VerifyResult<DecodingKey> {
    let armored = armor_certificate(der_base64);
    let (_, pem) = parse_x509_pem(armored.as_bytes())
        .map_err(|err| VerifyError::invalid_key(kid, format!("invalid certificate encoding: {err}")))?;
    let certificate = pem
        .parse_x509()
        .map_err(|err| VerifyError::invalid_key(kid, format!("invalid certificate: {err}")))?;

    let spki = certificate.public_key();
    match spki.parsed() {
        Ok(PublicKey::RSA(_)) => {}
        Ok(_) => return Err(VerifyError::invalid_key(kid, "certificate key is not RSA")),
        Err(err) => {
            return Err(VerifyError::invalid_key(
                kid,
                format!("invalid subject public key: {err}"),
            ))
        }
    }

    // The SPKI bit string of an RSA key is the PKCS#1 RSAPublicKey DER.
    Ok(DecodingKey::from_rsa_der(spki.subject_public_key.data.as_ref()))
}
