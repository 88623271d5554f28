//! RSA key pairs: generation, PEM round-trips, key wrapping, signatures.
//!
//! Key wrapping uses OAEP with SHA-256 for both the digest and the mask
//! generation function, no label. Signatures use PSS over SHA-256.
//! Private keys serialize as PKCS#8 PEM, public keys as SPKI PEM.

use crate::error::{CryptoError, CryptoResult};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{Oaep, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// RSA modulus size in bits.
pub const KEY_BITS: usize = 2048;

/// A generated RSA key pair.
pub struct KeyPair {
    pub private: RsaPrivateKey,
    pub public: RsaPublicKey,
}

/// Generates a fresh 2048-bit RSA key pair.
pub fn generate_key_pair() -> CryptoResult<KeyPair> {
    let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, KEY_BITS)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
    let public = private.to_public_key();
    Ok(KeyPair { private, public })
}

/// Serializes a private key to PKCS#8 PEM.
pub fn private_key_to_pem(key: &RsaPrivateKey) -> CryptoResult<String> {
    let pem = key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyFormat(e.to_string()))?;
    Ok(pem.as_str().to_owned())
}

/// Deserializes a PKCS#8 PEM private key.
pub fn private_key_from_pem(pem: &str) -> CryptoResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| CryptoError::KeyFormat(e.to_string()))
}

/// Serializes a public key to SPKI PEM.
pub fn public_key_to_pem(key: &RsaPublicKey) -> CryptoResult<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyFormat(e.to_string()))
}

/// Deserializes an SPKI PEM public key.
pub fn public_key_from_pem(pem: &str) -> CryptoResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| CryptoError::KeyFormat(e.to_string()))
}

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Wraps key material (a DEK) under a recipient's public key.
pub fn wrap_key(data: &[u8], public: &RsaPublicKey) -> CryptoResult<Vec<u8>> {
    public
        .encrypt(&mut rand::rngs::OsRng, oaep(), data)
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

/// Unwraps key material with the recipient's private key.
///
/// Fails if the ciphertext was not produced for this key or the OAEP
/// padding does not verify.
pub fn unwrap_key(wrapped: &[u8], private: &RsaPrivateKey) -> CryptoResult<Vec<u8>> {
    private
        .decrypt(oaep(), wrapped)
        .map_err(|_| CryptoError::Decryption("key unwrap failed (wrong key)".to_string()))
}

/// Signs `data` with PSS over SHA-256.
pub fn sign(data: &[u8], private: &RsaPrivateKey) -> CryptoResult<Vec<u8>> {
    let digest = Sha256::digest(data);
    private
        .sign_with_rng(&mut rand::rngs::OsRng, Pss::new::<Sha256>(), &digest)
        .map_err(|e| CryptoError::Signing(e.to_string()))
}

/// Verifies a signature. Returns false rather than erroring so callers can
/// branch on the expected-failure case.
pub fn verify(data: &[u8], signature: &[u8], public: &RsaPublicKey) -> bool {
    let digest = Sha256::digest(data);
    public.verify(Pss::new::<Sha256>(), &digest, signature).is_ok()
}

/// Checks that `public` is exactly the public half of `private`.
pub fn verify_key_pair(private: &RsaPrivateKey, public: &RsaPublicKey) -> bool {
    private.to_public_key() == *public
}
