//! Anonymous cart tokens.
//!
//! A token is handed to the client once and never stored; carts keep the
//! SHA-256 digest of the formatted token.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

/// Cart token prefix.
pub const CART_TOKEN_PREFIX: &str = "ct";

/// Current token version segment.
pub const CART_TOKEN_VERSION: &str = "v1";

/// Number of secret bytes encoded in a token.
pub const CART_TOKEN_SECRET_BYTES: usize = 32;

const CART_TOKEN_SECRET_HEX_CHARS: usize = CART_TOKEN_SECRET_BYTES * 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartTokenError {
    #[error("cart token format is invalid")]
    InvalidFormat,

    #[error("cart token uses an unsupported version")]
    UnsupportedVersion,

    #[error("cart token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[derive(Clone)]
pub struct CartToken {
    secret: [u8; CART_TOKEN_SECRET_BYTES],
}

impl CartToken {
    /// Mint a token from the operating system's random source.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0_u8; CART_TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut secret);

        Self { secret }
    }

    #[must_use]
    pub const fn from_bytes(secret: [u8; CART_TOKEN_SECRET_BYTES]) -> Self {
        Self { secret }
    }

    /// Parse a `ct_v1_<hex>` token as presented by a client.
    ///
    /// # Errors
    ///
    /// Returns a [`CartTokenError`] describing the first malformed segment.
    pub fn parse(token: &str) -> Result<Self, CartTokenError> {
        let mut parts = token.trim().splitn(3, '_');

        let prefix = parts.next().ok_or(CartTokenError::InvalidFormat)?;
        let version = parts.next().ok_or(CartTokenError::InvalidFormat)?;
        let secret_hex = parts.next().ok_or(CartTokenError::InvalidFormat)?;

        if prefix != CART_TOKEN_PREFIX {
            return Err(CartTokenError::InvalidFormat);
        }

        if version != CART_TOKEN_VERSION {
            return Err(CartTokenError::UnsupportedVersion);
        }

        let secret = decode_secret_hex(secret_hex).ok_or(CartTokenError::InvalidSecretEncoding)?;

        Ok(Self { secret })
    }

    /// The token as given to the client. Treat the result as a credential.
    #[must_use]
    pub fn reveal(&self) -> String {
        format!(
            "{CART_TOKEN_PREFIX}_{CART_TOKEN_VERSION}_{}",
            encode_secret_hex(&self.secret)
        )
    }

    /// Lowercase hex SHA-256 of the formatted token; the only form persisted.
    #[must_use]
    pub fn hash(&self) -> String {
        let mut token = self.reveal();
        let digest = Sha256::digest(token.as_bytes());

        token.zeroize();

        format!("{digest:x}")
    }
}

impl fmt::Debug for CartToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CartToken(**redacted**)")
    }
}

impl Drop for CartToken {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

fn encode_secret_hex(secret: &[u8; CART_TOKEN_SECRET_BYTES]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut encoded = String::with_capacity(CART_TOKEN_SECRET_HEX_CHARS);

    for byte in secret {
        encoded.push(HEX[usize::from(byte >> 4)] as char);
        encoded.push(HEX[usize::from(byte & 0x0f)] as char);
    }

    encoded
}

fn decode_secret_hex(secret_hex: &str) -> Option<[u8; CART_TOKEN_SECRET_BYTES]> {
    if secret_hex.len() != CART_TOKEN_SECRET_HEX_CHARS {
        return None;
    }

    let mut secret = [0_u8; CART_TOKEN_SECRET_BYTES];

    for (byte, pair) in secret.iter_mut().zip(secret_hex.as_bytes().chunks_exact(2)) {
        *byte = (decode_hex_nibble(pair[0])? << 4) | decode_hex_nibble(pair[1])?;
    }

    Some(secret)
}

fn decode_hex_nibble(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn reveal_uses_prefix_version_and_hex_secret() {
        let token = CartToken::from_bytes([0xAB; CART_TOKEN_SECRET_BYTES]);
        let revealed = token.reveal();

        assert!(revealed.starts_with("ct_v1_"));
        assert_eq!(revealed.len(), "ct_v1_".len() + CART_TOKEN_SECRET_HEX_CHARS);
        assert!(revealed.ends_with("abab"));
    }

    #[test]
    fn parsed_token_hashes_like_the_original() -> TestResult {
        let token = CartToken::generate();
        let parsed = CartToken::parse(&token.reveal())?;

        assert_eq!(parsed.hash(), token.hash());

        Ok(())
    }

    #[test]
    fn hash_is_hex_sha256() {
        let hash = CartToken::from_bytes([0; CART_TOKEN_SECRET_BYTES]).hash();

        assert_eq!(hash.len(), 64);
        assert!(hash.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(CartToken::generate().hash(), CartToken::generate().hash());
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        let token = format!("lt_v1_{}", "00".repeat(CART_TOKEN_SECRET_BYTES));

        assert_eq!(
            CartToken::parse(&token).err(),
            Some(CartTokenError::InvalidFormat)
        );
    }

    #[test]
    fn parse_rejects_unknown_version() {
        let token = format!("ct_v2_{}", "00".repeat(CART_TOKEN_SECRET_BYTES));

        assert_eq!(
            CartToken::parse(&token).err(),
            Some(CartTokenError::UnsupportedVersion)
        );
    }

    #[test]
    fn parse_rejects_short_or_non_hex_secret() {
        assert_eq!(
            CartToken::parse("ct_v1_abcd").err(),
            Some(CartTokenError::InvalidSecretEncoding)
        );

        let token = format!("ct_v1_{}", "zz".repeat(CART_TOKEN_SECRET_BYTES));

        assert_eq!(
            CartToken::parse(&token).err(),
            Some(CartTokenError::InvalidSecretEncoding)
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let token = CartToken::from_bytes([0xAB; CART_TOKEN_SECRET_BYTES]);

        assert_eq!(format!("{token:?}"), "CartToken(**redacted**)");
    }
}
