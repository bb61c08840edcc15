//! Parley signing keys.
//!
//! A single Ed25519 key pair signs every access token. It is generated on
//! first start and persisted as PEM files; later starts reuse it.

pub mod keys;
pub mod tokens;

pub use keys::KeyPair;
pub use tokens::TokenSigner;
