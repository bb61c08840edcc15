use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ed25519_dalek::SigningKey;
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey};
use rand_core::OsRng;
use tracing::info;

pub const PRIVATE_KEY_FILE: &str = "id_ed25519_priv.pem";
pub const PUBLIC_KEY_FILE: &str = "id_ed25519_pub.pem";

/// PEM-encoded Ed25519 key pair (PKCS#8 private key, SPKI public key).
#[derive(Clone)]
pub struct KeyPair {
    pub private_pem: String,
    pub public_pem: String,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Result<Self> {
        let signing_key = SigningKey::generate(&mut OsRng);

        let private_pem = signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| anyhow!("Failed to encode private key: {}", e))?
            .to_string();
        let public_pem = signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| anyhow!("Failed to encode public key: {}", e))?;

        Ok(Self {
            private_pem,
            public_pem,
        })
    }

    /// Load the pair from `dir`, generating and writing it first if either
    /// file is missing.
    pub fn load_or_generate(dir: &Path) -> Result<Self> {
        let private_path = dir.join(PRIVATE_KEY_FILE);
        let public_path = dir.join(PUBLIC_KEY_FILE);

        if private_path.exists() && public_path.exists() {
            let private_pem = fs::read_to_string(&private_path)
                .with_context(|| format!("reading {}", private_path.display()))?;
            let public_pem = fs::read_to_string(&public_path)
                .with_context(|| format!("reading {}", public_path.display()))?;

            SigningKey::from_pkcs8_pem(&private_pem)
                .map_err(|e| anyhow!("Corrupt private key {}: {}", private_path.display(), e))?;

            info!("Loaded signing keys from {}", dir.display());
            return Ok(Self {
                private_pem,
                public_pem,
            });
        }

        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let pair = Self::generate()?;
        write_private(&private_path, &pair.private_pem)
            .with_context(|| format!("writing {}", private_path.display()))?;
        fs::write(&public_path, &pair.public_pem)
            .with_context(|| format!("writing {}", public_path.display()))?;

        info!("Generated new signing key pair in {}", dir.display());
        Ok(pair)
    }
}

/// Owner-only from creation; a leftover file is narrowed before any key
/// bytes land in it.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let file = options.open(path)?;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file
    };
    #[cfg(not(unix))]
    let mut file = options.open(path)?;

    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
