use anyhow::{anyhow, Result};
use base64::prelude::*;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Position of the last check-in on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorData {
    pub checked_in_at: i64,
    pub id: i64,
}

/// Signs and verifies opaque pagination cursors (`payload.signature`, both base64url)
#[derive(Clone)]
pub struct CursorCodec {
    key: Vec<u8>,
}

impl CursorCodec {
    /// Without a secret a random key is used and cursors don't survive restarts
    pub fn new(secret: Option<&str>) -> Self {
        let key = match secret {
            Some(s) if !s.is_empty() => s.as_bytes().to_vec(),
            _ => {
                tracing::warn!("CURSOR_HMAC_SECRET not set, using a random cursor signing key");
                rand::random::<[u8; 32]>().to_vec()
            }
        };
        Self { key }
    }

    fn mac(&self) -> Result<Hmac<Sha256>> {
        Hmac::<Sha256>::new_from_slice(&self.key).map_err(|e| anyhow!("Failed to create HMAC: {}", e))
    }

    pub fn encode(&self, data: &CursorData) -> Result<String> {
        let json = serde_json::to_string(data)?;
        let payload = BASE64_URL_SAFE_NO_PAD.encode(json.as_bytes());

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    pub fn decode(&self, cursor: &str) -> Result<CursorData> {
        let (payload, signature_b64) = cursor
            .split_once('.')
            .filter(|(_, sig)| !sig.contains('.'))
            .ok_or_else(|| anyhow!("Invalid cursor format"))?;

        let provided = BASE64_URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| anyhow!("Invalid cursor signature encoding"))?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        if !bool::from(expected.ct_eq(&provided[..])) {
            return Err(anyhow!("Cursor signature verification failed"));
        }

        let json = BASE64_URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| anyhow!("Invalid cursor payload encoding"))?;
        serde_json::from_slice(&json).map_err(|_| anyhow!("Invalid cursor data"))
    }
}
