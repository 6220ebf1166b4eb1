use sha1::{Digest, Sha1};
use std::time::{SystemTime, UNIX_EPOCH};

// RFC 6238 defaults; this tool supports no other parameterization.
const TIME_STEP: u64 = 30;
const DIGITS: u32 = 6;

// TOTP engine (RFC 4226 / RFC 6238, SHA-1, 6 digits)
#[derive(Debug, Clone)]
pub struct Totp {
    key: Vec<u8>,
}

impl Totp {
    pub fn new(key: Vec<u8>) -> Self {
        Self { key }
    }

    /// Code for the 30-second window containing `epoch_secs`.
    /// Pure: the same key and window always yield the same code.
    pub fn generate_at(&self, epoch_secs: u64) -> String {
        let counter = epoch_secs / TIME_STEP;
        let digest = hmac_sha1(&self.key, &counter.to_be_bytes());

        // Dynamic truncation: the low nibble of the last digest byte
        // selects a 4-byte window, top bit masked off.
        let offset = (digest[19] & 0xf) as usize;
        let code = ((digest[offset] & 0x7f) as u32) << 24
            | (digest[offset + 1] as u32) << 16
            | (digest[offset + 2] as u32) << 8
            | (digest[offset + 3] as u32);

        let otp = code % 10_u32.pow(DIGITS);
        format!("{:0width$}", otp, width = DIGITS as usize)
    }

    pub fn generate(&self) -> anyhow::Result<String> {
        let time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        Ok(self.generate_at(time))
    }

    /// Seconds until the current window rolls over, in [1, 30].
    pub fn time_remaining_at(epoch_secs: u64) -> u64 {
        TIME_STEP - (epoch_secs % TIME_STEP)
    }

    pub fn time_remaining() -> anyhow::Result<u64> {
        let time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        Ok(Self::time_remaining_at(time))
    }
}

// HMAC-SHA1
fn hmac_sha1(key: &[u8], message: &[u8]) -> [u8; 20] {
    let mut ipad = [0x36; 64];
    let mut opad = [0x5c; 64];

    // Keys longer than the block are hashed first; shorter keys are
    // zero-padded, so an empty key is a valid all-zero block.
    let mut key = key.to_vec();
    if key.len() > 64 {
        key = Sha1::digest(&key).to_vec();
    }
    key.resize(64, 0);

    for i in 0..64 {
        ipad[i] ^= key[i];
        opad[i] ^= key[i];
    }

    let mut hasher = Sha1::new();
    hasher.update(ipad);
    hasher.update(message);
    let inner_hash = hasher.finalize_reset();

    hasher.update(opad);
    hasher.update(inner_hash);
    hasher.finalize().into()
}
