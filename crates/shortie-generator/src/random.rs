use crate::error::GeneratorError;
use crate::Generator;
use rand::rngs::OsRng;
use rand::RngCore;
use shortie_core::ShortId;
use std::fmt::Write;

/// Number of random bytes behind every generated id (48 bits).
pub const ID_BYTES: usize = 6;

/// Length of a generated id once rendered as hex.
pub const ID_LENGTH: usize = ID_BYTES * 2;

/// Generates ids from the operating system CSPRNG, rendered as lowercase hex.
///
/// 48 bits keeps ids short, at the price of collisions becoming likely once
/// the store holds millions of records. Collisions are resolved by the
/// callers, never here.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> Result<ShortId, GeneratorError> {
        let mut bytes = [0u8; ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| GeneratorError::Entropy(e.to_string()))?;
        Ok(ShortId::new_unchecked(encode_hex(&bytes)))
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_twelve_lowercase_hex_chars() {
        let generator = RandomGenerator::new();

        for _ in 0..100 {
            let id = generator.generate().unwrap();
            assert_eq!(id.as_str().len(), ID_LENGTH);
            assert!(id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn ids_pass_public_validation() {
        let id = RandomGenerator::new().generate().unwrap();
        assert!(ShortId::new(id.as_str()).is_ok());
    }

    #[test]
    fn ids_differ_between_calls() {
        let generator = RandomGenerator::new();
        let ids: HashSet<_> = (0..1_000).map(|_| generator.generate().unwrap()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn hex_encoding_pads_each_byte() {
        assert_eq!(encode_hex(&[0x00, 0x0f, 0xab, 0xff, 0x10, 0x01]), "000fabff1001");
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
