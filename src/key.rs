//! Key data abstraction.
//!
//! A [`Key`] is a protocol tag plus a fixed-size byte buffer.  Every key
//! type shares the same [`KEY_MAX_SIZE`] buffer; shorter protocols only
//! use a prefix of it (see [`KeyType::data_size`]).

use serde::{Deserialize, Serialize};

use crate::error::KeyError;
use crate::pulse::PulseProtocol;

/// Size of the shared key buffer (a full Dallas ROM id).
pub const KEY_MAX_SIZE: usize = 8;

/// Physical encoding of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum KeyType {
    /// Single-wire digital ROM id (DS1990 and compatibles).
    #[default]
    Dallas = 0,
    /// Cyfral pulse-width encoded key.
    Cyfral = 1,
    /// Metakom pulse-width encoded key.
    Metakom = 2,
}

impl KeyType {
    /// Number of meaningful bytes for this key type.
    pub const fn data_size(self) -> usize {
        match self {
            Self::Dallas => 8,
            Self::Cyfral => 2,
            Self::Metakom => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Dallas => "Dallas",
            Self::Cyfral => "Cyfral",
            Self::Metakom => "Metakom",
        }
    }

    /// True for the two comparator-decoded protocols.
    pub const fn is_pulse(self) -> bool {
        matches!(self, Self::Cyfral | Self::Metakom)
    }
}

impl From<PulseProtocol> for KeyType {
    fn from(protocol: PulseProtocol) -> Self {
        match protocol {
            PulseProtocol::Cyfral => Self::Cyfral,
            PulseProtocol::Metakom => Self::Metakom,
        }
    }
}

/// A key: protocol tag and raw id bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Key {
    key_type: KeyType,
    data: [u8; KEY_MAX_SIZE],
}

impl Key {
    pub const fn new(key_type: KeyType) -> Self {
        Self {
            key_type,
            data: [0; KEY_MAX_SIZE],
        }
    }

    /// Build a key from a type and up to [`KEY_MAX_SIZE`] bytes.
    pub fn with_data(key_type: KeyType, bytes: &[u8]) -> Result<Self, KeyError> {
        let mut key = Self::new(key_type);
        key.set_data(bytes)?;
        Ok(key)
    }

    pub const fn max_size() -> usize {
        KEY_MAX_SIZE
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn set_type(&mut self, key_type: KeyType) {
        self.key_type = key_type;
    }

    /// Full key buffer, including unused trailing bytes.
    pub fn data(&self) -> &[u8; KEY_MAX_SIZE] {
        &self.data
    }

    /// The bytes meaningful for the current key type.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.key_type.data_size()]
    }

    /// Replace the key bytes.  The remainder of the buffer is zeroed.
    pub fn set_data(&mut self, bytes: &[u8]) -> Result<(), KeyError> {
        if bytes.len() > KEY_MAX_SIZE {
            return Err(KeyError::TooLong { len: bytes.len() });
        }
        self.data = [0; KEY_MAX_SIZE];
        self.data[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Overwrite type and full buffer in one step.
    pub fn assign(&mut self, key_type: KeyType, data: &[u8; KEY_MAX_SIZE]) {
        self.key_type = key_type;
        self.data = *data;
    }
}
