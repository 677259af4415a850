//! Serializer capability for the L2 disk cache (C4). The on-disk header
//! records which serializer wrote a payload so a reader picks the matching
//! implementation without negotiation.

use crate::errors::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerKind {
    /// Compact binary, used for the common case.
    MsgPack = 1,
    /// `serde_json`, kept for payloads that must stay human-inspectable.
    NativeSafe = 2,
}

impl SerializerKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::MsgPack),
            2 => Some(Self::NativeSafe),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

pub trait SerializerPort: Send + Sync {
    fn kind(&self) -> SerializerKind;
    fn encode(&self, value: &serde_json::Value) -> CoreResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> CoreResult<serde_json::Value>;
}
