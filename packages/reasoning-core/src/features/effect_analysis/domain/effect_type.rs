//! Effect lattice (C6/C7 shared vocabulary).

use serde::{Deserialize, Serialize};

/// Closed effect lattice. Ordering below reflects the fixed partial order:
/// `{Io, Log, DbWrite, Network} <= WriteState`, `{DbRead} <= ReadState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectType {
    Pure,
    ReadState,
    WriteState,
    Io,
    Log,
    DbRead,
    DbWrite,
    Network,
    GlobalMutation,
    Unknown,
}

impl EffectType {
    pub fn is_side_effect(&self) -> bool {
        !matches!(self, EffectType::Pure)
    }

    /// Parent in the fixed effect hierarchy, if any.
    pub fn parent(&self) -> Option<EffectType> {
        match self {
            EffectType::Io | EffectType::Log | EffectType::DbWrite | EffectType::Network => {
                Some(EffectType::WriteState)
            }
            EffectType::DbRead => Some(EffectType::ReadState),
            _ => None,
        }
    }

    pub fn severity_score(&self) -> u8 {
        match self {
            EffectType::Pure => 0,
            EffectType::Log => 1,
            EffectType::ReadState => 2,
            EffectType::DbRead => 3,
            EffectType::Io => 4,
            EffectType::WriteState => 5,
            EffectType::Network => 7,
            EffectType::DbWrite => 8,
            EffectType::GlobalMutation => 9,
            EffectType::Unknown => 10,
        }
    }
}

impl std::fmt::Display for EffectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EffectType::Pure => "PURE",
            EffectType::ReadState => "READ_STATE",
            EffectType::WriteState => "WRITE_STATE",
            EffectType::Io => "IO",
            EffectType::Log => "LOG",
            EffectType::DbRead => "DB_READ",
            EffectType::DbWrite => "DB_WRITE",
            EffectType::Network => "NETWORK",
            EffectType::GlobalMutation => "GLOBAL_MUTATION",
            EffectType::Unknown => "UNKNOWN",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_parents_match_spec() {
        assert_eq!(EffectType::Io.parent(), Some(EffectType::WriteState));
        assert_eq!(EffectType::Log.parent(), Some(EffectType::WriteState));
        assert_eq!(EffectType::DbWrite.parent(), Some(EffectType::WriteState));
        assert_eq!(EffectType::Network.parent(), Some(EffectType::WriteState));
        assert_eq!(EffectType::DbRead.parent(), Some(EffectType::ReadState));
        assert_eq!(EffectType::Pure.parent(), None);
    }

    #[test]
    fn unknown_is_most_severe() {
        assert_eq!(EffectType::Unknown.severity_score(), 10);
        assert!(EffectType::Unknown.severity_score() > EffectType::GlobalMutation.severity_score());
    }
}
