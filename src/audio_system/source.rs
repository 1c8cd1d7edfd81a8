//! Sound effect names
//!
//! The fixed vocabulary the application core may emit.
use std::fmt;
use std::str::FromStr;

use crate::error::DispatchError;

/// Symbolic identifier for a game event that needs audio feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SoundEffectName {
    /// Player cannon shot
    Fire,

    /// Player ship destroyed
    Explode,

    /// Invader hit
    Hit,

    /// UFO march, four-step cycle
    UfoStep1,
    UfoStep2,
    UfoStep3,
    UfoStep4,
}

impl SoundEffectName {
    /// Every name, in declaration order
    pub const ALL: [SoundEffectName; 7] = [
        SoundEffectName::Fire,
        SoundEffectName::Explode,
        SoundEffectName::Hit,
        SoundEffectName::UfoStep1,
        SoundEffectName::UfoStep2,
        SoundEffectName::UfoStep3,
        SoundEffectName::UfoStep4,
    ];

    /// Wire spelling used on the channel and in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffectName::Fire => "fire",
            SoundEffectName::Explode => "explode",
            SoundEffectName::Hit => "hit",
            SoundEffectName::UfoStep1 => "ufoStep1",
            SoundEffectName::UfoStep2 => "ufoStep2",
            SoundEffectName::UfoStep3 => "ufoStep3",
            SoundEffectName::UfoStep4 => "ufoStep4",
        }
    }
}

impl fmt::Display for SoundEffectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundEffectName {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundEffectName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| DispatchError::unknown(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_display() {
        assert_eq!(SoundEffectName::Fire.to_string(), "fire");
        assert_eq!(SoundEffectName::UfoStep3.to_string(), "ufoStep3");
    }

    #[test]
    fn test_name_parse() {
        assert_eq!("hit".parse::<SoundEffectName>().unwrap(), SoundEffectName::Hit);
        assert_eq!(
            "ufoStep4".parse::<SoundEffectName>().unwrap(),
            SoundEffectName::UfoStep4
        );
    }

    #[test]
    fn test_name_parse_is_case_sensitive() {
        let err = "UfoStep1".parse::<SoundEffectName>().unwrap_err();
        assert!(err.is_unknown_effect());
        assert!("Fire".parse::<SoundEffectName>().is_err());
    }

    #[test]
    fn test_unknown_name_parse_fails() {
        let err = "laser".parse::<SoundEffectName>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown sound effect: laser");
    }

    #[test]
    fn test_all_names_are_distinct() {
        let mut names: Vec<&str> = SoundEffectName::ALL.iter().map(|n| n.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SoundEffectName::ALL.len());
    }
}
