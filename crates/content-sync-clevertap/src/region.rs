use std::fmt;
use std::str::FromStr;

use content_sync::ProviderError;

/// Data center an account lives in. Selects the API host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    Us1,
    #[default]
    Eu1,
    In1,
    Sg1,
    Aps3,
    Sk1,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Self::Us1,
        Self::Eu1,
        Self::In1,
        Self::Sg1,
        Self::Aps3,
        Self::Sk1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Us1 => "us1",
            Self::Eu1 => "eu1",
            Self::In1 => "in1",
            Self::Sg1 => "sg1",
            Self::Aps3 => "aps3",
            Self::Sk1 => "sk1",
        }
    }

    /// API host for the region, with a trailing slash.
    pub fn host(self) -> &'static str {
        match self {
            Self::Us1 => "https://us1.api.clevertap.com/",
            Self::Eu1 => "https://eu1.api.clevertap.com/",
            Self::In1 => "https://in1.api.clevertap.com/",
            Self::Sg1 => "https://sg1.api.clevertap.com/",
            Self::Aps3 => "https://aps3.api.clevertap.com/",
            Self::Sk1 => "https://sk1-staging-6.wzrkt.com/",
        }
    }
}

impl FromStr for Region {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| ProviderError::InvalidConfig(format!("unknown region: {s}")))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
