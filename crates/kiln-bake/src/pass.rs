use std::fmt;

use kiln_config::PassFlags;
use serde::{Deserialize, Serialize};

/// Which lighting or output configuration a bake captures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PassType {
    /// Constant white lighting.
    Lit,
    /// Constant black lighting.
    Unlit,
    /// Normal-channel output.
    Normal,
}

impl PassType {
    /// Every pass, in execution order.
    pub const ALL: [PassType; 3] = [PassType::Lit, PassType::Unlit, PassType::Normal];

    /// Token used in file names.
    pub fn token(self) -> &'static str {
        match self {
            Self::Lit => "light",
            Self::Unlit => "dark",
            Self::Normal => "normal",
        }
    }

    /// Whether the pass uses the lighting override.
    pub fn is_shaded(self) -> bool {
        matches!(self, Self::Lit | Self::Unlit)
    }

    /// Passes switched on in `flags`, in execution order.
    pub fn enabled(flags: &PassFlags) -> Vec<PassType> {
        Self::ALL
            .into_iter()
            .filter(|pass| match pass {
                Self::Lit => flags.lit,
                Self::Unlit => flags.unlit,
                Self::Normal => flags.normal,
            })
            .collect()
    }
}

impl fmt::Display for PassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
