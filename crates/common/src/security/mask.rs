use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// A single capability that can be granted or denied on an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Read,
    Write,
    Execute,
}

impl Permission {
    pub const ALL: [Permission; 3] = [Permission::Read, Permission::Write, Permission::Execute];

    fn index(self) -> u32 {
        match self {
            Permission::Read => 0,
            Permission::Write => 1,
            Permission::Execute => 2,
        }
    }

    pub fn grant(self) -> Mask {
        Mask::from_bits_retain(1 << (2 * self.index()))
    }

    pub fn deny(self) -> Mask {
        Mask::from_bits_retain(1 << (2 * self.index() + 1))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "READ"),
            Permission::Write => write!(f, "WRITE"),
            Permission::Execute => write!(f, "EXECUTE"),
        }
    }
}

bitflags! {
    /**
     * Masks
     * =====
     * A mask is a bitset of capability decisions. Every capability
     *  owns a pair of bits: an even "grant" bit and the odd "deny"
     *  bit right above it.
     * An access control entry may record any combination of these.
     *  An *effective* mask, as reported on resolved entities, only
     *  ever carries grant bits: see [`Mask::granted`].
     * Zero means no capability at all.
     */
    #[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
    pub struct Mask: u32 {
        const READ = 1;
        const NO_READ = 1 << 1;
        const WRITE = 1 << 2;
        const NO_WRITE = 1 << 3;
        const EXECUTE = 1 << 4;
        const NO_EXECUTE = 1 << 5;
    }
}

impl Mask {
    pub const NONE: Mask = Mask::empty();
    /// Every capability granted
    pub const ALL: Mask = Mask::READ.union(Mask::WRITE).union(Mask::EXECUTE);

    /// The decision this mask records for a capability.
    ///  A deny bit wins over a grant bit recorded in the same mask.
    pub fn decision(self, permission: Permission) -> Option<bool> {
        if self.contains(permission.deny()) {
            Some(false)
        } else if self.contains(permission.grant()) {
            Some(true)
        } else {
            None
        }
    }

    pub fn grants(self, permission: Permission) -> bool {
        self.decision(permission) == Some(true)
    }

    pub fn denies(self, permission: Permission) -> bool {
        self.decision(permission) == Some(false)
    }

    /// Only the capabilities this mask actually grants
    pub fn granted(self) -> Mask {
        Permission::ALL
            .into_iter()
            .filter(|p| self.grants(*p))
            .fold(Mask::NONE, |acc, p| acc | p.grant())
    }
}

impl Default for Mask {
    fn default() -> Self {
        Mask::NONE
    }
}

impl From<Permission> for Mask {
    fn from(permission: Permission) -> Self {
        permission.grant()
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        f.write_str(&names.join("|"))
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask({self})")
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MaskParseError {
    #[error("unknown permission: {0}")]
    UnknownPermission(String),
    #[error("mask out of range: {0}")]
    OutOfRange(u32),
}

impl FromStr for Mask {
    type Err = MaskParseError;

    /// Parses either a raw integer (`5`) or `|` / `+` separated names (`READ|NO_WRITE`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(bits) = s.parse::<u32>() {
            return Mask::from_bits(bits).ok_or(MaskParseError::OutOfRange(bits));
        }

        let mut mask = Mask::NONE;
        for part in s.split(['|', '+']).map(str::trim) {
            let upper = part.to_ascii_uppercase();
            if upper == "NONE" {
                continue;
            }
            mask |= Mask::from_name(&upper)
                .ok_or_else(|| MaskParseError::UnknownPermission(part.to_string()))?;
        }
        Ok(mask)
    }
}
