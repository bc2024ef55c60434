use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// 16-bit KNX group address (main/middle/sub)
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct GroupAddress {
    raw: u16,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid group address \"{input}\": {reason}")]
pub struct AddressParseError {
    pub input: String,
    pub reason: &'static str,
}

impl GroupAddress {
    /// Three-level address; `None` when a level is out of range.
    pub fn new(main: u8, middle: u8, sub: u8) -> Option<Self> {
        if main > 31 || middle > 7 {
            return None;
        }
        Some(Self {
            raw: (u16::from(main) << 11) | (u16::from(middle) << 8) | u16::from(sub),
        })
    }

    /// Two-level address: main 0..=31, sub 0..=2047.
    pub fn two_level(main: u8, sub: u16) -> Option<Self> {
        if main > 31 || sub > 0x07FF {
            return None;
        }
        Some(Self {
            raw: (u16::from(main) << 11) | sub,
        })
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> u16 {
        self.raw
    }
    pub fn main(&self) -> u8 {
        ((self.raw >> 11) & 0x1F) as u8
    }
    pub fn middle(&self) -> u8 {
        ((self.raw >> 8) & 0x07) as u8
    }
    pub fn sub(&self) -> u8 {
        (self.raw & 0xFF) as u8
    }
}

impl From<u16> for GroupAddress {
    fn from(raw: u16) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main(), self.middle(), self.sub())
    }
}

impl FromStr for GroupAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| AddressParseError {
            input: s.to_string(),
            reason,
        };
        if s.is_empty() {
            return Err(err("empty address"));
        }
        let parts: Vec<&str> = s.split('/').collect();
        let mut levels = Vec::with_capacity(parts.len());
        for p in &parts {
            // `u32::from_str` accepts a leading '+', addresses do not
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err("levels must be decimal numbers"));
            }
            let v = p.parse::<u32>().map_err(|_| err("level out of range"))?;
            levels.push(v);
        }
        match levels.as_slice() {
            [main, middle, sub] => {
                if *main > 31 {
                    return Err(err("main group must be 0-31"));
                }
                if *middle > 7 {
                    return Err(err("middle group must be 0-7"));
                }
                if *sub > 255 {
                    return Err(err("sub group must be 0-255"));
                }
                GroupAddress::new(*main as u8, *middle as u8, *sub as u8)
                    .ok_or_else(|| err("level out of range"))
            }
            [main, sub] => {
                if *main > 31 {
                    return Err(err("main group must be 0-31"));
                }
                if *sub > 0x07FF {
                    return Err(err("sub group must be 0-2047"));
                }
                GroupAddress::two_level(*main as u8, *sub as u16)
                    .ok_or_else(|| err("level out of range"))
            }
            [raw] => u16::try_from(*raw)
                .map(GroupAddress::from_raw)
                .map_err(|_| err("raw address must be 0-65535")),
            _ => Err(err("expected main/middle/sub, main/sub or a raw number")),
        }
    }
}

impl Serialize for GroupAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GroupAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
