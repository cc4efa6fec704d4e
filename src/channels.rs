//! Channel identifiers and the board's named-channel table.
//!
//! Single source of truth for channel wiring.  The command surface and the
//! controller both resolve names and polarity here.  The table is fixed:
//! existing scripts address channels by these names.

use core::fmt;

/// Number of PWM outputs on the device.
pub const CHANNEL_COUNT: usize = 16;

/// Symbolic name of every channel, indexed by channel number.
pub const CHANNEL_NAMES: [&str; CHANNEL_COUNT] = [
    "PWM0", "PWM1", "PWM2", "PWM3", "PWM4", // general purpose
    "SGN1", "SGN0", // active-low signal lines
    "DC3", "DC2", "DC1", // DC motor drivers
    "LED1", "LED2", "LED3", "LED4", "LED5", "LED6",
];

/// Channels driving active-low signal hardware (SGN1, SGN0).
const INVERTED: [u8; 2] = [5, 6];

/// A validated channel number in `0..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Validate a raw channel number.  Anything outside `0..=15` is `None`.
    pub fn new(ch: i32) -> Option<Self> {
        u8::try_from(ch)
            .ok()
            .filter(|&c| (c as usize) < CHANNEL_COUNT)
            .map(Self)
    }

    /// Resolve a symbolic name from [`CHANNEL_NAMES`].  Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        CHANNEL_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| Self(i as u8))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        CHANNEL_NAMES[self.0 as usize]
    }

    /// True for the two channels whose percentage is the complement of the
    /// raw duty value.
    pub fn is_inverted(self) -> bool {
        INVERTED.contains(&self.0)
    }

    /// Iterate all 16 channels in register order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..CHANNEL_COUNT as u8).map(Self)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

/// How a caller refers to a channel: by number or by symbolic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRef<'a> {
    Index(i32),
    Name(&'a str),
}

impl ChannelRef<'_> {
    /// Tolerant resolution: unknown names and out-of-range numbers are `None`.
    pub fn resolve(self) -> Option<ChannelId> {
        match self {
            Self::Index(ch) => ChannelId::new(ch),
            Self::Name(name) => ChannelId::from_name(name),
        }
    }
}

impl From<i32> for ChannelRef<'_> {
    fn from(ch: i32) -> Self {
        Self::Index(ch)
    }
}

impl<'a> From<&'a str> for ChannelRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<ChannelId> for ChannelRef<'_> {
    fn from(ch: ChannelId) -> Self {
        Self::Index(i32::from(ch.0))
    }
}
