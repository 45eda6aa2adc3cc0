use super::{PacketRate, PacketRateParseError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The capacity of a [`Link`]: a strictly positive [`PacketRate`].
///
/// A link can carry at most `capacity` packets per tick. Anything above
/// is diverted to the link's backlog queue.
///
/// ```
/// use telesim_core::measure::Capacity;
///
/// let capacity = Capacity::new(60).unwrap();
/// assert_eq!(capacity.get(), 60);
///
/// // a link must be able to carry something
/// assert!(Capacity::new(0).is_err());
/// assert!("0pps".parse::<Capacity>().is_err());
/// ```
///
/// [`Link`]: crate::link::Link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Capacity(PacketRate);

/// Error returned when constructing a [`Capacity`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("link capacity must be a strictly positive number of packets per second")]
    Zero,
    #[error("{0}")]
    Parse(#[from] PacketRateParseError),
}

impl Capacity {
    /// Create a validated capacity.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::Zero`] if `packets_per_sec` is `0`.
    pub fn new(packets_per_sec: u64) -> Result<Self, CapacityError> {
        if packets_per_sec == 0 {
            return Err(CapacityError::Zero);
        }
        Ok(Self(PacketRate::new(packets_per_sec)))
    }

    /// number of packets the link can carry in one tick
    #[inline]
    pub fn get(self) -> u64 {
        self.0.packets_per_sec()
    }

    #[inline]
    pub fn rate(self) -> PacketRate {
        self.0
    }
}

impl TryFrom<u64> for Capacity {
    type Error = CapacityError;
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<PacketRate> for Capacity {
    type Error = CapacityError;
    fn try_from(value: PacketRate) -> Result<Self, Self::Error> {
        Self::new(value.packets_per_sec())
    }
}

impl From<Capacity> for u64 {
    fn from(value: Capacity) -> Self {
        value.get()
    }
}

impl FromStr for Capacity {
    type Err = CapacityError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate: PacketRate = s.parse()?;
        Self::try_from(rate)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
