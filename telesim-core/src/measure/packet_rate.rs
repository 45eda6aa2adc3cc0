use logos::{Lexer, Logos};
use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

/// # Packet rate
///
/// A number of packets per second. Since the simulation advances one
/// logical second per tick, a rate of `n` is also the number of packets
/// (or of capacity units) for one tick.
///
/// ```
/// use telesim_core::measure::PacketRate;
///
/// let rate: PacketRate = "40pps".parse().unwrap();
/// assert_eq!(rate, PacketRate::new(40));
/// assert_eq!(rate.to_string(), "40pps");
///
/// // the unit is optional
/// assert_eq!("40".parse::<PacketRate>().unwrap(), rate);
///
/// // negative rates are rejected
/// assert!("-1".parse::<PacketRate>().is_err());
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PacketRate(u64);

/// Error returned when parsing a [`PacketRate`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketRateParseError {
    #[error("packet rate cannot be negative")]
    Negative,
    #[error("expecting to parse a number")]
    MissingNumber,
    #[error("invalid number: {0}")]
    InvalidNumber(#[from] ParseIntError),
    #[error("not expecting any other tokens to parse a packet rate")]
    TrailingTokens,
}

impl PacketRate {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn new(packets_per_sec: u64) -> Self {
        Self(packets_per_sec)
    }

    #[inline]
    pub const fn packets_per_sec(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for PacketRate {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PacketRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pps", self.0)
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum PacketRateToken {
    #[token("-")]
    Minus,

    #[regex("pps")]
    Pps,

    #[regex("[0-9]+")]
    Value,
}

impl FromStr for PacketRate {
    type Err = PacketRateParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, PacketRateToken>::new(s);

        let number = match lex.next() {
            Some(Ok(PacketRateToken::Minus)) => return Err(PacketRateParseError::Negative),
            Some(Ok(PacketRateToken::Value)) => lex.slice().parse::<u64>()?,
            _ => return Err(PacketRateParseError::MissingNumber),
        };

        match lex.next() {
            None => return Ok(Self(number)),
            Some(Ok(PacketRateToken::Pps)) => (),
            Some(_) => return Err(PacketRateParseError::TrailingTokens),
        }

        if lex.next().is_some() {
            return Err(PacketRateParseError::TrailingTokens);
        }

        Ok(Self(number))
    }
}
