//! Module for working with snowflake IDs.
//!
//! A snowflake packs, from the most significant bit down, 42 bits of
//! milliseconds since [`EPOCH`], a 10 bit worker id and a 12 bit sequence.
//!
//! See <https://en.wikipedia.org/wiki/Snowflake_ID>

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use std::{
    fmt::{Display, Formatter},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime, macros::datetime};

pub const EPOCH: OffsetDateTime = datetime!(2025-01-01 00:00 UTC);

pub const TIMESTAMP_OFFSET: u32 = 22;
pub const TIMESTAMP_LENGTH: u32 = 42;

pub const WORKER_ID_OFFSET: u32 = 12;
pub const WORKER_ID_LENGTH: u32 = 10;

pub const SEQUENCE_OFFSET: u32 = 0;
pub const SEQUENCE_LENGTH: u32 = 12;

const fn mask(length: u32) -> u64 {
    (1 << length) - 1
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum SnowflakeTimeError {
    #[error("Specified time was before the snowflake epoch.")]
    TimeBeforeEpoch,
    #[error("Resulting timestamp uses too many bits.")]
    TimestampTooLarge,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Worker id {0} does not fit into {WORKER_ID_LENGTH} bits")]
pub struct WorkerIdOutOfRangeError(pub u16);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct WorkerId(u16);

impl WorkerId {
    #[must_use]
    pub fn new(id: u16) -> Option<Self> {
        (u64::from(id) <= mask(WORKER_ID_LENGTH)).then_some(Self(id))
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for WorkerId {
    type Error = WorkerIdOutOfRangeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(WorkerIdOutOfRangeError(value))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct Snowflake(u64);

impl Snowflake {
    #[must_use]
    pub fn new(inner: u64) -> Self {
        Self(inner)
    }

    pub fn from_parts(
        time: OffsetDateTime,
        worker_id: WorkerId,
        sequence: u16,
    ) -> Result<Self, SnowflakeTimeError> {
        let millis = (time - EPOCH).whole_milliseconds();
        let millis = u64::try_from(millis).map_err(|_| {
            if millis < 0 {
                SnowflakeTimeError::TimeBeforeEpoch
            } else {
                SnowflakeTimeError::TimestampTooLarge
            }
        })?;
        if millis > mask(TIMESTAMP_LENGTH) {
            return Err(SnowflakeTimeError::TimestampTooLarge);
        }

        Ok(Self(
            millis << TIMESTAMP_OFFSET
                | u64::from(worker_id.get()) << WORKER_ID_OFFSET
                | (u64::from(sequence) & mask(SEQUENCE_LENGTH)) << SEQUENCE_OFFSET,
        ))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn timestamp(self) -> OffsetDateTime {
        let millis = (self.0 >> TIMESTAMP_OFFSET) & mask(TIMESTAMP_LENGTH);
        // 42 bits always fit into an i64
        EPOCH + Duration::milliseconds(millis.cast_signed())
    }

    #[must_use]
    pub fn worker_id(self) -> WorkerId {
        #[allow(clippy::cast_possible_truncation)]
        WorkerId(((self.0 >> WORKER_ID_OFFSET) & mask(WORKER_ID_LENGTH)) as u16)
    }

    #[must_use]
    pub fn sequence(self) -> u16 {
        #[allow(clippy::cast_possible_truncation)]
        let sequence = ((self.0 >> SEQUENCE_OFFSET) & mask(SEQUENCE_LENGTH)) as u16;
        sequence
    }
}

impl Display for Snowflake {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Snowflake {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str(s).map(Self)
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Snowflake> for u64 {
    fn from(value: Snowflake) -> Self {
        value.get()
    }
}

// Browsers parse JSON numbers as doubles, so snowflakes travel as strings.
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("a snowflake as a string or unsigned integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Snowflake(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

/// Hands out strictly increasing snowflakes for one worker.
///
/// Ids never repeat: a clock that stands still or goes backwards keeps using
/// the timestamp of the last id, and once the sequence of a millisecond is
/// exhausted the timestamp moves on to the next millisecond.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct SnowflakeGenerator {
    worker_id: WorkerId,
    last: Option<Snowflake>,
}

impl SnowflakeGenerator {
    #[must_use]
    pub fn new(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            last: None,
        }
    }

    #[must_use]
    pub fn worker_id(self) -> WorkerId {
        self.worker_id
    }

    pub fn generate_at(&mut self, time: OffsetDateTime) -> Result<Snowflake, SnowflakeTimeError> {
        let candidate = Snowflake::from_parts(time, self.worker_id, 0)?;

        let snowflake = match self.last {
            Some(last) if candidate <= last => {
                let sequence = last.sequence();
                if u64::from(sequence) < mask(SEQUENCE_LENGTH) {
                    Snowflake::from_parts(last.timestamp(), self.worker_id, sequence + 1)?
                } else {
                    Snowflake::from_parts(
                        last.timestamp() + Duration::milliseconds(1),
                        self.worker_id,
                        0,
                    )?
                }
            }
            _ => candidate,
        };
        self.last = Some(snowflake);

        Ok(snowflake)
    }

    pub fn generate(&mut self) -> Result<Snowflake, SnowflakeTimeError> {
        self.generate_at(OffsetDateTime::now_utc())
    }
}
