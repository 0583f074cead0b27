//! Common ID Types
//!
//! Type-safe CUID wrappers for domain entities.
//!
//! Every entity reference that crosses the API boundary is a CUID-style
//! string: a leading `c` followed by at least eight characters that are
//! neither whitespace nor `-`. Generated IDs are 25 characters long
//! (`c` + timestamp + counter + random blocks, all lowercase base36).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BLOCK_SIZE: usize = 4;
const BLOCK_MAX: u64 = 36u64.pow(BLOCK_SIZE as u32);
const MIN_BODY_LEN: usize = 8;

/// Why a string was rejected as a CUID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("must start with 'c'")]
    MissingPrefix,
    #[error("must be at least {} characters", MIN_BODY_LEN + 1)]
    TooShort,
    #[error("must not contain whitespace or '-'")]
    InvalidCharacter,
}

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::CompanyId;
///
/// let id: CompanyId = "clycjihpy0002c5fzcyf4gjjc".parse().unwrap();
/// assert_eq!(id.as_str(), "clycjihpy0002c5fzcyf4gjjc");
/// assert!(CompanyId::parse("company-1").is_err());
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Validate and wrap an existing identifier
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Create a new CUID
    pub fn generate() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let count = u64::from(COUNTER.fetch_add(1, Ordering::Relaxed)) % BLOCK_MAX;
        let mut rng = rand::rng();

        let mut value = String::with_capacity(25);
        value.push('c');
        push_base36(&mut value, millis, 2 * BLOCK_SIZE);
        push_base36(&mut value, count, BLOCK_SIZE);
        for _ in 0..3 {
            push_base36(&mut value, rng.random_range(0..BLOCK_MAX), BLOCK_SIZE);
        }

        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

fn validate(value: &str) -> Result<(), IdError> {
    let mut chars = value.chars();
    match chars.next() {
        Some('c' | 'C') => {}
        _ => return Err(IdError::MissingPrefix),
    }
    let mut body_len = 0;
    for c in chars {
        if c.is_whitespace() || c == '-' {
            return Err(IdError::InvalidCharacter);
        }
        body_len += 1;
    }
    if body_len < MIN_BODY_LEN {
        return Err(IdError::TooShort);
    }
    Ok(())
}

/// Append `n` as exactly `width` base36 digits, keeping the low-order ones
fn push_base36(out: &mut String, mut n: u64, width: usize) {
    let mut buf = vec![b'0'; width];
    for slot in buf.iter_mut().rev() {
        *slot = BASE36[(n % 36) as usize];
        n /= 36;
    }
    out.extend(buf.into_iter().map(char::from));
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(value).map_err(serde::de::Error::custom)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    pub struct Company;
    pub struct Member;
    pub struct User;
    pub struct Share;
}

pub type CompanyId = Id<markers::Company>;
pub type MemberId = Id<markers::Member>;
pub type UserId = Id<markers::User>;
pub type ShareId = Id<markers::Share>;
