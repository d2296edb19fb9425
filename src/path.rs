//! Child indices and derivation paths such as `m/44'/0'/0'/0/7`.

use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A 32-bit child number, split by its top bit.
///
/// The payload of both variants is the index below `2^31`; the raw
/// value of `Hardened(i)` is `i + 2^31`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildIndex {
    Normal(u32),
    Hardened(u32),
}

impl ChildIndex {
    pub fn normal(index: u32) -> Result<Self, FormatError> {
        if index >= HARDENED_OFFSET {
            return Err(FormatError::IndexOutOfRange(index));
        }
        Ok(Self::Normal(index))
    }

    pub fn hardened(index: u32) -> Result<Self, FormatError> {
        if index >= HARDENED_OFFSET {
            return Err(FormatError::IndexOutOfRange(index));
        }
        Ok(Self::Hardened(index))
    }

    pub const fn from_raw(raw: u32) -> Self {
        if raw >= HARDENED_OFFSET {
            Self::Hardened(raw - HARDENED_OFFSET)
        } else {
            Self::Normal(raw)
        }
    }

    /// `ser32` value used in HMAC input and serialization.
    pub const fn raw(&self) -> u32 {
        match *self {
            Self::Normal(i) => i,
            Self::Hardened(i) => i | HARDENED_OFFSET,
        }
    }

    pub const fn is_hardened(&self) -> bool {
        matches!(self, Self::Hardened(_))
    }
}

impl From<u32> for ChildIndex {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<ChildIndex> for u32 {
    fn from(index: ChildIndex) -> Self {
        index.raw()
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(i) => write!(f, "{i}"),
            Self::Hardened(i) => write!(f, "{i}'"),
        }
    }
}

impl FromStr for ChildIndex {
    type Err = FormatError;

    /// Accepts `'`, `h` or `H` as the hardened marker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match s.strip_suffix(['\'', 'h', 'H']) {
            Some(digits) => (digits, true),
            None => (s, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FormatError::InvalidPath(s.to_string()));
        }
        let index: u32 = digits
            .parse()
            .map_err(|_| FormatError::InvalidPath(s.to_string()))?;

        if hardened {
            Self::hardened(index)
        } else {
            Self::normal(index)
        }
    }
}

/// Sequence of child indices from the master key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    pub fn master() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[ChildIndex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: ChildIndex) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChildIndex> {
        self.0.iter()
    }
}

impl From<Vec<ChildIndex>> for DerivationPath {
    fn from(indices: Vec<ChildIndex>) -> Self {
        Self(indices)
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildIndex;
    type IntoIter = std::slice::Iter<'a, ChildIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(FormatError::InvalidPath(s.to_string()));
        }

        let indices = parts
            .map(|part| part.parse::<ChildIndex>().map_err(|_| FormatError::InvalidPath(s.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        if indices.len() > u8::MAX as usize {
            return Err(FormatError::InvalidPath(s.to_string()));
        }
        Ok(Self(indices))
    }
}
