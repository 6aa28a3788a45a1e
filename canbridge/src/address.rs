//! Object dictionary address grammar and access dispatch
//!
//! Operators address a remote object in one of three styles: a hexadecimal index with an
//! optional sub-index (`"0x2005#0x01"`), a plain decimal index (`"1234"`), or the symbolic
//! name of an entry defined by the node's dictionary (`"Temperature"`). Parsing precedence
//! is fixed: a string starting with `"0x"` is always hexadecimal, an all-digit string is
//! always decimal, and anything else is a name lookup. A string that fails to parse in the
//! style its prefix selects is an error, never reinterpreted in another style.

use core::str::FromStr;

use snafu::{OptionExt, ResultExt, Snafu};

use crate::traits::{ObjectClient, TransportError};
use crate::value::Value;

/// Error for an address string with a malformed numeral
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum AddressError {
    /// The index portion is not a valid hexadecimal number
    #[snafu(display("Invalid hex index in address '{address}'"))]
    InvalidHexIndex {
        /// The offending address string
        address: String,
    },
    /// The sub-index portion is not a valid hexadecimal number
    #[snafu(display("Invalid hex sub-index in address '{address}'"))]
    InvalidHexSubIndex {
        /// The offending address string
        address: String,
    },
    /// An all-digit address does not fit an unsigned index
    #[snafu(display("Invalid decimal index in address '{address}'"))]
    InvalidDecimalIndex {
        /// The offending address string
        address: String,
    },
}

/// A parsed object dictionary address
///
/// Parsing an address string is pure: the same string always yields the same variant and
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectAddress {
    /// Hexadecimal index and sub-index, e.g. `"0x2005#0x01"`
    HexSub {
        /// 16 bit object index
        index: u16,
        /// 8 bit sub-index
        sub: u8,
    },
    /// Hexadecimal index, e.g. `"0x6041"`
    Hex {
        /// 16 bit object index
        index: u16,
    },
    /// Decimal index, e.g. `"1234"`
    Decimal {
        /// Object index
        index: u64,
    },
    /// Symbolic entry name, e.g. `"Temperature"`
    Named {
        /// Name of an entry defined by the node's dictionary
        key: String,
    },
}

impl FromStr for ObjectAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("0x") {
            if let Some((main, sub)) = rest.split_once('#') {
                let index = u16::from_str_radix(main, 16)
                    .ok()
                    .context(InvalidHexIndexSnafu { address: s })?;
                let sub_digits = sub.strip_prefix("0x").unwrap_or(sub);
                let sub = u8::from_str_radix(sub_digits, 16)
                    .ok()
                    .context(InvalidHexSubIndexSnafu { address: s })?;
                Ok(Self::HexSub { index, sub })
            } else {
                let index = u16::from_str_radix(rest, 16)
                    .ok()
                    .context(InvalidHexIndexSnafu { address: s })?;
                Ok(Self::Hex { index })
            }
        } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            let index = s
                .parse()
                .ok()
                .context(InvalidDecimalIndexSnafu { address: s })?;
            Ok(Self::Decimal { index })
        } else {
            Ok(Self::Named { key: s.to_string() })
        }
    }
}

impl ObjectAddress {
    /// Get the lookup key for this address
    ///
    /// Only [ObjectAddress::HexSub] produces a two-level lookup; the other variants select
    /// a whole entry by numeric index or by name.
    pub fn entry_key(&self) -> EntryKey<'_> {
        match self {
            Self::HexSub { index, sub } => EntryKey::Index {
                index: *index as u64,
                sub: Some(*sub),
            },
            Self::Hex { index } => EntryKey::Index {
                index: *index as u64,
                sub: None,
            },
            Self::Decimal { index } => EntryKey::Index {
                index: *index,
                sub: None,
            },
            Self::Named { key } => EntryKey::Name(key),
        }
    }
}

/// The lookup form of an address, as handed to the object dictionary client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey<'a> {
    /// Numeric entry index, with a sub-index for two-level lookups
    Index {
        /// Object index
        index: u64,
        /// Sub-index, for addresses that select a single sub entry
        sub: Option<u8>,
    },
    /// Symbolic name defined by the node's dictionary
    Name(&'a str),
}

impl core::fmt::Display for EntryKey<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntryKey::Index { index, sub: None } => write!(f, "{index:#06x}"),
            EntryKey::Index {
                index,
                sub: Some(sub),
            } => write!(f, "{index:#06x}#{sub:#04x}"),
            EntryKey::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Error from resolving and dispatching a single object access
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum ResolveError {
    /// The address string does not conform to any recognized grammar variant
    #[snafu(display("Cannot resolve address '{address}': {source}"))]
    Resolution {
        /// The offending address string
        address: String,
        /// The underlying parse failure
        source: AddressError,
    },
    /// The transaction against the node failed
    #[snafu(display("Transport failure on '{address}': {source}"))]
    Transport {
        /// The address being accessed
        address: String,
        /// The error reported by the object dictionary client
        source: TransportError,
    },
}

/// Resolve an address string and read the entry's current value from the node
///
/// Transport errors are propagated as reported by the client; no retry happens here.
pub fn resolve_read<C: ObjectClient + ?Sized>(
    client: &C,
    address: &str,
) -> Result<Value, ResolveError> {
    let parsed: ObjectAddress = address.parse().context(ResolutionSnafu { address })?;
    client
        .upload(parsed.entry_key())
        .context(TransportSnafu { address })
}

/// Resolve an address string and write a value to the entry on the node
pub fn resolve_write<C: ObjectClient + ?Sized>(
    client: &C,
    address: &str,
    value: Value,
) -> Result<(), ResolveError> {
    let parsed: ObjectAddress = address.parse().context(ResolutionSnafu { address })?;
    client
        .download(parsed.entry_key(), value)
        .context(TransportSnafu { address })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_with_sub_index() {
        let addr: ObjectAddress = "0x2005#0x01".parse().unwrap();
        assert_eq!(
            ObjectAddress::HexSub {
                index: 0x2005,
                sub: 0x01
            },
            addr
        );
    }

    #[test]
    fn test_sub_index_without_prefix() {
        // The sub part is hex whether or not it carries its own "0x"
        let addr: ObjectAddress = "0x2005#1f".parse().unwrap();
        assert_eq!(
            ObjectAddress::HexSub {
                index: 0x2005,
                sub: 0x1f
            },
            addr
        );
    }

    #[test]
    fn test_hex_without_sub_index() {
        let addr: ObjectAddress = "0x6041".parse().unwrap();
        assert_eq!(ObjectAddress::Hex { index: 0x6041 }, addr);
    }

    #[test]
    fn test_decimal() {
        let addr: ObjectAddress = "1234".parse().unwrap();
        assert_eq!(ObjectAddress::Decimal { index: 1234 }, addr);
    }

    #[test]
    fn test_named() {
        let addr: ObjectAddress = "Temperature".parse().unwrap();
        assert_eq!(
            ObjectAddress::Named {
                key: "Temperature".to_string()
            },
            addr
        );
    }

    #[test]
    fn test_hex_beats_decimal_and_named() {
        // Digits after the '#' must not demote the address to decimal or named
        let addr: ObjectAddress = "0x2000#0x01".parse().unwrap();
        assert_eq!(
            ObjectAddress::HexSub {
                index: 0x2000,
                sub: 0x01
            },
            addr
        );
        // An all-hex-digit index stays hexadecimal
        let addr: ObjectAddress = "0x1234".parse().unwrap();
        assert_eq!(ObjectAddress::Hex { index: 0x1234 }, addr);
    }

    #[test]
    fn test_malformed_hex_is_an_error_not_a_name() {
        let result = "0xZZ".parse::<ObjectAddress>();
        assert_eq!(
            Err(AddressError::InvalidHexIndex {
                address: "0xZZ".to_string()
            }),
            result
        );
    }

    #[test]
    fn test_malformed_sub_index() {
        let result = "0x2005#banana".parse::<ObjectAddress>();
        assert_eq!(
            Err(AddressError::InvalidHexSubIndex {
                address: "0x2005#banana".to_string()
            }),
            result
        );
        // A missing sub part is just as malformed
        assert!("0x2005#".parse::<ObjectAddress>().is_err());
    }

    #[test]
    fn test_hex_index_out_of_range() {
        assert!("0x12345".parse::<ObjectAddress>().is_err());
        assert!("0x2005#0x100".parse::<ObjectAddress>().is_err());
    }

    #[test]
    fn test_mixed_alnum_is_named() {
        // No "0x" prefix and not all digits, so it is a name even though it looks numeric
        let addr: ObjectAddress = "6041h".parse().unwrap();
        assert_eq!(
            ObjectAddress::Named {
                key: "6041h".to_string()
            },
            addr
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        for s in ["0x2005#0x01", "0x6041", "1234", "Temperature", "6041h"] {
            let first: ObjectAddress = s.parse().unwrap();
            let second: ObjectAddress = s.parse().unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_entry_key_levels() {
        let two_level: ObjectAddress = "0x2005#0x01".parse().unwrap();
        assert_eq!(
            EntryKey::Index {
                index: 0x2005,
                sub: Some(0x01)
            },
            two_level.entry_key()
        );

        let one_level: ObjectAddress = "0x6041".parse().unwrap();
        assert_eq!(
            EntryKey::Index {
                index: 0x6041,
                sub: None
            },
            one_level.entry_key()
        );

        // Hex and decimal spellings of the same index select the same entry
        let decimal: ObjectAddress = "24641".parse().unwrap();
        assert_eq!(one_level.entry_key(), decimal.entry_key());
    }
}
