use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Maximum number of address levels in a [GeomId]
pub const MAX_DEPTH: usize = 5;

lazy_static! {
    static ref GEOM_ID_RE: Regex =
        Regex::new(r"^\[(?P<kind>\d+):(?P<addr>\d+(\.\d+)*)\]$").unwrap();
}

/// Geometry identifier of a detector volume
///
/// A geometry id consists of a geometry type and a hierarchical
/// address, written as `[type:a.b.c]`. For a main wall calorimeter
/// block the address is `module.side.column.row`.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeomId {
    kind: u32,
    depth: u8,
    address: [u32; MAX_DEPTH],
}

impl GeomId {
    /// Construct a geometry id from its type and address
    pub fn new(kind: u32, address: &[u32]) -> Result<Self, GeomIdError> {
        if address.len() > MAX_DEPTH {
            return Err(GeomIdError::TooDeep(address.len()));
        }
        let mut addr = [0; MAX_DEPTH];
        addr[..address.len()].copy_from_slice(address);
        Ok(Self {
            kind,
            depth: address.len() as u8,
            address: addr,
        })
    }

    /// Geometry type
    pub fn kind(&self) -> u32 {
        self.kind
    }

    /// Address levels
    pub fn address(&self) -> &[u32] {
        &self.address[..self.depth as usize]
    }
}

impl Display for GeomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:", self.kind)?;
        let mut levels = self.address().iter();
        if let Some(first) = levels.next() {
            write!(f, "{first}")?;
        }
        for level in levels {
            write!(f, ".{level}")?;
        }
        write!(f, "]")
    }
}

// the bracket notation is much easier to read in logs than the fields
impl Debug for GeomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for GeomId {
    type Err = GeomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(captures) = GEOM_ID_RE.captures(s.trim()) else {
            return Err(GeomIdError::Syntax(s.to_owned()));
        };
        let parse = |n: &str| {
            n.parse::<u32>()
                .map_err(|_| GeomIdError::Syntax(s.to_owned()))
        };
        let kind = parse(&captures["kind"])?;
        let address: Result<Vec<_>, _> =
            captures["addr"].split('.').map(parse).collect();
        GeomId::new(kind, &address?)
    }
}

impl Serialize for GeomId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GeomId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeomIdError {
    #[error("Geometry id address has {0} levels, at most {MAX_DEPTH} are supported")]
    TooDeep(usize),
    #[error("Failed to parse geometry id `{0}`, expected format `[type:a.b.c]`")]
    Syntax(String),
}
