//! Node type tag.
//!
//! The legacy text format encodes the kind as the first letter of a node's
//! name (`E12`, `H3`, `A210`); the core only needs the tag itself.

use std::fmt;

/// What a road-network node represents.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// A location where patient calls originate.
    EmergencySite,
    /// A receiving hospital.
    Hospital,
    /// An ambulance station.
    Station,
}

impl NodeKind {
    /// Parse the single-letter legacy prefix (`E`, `H`, `A`).
    pub fn from_prefix(c: char) -> Option<NodeKind> {
        match c {
            'E' => Some(NodeKind::EmergencySite),
            'H' => Some(NodeKind::Hospital),
            'A' => Some(NodeKind::Station),
            _ => None,
        }
    }

    /// The single-letter legacy prefix.
    pub fn prefix(self) -> char {
        match self {
            NodeKind::EmergencySite => 'E',
            NodeKind::Hospital      => 'H',
            NodeKind::Station       => 'A',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::EmergencySite => "emergency site",
            NodeKind::Hospital      => "hospital",
            NodeKind::Station       => "station",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
