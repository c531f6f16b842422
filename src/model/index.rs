//! model::index — the closed sector/technology/leisure taxonomy.
//!
//! Purpose
//! -------
//! Name every place a household can spend time: three sectors times two
//! technologies (the six *production* indices) plus leisure (together the
//! seven *flow* indices). The taxonomy is fixed at compile time; nothing
//! in the crate supports adding sectors at runtime.
//!
//! Conventions
//! -----------
//! - Labels follow the two-letter form used by the data files: sector
//!   initial then `h` (traditional) or `r` (modern), e.g. `"Ar"`, `"Sh"`.
//!   Leisure is `"l"`.
//! - [`FlowIndex::ALL`] fixes the canonical ordering
//!   `[Ah, Mh, Sh, Ar, Mr, Sr, l]`; per-index arrays in the crate use
//!   [`FlowIndex::position`] as their offset.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::model::errors::{ModelError, ModelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sector {
    Agriculture,
    Manufacturing,
    Services,
}

impl Sector {
    pub const ALL: [Sector; 3] = [Sector::Agriculture, Sector::Manufacturing, Sector::Services];

    pub fn code(self) -> char {
        match self {
            Sector::Agriculture => 'A',
            Sector::Manufacturing => 'M',
            Sector::Services => 'S',
        }
    }

    pub fn position(self) -> usize {
        match self {
            Sector::Agriculture => 0,
            Sector::Manufacturing => 1,
            Sector::Services => 2,
        }
    }

    /// Traditional index of this sector.
    pub fn traditional(self) -> ProductionIndex {
        ProductionIndex::new(self, Technology::Traditional)
    }

    /// Modern index of this sector.
    pub fn modern(self) -> ProductionIndex {
        ProductionIndex::new(self, Technology::Modern)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Technology {
    /// Home/traditional production, available without schooling.
    Traditional,
    /// Market/modern production, requires schooling.
    Modern,
}

impl Technology {
    pub fn code(self) -> char {
        match self {
            Technology::Traditional => 'h',
            Technology::Modern => 'r',
        }
    }

    pub fn other(self) -> Technology {
        match self {
            Technology::Traditional => Technology::Modern,
            Technology::Modern => Technology::Traditional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Female, Gender::Male];

    pub fn code(self) -> char {
        match self {
            Gender::Female => 'f',
            Gender::Male => 'm',
        }
    }
}

/// A sector paired with a technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionIndex {
    pub sector: Sector,
    pub technology: Technology,
}

impl ProductionIndex {
    pub const AH: ProductionIndex = ProductionIndex::new(Sector::Agriculture, Technology::Traditional);
    pub const MH: ProductionIndex =
        ProductionIndex::new(Sector::Manufacturing, Technology::Traditional);
    pub const SH: ProductionIndex = ProductionIndex::new(Sector::Services, Technology::Traditional);
    pub const AR: ProductionIndex = ProductionIndex::new(Sector::Agriculture, Technology::Modern);
    pub const MR: ProductionIndex = ProductionIndex::new(Sector::Manufacturing, Technology::Modern);
    pub const SR: ProductionIndex = ProductionIndex::new(Sector::Services, Technology::Modern);

    /// Canonical ordering: traditional indices first, then modern.
    pub const ALL: [ProductionIndex; 6] = [
        ProductionIndex::AH,
        ProductionIndex::MH,
        ProductionIndex::SH,
        ProductionIndex::AR,
        ProductionIndex::MR,
        ProductionIndex::SR,
    ];

    pub const fn new(sector: Sector, technology: Technology) -> Self {
        Self { sector, technology }
    }

    pub fn is_modern(self) -> bool {
        self.technology == Technology::Modern
    }

    /// Same sector, other technology.
    pub fn counterpart(self) -> ProductionIndex {
        ProductionIndex::new(self.sector, self.technology.other())
    }

    pub fn position(self) -> usize {
        match self.technology {
            Technology::Traditional => self.sector.position(),
            Technology::Modern => 3 + self.sector.position(),
        }
    }

    pub fn label(self) -> &'static str {
        match (self.sector, self.technology) {
            (Sector::Agriculture, Technology::Traditional) => "Ah",
            (Sector::Manufacturing, Technology::Traditional) => "Mh",
            (Sector::Services, Technology::Traditional) => "Sh",
            (Sector::Agriculture, Technology::Modern) => "Ar",
            (Sector::Manufacturing, Technology::Modern) => "Mr",
            (Sector::Services, Technology::Modern) => "Sr",
        }
    }
}

impl fmt::Display for ProductionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProductionIndex {
    type Err = ModelError;

    fn from_str(label: &str) -> ModelResult<Self> {
        ProductionIndex::ALL
            .into_iter()
            .find(|idx| idx.label() == label)
            .ok_or_else(|| ModelError::UnknownIndex { label: label.to_string() })
    }
}

/// A production index or leisure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FlowIndex {
    Production(ProductionIndex),
    Leisure,
}

impl FlowIndex {
    pub const ALL: [FlowIndex; 7] = [
        FlowIndex::Production(ProductionIndex::AH),
        FlowIndex::Production(ProductionIndex::MH),
        FlowIndex::Production(ProductionIndex::SH),
        FlowIndex::Production(ProductionIndex::AR),
        FlowIndex::Production(ProductionIndex::MR),
        FlowIndex::Production(ProductionIndex::SR),
        FlowIndex::Leisure,
    ];

    pub fn position(self) -> usize {
        match self {
            FlowIndex::Production(idx) => idx.position(),
            FlowIndex::Leisure => 6,
        }
    }

    /// Leisure counts as non-modern.
    pub fn is_modern(self) -> bool {
        matches!(self, FlowIndex::Production(idx) if idx.is_modern())
    }

    pub fn label(self) -> &'static str {
        match self {
            FlowIndex::Production(idx) => idx.label(),
            FlowIndex::Leisure => "l",
        }
    }
}

impl From<ProductionIndex> for FlowIndex {
    fn from(idx: ProductionIndex) -> Self {
        FlowIndex::Production(idx)
    }
}

impl fmt::Display for FlowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlowIndex {
    type Err = ModelError;

    fn from_str(label: &str) -> ModelResult<Self> {
        if label == "l" {
            return Ok(FlowIndex::Leisure);
        }
        label.parse::<ProductionIndex>().map(FlowIndex::Production)
    }
}

impl TryFrom<String> for FlowIndex {
    type Error = ModelError;

    fn try_from(label: String) -> ModelResult<Self> {
        label.parse()
    }
}

impl From<FlowIndex> for String {
    fn from(idx: FlowIndex) -> Self {
        idx.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Labels and positions must be a bijection over the seven flow indices.
    //
    // Given
    // -----
    // - `FlowIndex::ALL`.
    //
    // Expect
    // ------
    // - `position` enumerates 0..7 in order and every label parses back to
    //   the same index.
    fn flow_index_labels_and_positions_round_trip() {
        for (expected, idx) in FlowIndex::ALL.into_iter().enumerate() {
            assert_eq!(idx.position(), expected);
            assert_eq!(idx.label().parse::<FlowIndex>().unwrap(), idx);
        }
    }

    #[test]
    // Purpose
    // -------
    // Unknown labels are configuration errors.
    //
    // Given
    // -----
    // - The label `"Xr"` and the empty string.
    //
    // Expect
    // ------
    // - `ModelError::UnknownIndex` carrying the offending label.
    fn unknown_label_is_rejected() {
        assert_eq!(
            "Xr".parse::<ProductionIndex>(),
            Err(ModelError::UnknownIndex { label: "Xr".to_string() })
        );
        assert!("".parse::<FlowIndex>().is_err());
    }

    #[test]
    // Purpose
    // -------
    // Counterparts switch technology within a sector and are involutive.
    //
    // Given
    // -----
    // - Every production index.
    //
    // Expect
    // ------
    // - Same sector, other technology, and applying twice is the identity.
    fn counterpart_switches_technology() {
        for idx in ProductionIndex::ALL {
            let other = idx.counterpart();
            assert_eq!(other.sector, idx.sector);
            assert_ne!(other.is_modern(), idx.is_modern());
            assert_eq!(other.counterpart(), idx);
        }
    }
}
