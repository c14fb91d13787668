use serde::{Deserialize, Serialize};

/// Identifier of a tig within a store
pub type TigId = u32;

/// Sentinel for a tig that has not been given an ID yet
pub const UNASSIGNED_TIG_ID: TigId = u32::MAX;

/// Phase partner value for a variant that is not phased with another
pub const NO_PHASE: i32 = -1;

/// Kind of object placed inside a tig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
    Read,
    Unitig,
    Contig,
}

impl ChildKind {
    /// Bit used for this kind in a position record's kind word
    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Self::Read => 1 << 0,
            Self::Unitig => 1 << 1,
            Self::Contig => 1 << 2,
        }
    }

    /// Parse the lowercase name used in layout text
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Self::Read),
            "unitig" => Some(Self::Unitig),
            "contig" => Some(Self::Contig),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Unitig => "unitig",
            Self::Contig => "contig",
        }
    }
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sequencing technology of a library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TechType {
    #[default]
    Generic,
    Contig,
    PacBio,
    Nanopore,
    PacBioHiFi,
}

impl TechType {
    /// Numeric code stored on disk
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Generic => 0x0000,
            Self::Contig => 0x0001,
            Self::PacBio => 0x0002,
            Self::Nanopore => 0x0003,
            Self::PacBioHiFi => 0x0004,
        }
    }

    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0x0000 => Some(Self::Generic),
            0x0001 => Some(Self::Contig),
            0x0002 => Some(Self::PacBio),
            0x0003 => Some(Self::Nanopore),
            0x0004 => Some(Self::PacBioHiFi),
            _ => None,
        }
    }
}

impl std::fmt::Display for TechType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Contig => write!(f, "contig"),
            Self::PacBio => write!(f, "PacBio"),
            Self::Nanopore => write!(f, "Nanopore"),
            Self::PacBioHiFi => write!(f, "PacBioHiFi"),
        }
    }
}

/// The sections of a serialized tig, in stream order, plus the library record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    GappedBases,
    GappedQuals,
    UngappedBases,
    UngappedQuals,
    Children,
    ChildDeltas,
    Variants,
    VariantData,
    Library,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::GappedBases => "gapped bases",
            Self::GappedQuals => "gapped quals",
            Self::UngappedBases => "ungapped bases",
            Self::UngappedQuals => "ungapped quals",
            Self::Children => "children",
            Self::ChildDeltas => "child deltas",
            Self::Variants => "variants",
            Self::VariantData => "variant data",
            Self::Library => "library",
        };
        write!(f, "{name}")
    }
}
