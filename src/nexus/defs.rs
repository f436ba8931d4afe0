//! NEXUS format constants and definitions.
//!
//! This module contains the keywords the Nexus reader and writer use
//! (all matched case-insensitively) and the [NexusBlock] kinds.

/// Unquoted tokens (taxon labels, TRANSLATE keys) end at comma, semicolon,
/// comments and whitespace
pub(crate) const NEXUS_LABEL_DELIMITERS: &[u8] = b" ,;[\t\n\r";

/// Tree names additionally end at `=`
pub(crate) const TREE_NAME_DELIMITERS: &[u8] = b" ,;=[\t\n\r";

/// Block names end at `;`, comments and whitespace
pub(crate) const BLOCK_NAME_DELIMITERS: &[u8] = b";[ \t\n\r";

/// NEXUS file header "#NEXUS"
pub(crate) const NEXUS_HEADER: &[u8] = b"#NEXUS";

/// NEXUS block begin keyword
pub(crate) const BLOCK_BEGIN: &[u8] = b"Begin";

/// NEXUS block end keywords, followed by `;`
pub(crate) const BLOCK_END: &[u8] = b"End";
pub(crate) const BLOCK_ENDBLOCK: &[u8] = b"EndBlock";

/// Block names as written
pub(crate) const TAXA: &[u8] = b"TAXA";
pub(crate) const TREES: &[u8] = b"TREES";

// Taxa block keywords
/// TAXA block dimensions command
pub(crate) const DIMENSIONS: &[u8] = b"Dimensions";

/// Number of taxa parameter of `DIMENSIONS`
pub(crate) const NTAX: &str = "ntax";

/// Tax labels command
pub(crate) const TAXLABELS: &[u8] = b"Taxlabels";

// Trees block keywords
/// TREES block translate command
pub(crate) const TRANSLATE: &[u8] = b"Translate";

/// Individual tree command
pub(crate) const TREE: &[u8] = b"Tree";

/// NEXUS block types
#[derive(Debug, PartialEq, Clone)]
pub enum NexusBlock {
    Taxa,
    Trees,
    Data,
    Characters,
    Distances,
    Sets,
    Assumptions,
    UnknownBlock(String),
}

impl NexusBlock {
    /// Parse a block name (case-insensitive) into a NexusBlock variant
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "taxa" => NexusBlock::Taxa,
            "trees" => NexusBlock::Trees,
            "data" => NexusBlock::Data,
            "characters" => NexusBlock::Characters,
            "distances" => NexusBlock::Distances,
            "sets" => NexusBlock::Sets,
            "assumptions" => NexusBlock::Assumptions,
            _ => NexusBlock::UnknownBlock(name.to_string()),
        }
    }
}
