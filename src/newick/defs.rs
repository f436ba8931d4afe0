//! Byte constants of the Newick format.

/// Unquoted labels end at parentheses, comments, comma, colon, semicolon
/// and whitespace
pub(crate) const NEWICK_LABEL_DELIMITERS: &[u8] = b"()[],:; \t\n\r";

/// Bytes that may make up an edge length (including scientific notation)
pub(crate) const EDGE_LENGTH_BYTES: &[u8] = b"0123456789.-+eE";

/// Node capacity reserved for the first tree, before a real count is known
pub(crate) const DEFAULT_NUM_NODES_GUESS: usize = 20;

/// Rooting tokens, as comment content: `[&R]` and `[&U]`
pub(crate) const ROOTED_TOKEN: &str = "&R";
pub(crate) const UNROOTED_TOKEN: &str = "&U";
