//! JSON reference form of tree collections.
//!
//! A plain serde rendering of the model, used for test fixtures and for
//! inspecting parsed trees:
//!
//! ```json
//! {
//!   "taxa": ["A", "B", "C"],
//!   "collections": [{
//!     "label": "sample",
//!     "trees": [{
//!       "label": "t1",
//!       "is_rooted": true,
//!       "comments": [],
//!       "metadata": {"posterior": 0.5},
//!       "root": {
//!         "children": [
//!           {"label": "A", "length": 1.0, "edge_comments": ["&rate=0.1"]},
//!           {"children": [{"label": "B"}, {"label": "C"}], "metadata": {"support": 0.9}}
//!         ]
//!       }
//!     }]
//!   }]
//! }
//! ```
//!
//! Unknown fields are rejected. Reading runs through the same
//! [TreeBuilder](crate::model::TreeBuilder) as Newick and Nexus, so the
//! read options apply unchanged.

mod document;
mod parser;

pub use self::document::{JsonCollection, JsonDocument, JsonNode, JsonTree};
pub use self::parser::JsonParser;

use crate::model::tree_list::TreeList;
use std::io::Write;

/// Writes `trees` as a pretty-printed JSON document with one collection.
///
/// # Errors
/// I/O errors of the writer.
pub fn write_json<W: Write>(writer: W, trees: &TreeList) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &JsonDocument::from_tree_list(trees))
}

/// The JSON document of `trees` as a string.
pub fn to_json_string(trees: &TreeList) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonDocument::from_tree_list(trees))
}
