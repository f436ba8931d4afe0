//! Label quoting rules shared by the Newick and Nexus readers and writers.
//!
//! Both formats quote labels with single quotes and escape an embedded
//! quote by doubling it. In unquoted labels an underscore stands for a
//! space.

/// Characters that force a label into single quotes when written.
const SPECIAL_CHARACTERS: &[char] = &[
    ',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\'', '=', '_',
];

/// Escapes a label for writing in Newick or Nexus.
///
/// Labels with special characters (including underscores, which would
/// otherwise read back as spaces) are single quoted with internal quotes
/// doubled. Other labels only have their spaces replaced by underscores.
///
/// # Examples
/// ```
/// # use phyloread::parser::utils::escape_label;
/// assert_eq!(escape_label("Pukeko"), "Pukeko");
/// assert_eq!(escape_label("Australasian Swamphen"), "Australasian_Swamphen");
/// assert_eq!(escape_label("Pu[ke]ko"), "'Pu[ke]ko'");
/// assert_eq!(escape_label("Baillon's Crake"), "'Baillon''s Crake'");
/// assert_eq!(escape_label("snake_case"), "'snake_case'");
/// assert_eq!(escape_label(""), "''");
/// ```
pub fn escape_label(label: &str) -> String {
    if label.is_empty() {
        return "''".to_string();
    }

    if label.contains(SPECIAL_CHARACTERS) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.replace(' ', "_")
    }
}

/// Applies the unquoted-label underscore rule to already tokenized text.
pub(crate) fn normalize_unquoted(label: &str, preserve_underscores: bool) -> String {
    if preserve_underscores {
        label.to_string()
    } else {
        label.replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tree;

    #[test]
    fn escaped_labels_read_back_unchanged() {
        for label in ["A", "Homo sapiens", "Wilson's storm-petrel", "a_b c", "x:y", "(weird)"] {
            let newick = format!("({},B);", escape_label(label));
            let tree = Tree::get_from_string(&newick, "newick", ()).unwrap();
            assert_eq!(tree.leaves().next().unwrap().display_label(), Some(label));
        }
    }
}
