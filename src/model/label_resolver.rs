//! Translation of vertex name tokens into taxon labels.
//!
//! Newick names are taxon labels as written. In Nexus, a TREES block may
//! refer to taxa through a `TRANSLATE` table or by their 1-based position
//! in the TAXA block. [LabelResolver] captures which of these applies to
//! the trees currently being parsed.

use crate::model::tree_builder::BuildError;
use std::borrow::Cow;
use std::collections::HashMap;

// =#========================================================================#=
// LABEL RESOLVER
// =#========================================================================#=
/// Maps a vertex name token to the label of the taxon it denotes.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LabelResolver {
    /// Tokens are taxon labels (Newick, Nexus without TAXA or TRANSLATE).
    #[default]
    Verbatim,

    /// Nexus resolution, trying in order:
    /// 1. a `TRANSLATE` key (e.g. `terny` -> `White-fronted tern`)
    /// 2. a label declared in the TAXA block
    /// 3. an integer as 1-based index into the TAXA block
    /// 4. the token itself
    Nexus {
        translation: HashMap<String, String>,
        taxa_labels: Vec<String>,
    },
}

impl LabelResolver {
    /// Resolver for a Nexus TREES block; falls back to
    /// [Verbatim](Self::Verbatim) if there is neither a TAXA block nor a
    /// TRANSLATE table.
    pub fn for_nexus(taxa_labels: Vec<String>, translation: HashMap<String, String>) -> Self {
        if taxa_labels.is_empty() && translation.is_empty() {
            LabelResolver::Verbatim
        } else {
            LabelResolver::Nexus {
                translation,
                taxa_labels,
            }
        }
    }

    /// Resolves `token` to a taxon label.
    ///
    /// # Errors
    /// [BuildError::UnresolvedLabel] for an integer token that is neither a
    /// key nor a label and lies outside `1..=ntax` of the TAXA block.
    pub fn resolve<'a>(&'a self, token: &'a str) -> Result<Cow<'a, str>, BuildError> {
        let LabelResolver::Nexus {
            translation,
            taxa_labels,
        } = self
        else {
            return Ok(Cow::Borrowed(token));
        };

        if let Some(label) = translation.get(token) {
            return Ok(Cow::Borrowed(label));
        }
        if taxa_labels.iter().any(|l| l == token) {
            return Ok(Cow::Borrowed(token));
        }
        if let (Ok(position), false) = (token.parse::<usize>(), taxa_labels.is_empty()) {
            return match position.checked_sub(1).and_then(|i| taxa_labels.get(i)) {
                Some(label) => Ok(Cow::Borrowed(label)),
                None => Err(BuildError::UnresolvedLabel(format!(
                    "taxon number {position} is outside the {} taxa of the TAXA block",
                    taxa_labels.len()
                ))),
            };
        }
        Ok(Cow::Borrowed(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LabelResolver {
        let translation = HashMap::from([
            ("1".to_string(), "Sterna striata".to_string()),
            ("sooty".to_string(), "Onychoprion fuscatus".to_string()),
        ]);
        let taxa = vec![
            "Sterna striata".to_string(),
            "Onychoprion fuscatus".to_string(),
            "Gygis alba".to_string(),
        ];
        LabelResolver::for_nexus(taxa, translation)
    }

    #[test]
    fn resolution_order() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("1").unwrap(), "Sterna striata");
        assert_eq!(resolver.resolve("sooty").unwrap(), "Onychoprion fuscatus");
        assert_eq!(resolver.resolve("Gygis alba").unwrap(), "Gygis alba");
        assert_eq!(resolver.resolve("3").unwrap(), "Gygis alba");
        assert_eq!(resolver.resolve("Anous minutus").unwrap(), "Anous minutus");
    }

    #[test]
    fn out_of_range_taxon_number() {
        assert!(matches!(resolver().resolve("4"), Err(BuildError::UnresolvedLabel(_))));
        assert!(matches!(resolver().resolve("0"), Err(BuildError::UnresolvedLabel(_))));
    }

    #[test]
    fn verbatim_without_declarations() {
        let resolver = LabelResolver::for_nexus(Vec::new(), HashMap::new());
        assert_eq!(resolver, LabelResolver::Verbatim);
        assert_eq!(resolver.resolve("7").unwrap(), "7");
    }
}
