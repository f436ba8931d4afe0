mod common;

use common::{assert_list_invariants, fixture};
use phyloread::model::{Rooting, TaxonNamespace, TaxonTreeBuilder, Tree};
use phyloread::newick::{NewickParser, NewickStyle, TaxonNaming, parse_str, to_newick};
use phyloread::parser::{ByteParser, ParsingErrorType};
use phyloread::{ReadError, ReadOptions, TreeList};

fn parse_error_kind(newick: &str) -> ParsingErrorType {
    match TreeList::get_from_string(newick, "newick", ()) {
        Err(ReadError::Parse(e)) => e.kind().clone(),
        other => panic!("expected a parse error for {newick:?}, got {other:?}"),
    }
}

// --- TESTS NEWICK FIXTURE ---
#[test]
fn test_fixture_trees() {
    let trees = TreeList::get_from_path(fixture("birds-n5-t4.nwk"), "newick", ()).unwrap();
    assert_eq!(trees.len(), 4);
    assert_list_invariants(&trees);

    let rootings: Vec<Rooting> = trees.iter().map(Tree::rooting).collect();
    assert_eq!(
        rootings,
        [Rooting::Rooted, Rooting::Unrooted, Rooting::Unspecified, Rooting::Unspecified]
    );
    for tree in &trees {
        assert_eq!(tree.num_leaves(), 5);
        assert!(tree.label().is_none());
    }
    assert_eq!(trees[1].root().children().len(), 3);
    assert!(trees[2].nodes().iter().all(|n| n.edge().length().is_none()));
    assert_eq!(trees[3].comments(), ["sampled from chain"]);
}

#[test]
fn test_internal_labels_stay_labels_by_default() {
    let trees = TreeList::get_from_path(fixture("birds-n5-t4.nwk"), "newick", ()).unwrap();
    let anc = trees[1]
        .nodes()
        .iter()
        .find(|n| !n.is_leaf() && n.display_label().is_some())
        .unwrap();
    assert_eq!(anc.label(), Some("anc1"));
    assert!(anc.taxon().is_none());
    assert_eq!(anc.edge().length(), Some(0.5));
    assert!(!trees.taxon_namespace().borrow().has_label("anc1"));
}

#[test]
fn test_suppression_options() {
    let options = ReadOptions::default()
        .with_suppress_internal_node_taxa(false)
        .with_suppress_leaf_node_taxa(true);
    let trees = TreeList::get_from_path(fixture("birds-n5-t4.nwk"), "newick", options).unwrap();
    assert_eq!(trees.taxon_namespace().borrow().labels(), ["anc1"]);
    for tree in &trees {
        assert!(tree.leaves().all(|l| l.taxon().is_none() && l.label().is_some()));
    }
    assert_list_invariants(&trees);
}

// --- TESTS NEWICK STRING PARSING ---
#[test]
fn test_lengths_and_shape() {
    let tree = parse_str("((A:1.0,B:2.0):3.0,C:4.0):0.5;").unwrap();
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 2);
    assert_eq!(tree.num_nodes(), 5);
    assert_eq!(tree.root().edge().length(), Some(0.5));

    let cherry = tree.node(tree.root().children()[0]);
    let lengths: Vec<Option<f64>> = cherry
        .children()
        .iter()
        .map(|&c| tree.node(c).edge().length())
        .collect();
    assert_eq!(lengths, [Some(1.0), Some(2.0)]);
    assert_eq!(cherry.parent(), Some(tree.root_index()));
}

#[test]
fn test_scientific_notation_lengths() {
    let tree = parse_str("(A:1.5e-3,B:2E2,C:-0.0);").unwrap();
    let lengths: Vec<f64> = tree.leaves().filter_map(|l| l.edge().length()).collect();
    assert_eq!(lengths, [0.0015, 200.0, -0.0]);
}

#[test]
fn test_quoted_and_unquoted_labels() {
    let tree = parse_str("('Little_spotted kiwi','Haast''s eagle',Great_spotted_kiwi);").unwrap();
    let labels = tree.taxon_namespace().borrow().labels().join("|");
    assert_eq!(labels, "Little_spotted kiwi|Haast's eagle|Great spotted kiwi");
}

#[test]
fn test_preserve_underscores() {
    let options = ReadOptions::default().with_preserve_underscores(true);
    let trees = TreeList::get_from_string("(Great_spotted_kiwi,Rowi);", "newick", options).unwrap();
    assert_eq!(trees.taxon_namespace().borrow().labels(), ["Great_spotted_kiwi", "Rowi"]);
}

#[test]
fn test_comments_everywhere() {
    let tree = parse_str("[t] ([n]A[m]:[e]1.0[f],B)[r];").unwrap();
    assert_eq!(tree.comments(), ["t"]);
    let a = tree.node(0);
    assert_eq!(a.comments(), ["n", "m", "e", "f"]);
    assert_eq!(tree.root().comments(), ["r"]);
}

#[test]
fn test_rooting_interpretation() {
    let source = "[&U] (A,B); (A,B); [&r] (A,B);";
    let read = |rooting: &str| -> Vec<Option<bool>> {
        TreeList::get_from_string(source, "newick", [("rooting", rooting)])
            .unwrap()
            .iter()
            .map(Tree::is_rooted)
            .collect()
    };
    assert_eq!(read("as-specified"), [Some(false), None, Some(true)]);
    assert_eq!(read("default-rooted"), [Some(false), Some(true), Some(true)]);
    assert_eq!(read("default-unrooted"), [Some(false), Some(false), Some(true)]);
    assert_eq!(read("force-rooted"), [Some(true); 3]);
    assert_eq!(read("force_unrooted"), [Some(false); 3]);
}

#[test]
fn test_single_leaf_tree() {
    let tree = parse_str("A;").unwrap();
    assert_eq!(tree.num_nodes(), 1);
    assert!(tree.root().is_leaf());
}

#[test]
fn test_unnamed_nodes_have_no_name() {
    let tree = parse_str("((,),);").unwrap();
    assert_eq!(tree.num_leaves(), 3);
    assert!(tree.nodes().iter().all(|n| n.display_label().is_none()));
    assert!(tree.taxon_namespace().borrow().is_empty());
}

// --- TESTS NEWICK ERRORS ---
#[test]
fn test_malformed_newick() {
    assert!(matches!(parse_error_kind("(A,B)"), ParsingErrorType::UnexpectedEof));
    assert!(matches!(parse_error_kind("(A,B"), ParsingErrorType::UnexpectedEof));
    assert!(matches!(parse_error_kind("(A,B)C D;"), ParsingErrorType::InvalidNewickString(_)));
    assert!(matches!(parse_error_kind("(A:x,B);"), ParsingErrorType::InvalidNewickString(_)));
    assert!(matches!(parse_error_kind(";"), ParsingErrorType::InvalidNewickString(_)));
    assert!(matches!(parse_error_kind("(A[open,B);"), ParsingErrorType::UnclosedComment));
    assert!(matches!(parse_error_kind("('A,B);"), ParsingErrorType::UnclosedQuote));
}

#[test]
fn test_error_position_points_into_source() {
    let err = TreeList::get_from_string("(A,B);\n(C;D);", "newick", ()).unwrap_err();
    let ReadError::Parse(e) = err else {
        panic!("expected a parse error");
    };
    assert_eq!(e.position(), 9);
}

#[test]
fn test_invalid_utf8_label_is_rejected() {
    let source: &[u8] = b"(A,K\xffa);";
    let err = TreeList::get_from_stream(source, "newick", ()).unwrap_err();
    let ReadError::Parse(e) = err else {
        panic!("expected a parse error");
    };
    assert_eq!(e.kind(), &ParsingErrorType::InvalidUtf8);
    assert_eq!(e.position(), 3);
}

// --- TESTS NEWICK PARSER API ---
#[test]
fn test_parser_with_builder() {
    let namespace = TaxonNamespace::shared();
    let builder = TaxonTreeBuilder::new(namespace.clone()).with_extract_comment_metadata(true);
    let mut parser = NewickParser::new(builder);
    let mut byte_parser = ByteParser::for_str("(A[&x=1],B);\n(B,C);\n");

    assert_eq!(parser.count_trees(&mut byte_parser).unwrap(), 2);
    let trees = parser.parse_all(byte_parser).unwrap();
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].node(0).annotations().get("x").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(namespace.borrow().labels(), ["A", "B", "C"]);
}

#[test]
fn test_iterator_stops_after_error() {
    let builder = TaxonTreeBuilder::new(TaxonNamespace::shared());
    let byte_parser = ByteParser::for_str("(A,B); (C,; (D,E);");
    let results: Vec<_> = NewickParser::new(builder).into_iter(byte_parser).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

// --- TESTS NEWICK WRITING ---
#[test]
fn test_written_newick_reads_back() {
    let options = ReadOptions::default().with_extract_comment_metadata(true);
    let trees = TreeList::get_from_path(fixture("birds-n5-t4.nwk"), "newick", &options).unwrap();

    let written: String = trees
        .iter()
        .map(|t| to_newick(t, &NewickStyle::default()) + "\n")
        .collect();
    let again = TreeList::get_from_string(&written, "newick", &options).unwrap();
    assert_eq!(trees, again);
}

#[test]
fn test_plain_and_indexed_styles() {
    let tree = Tree::get_from_string("[&R] ((Kiwi:1,Weka:2)[c]:1,Tui:3);", "newick", ()).unwrap();
    assert_eq!(to_newick(&tree, &NewickStyle::plain()), "((Kiwi:1,Weka:2):1,Tui:3);");

    let indexed = NewickStyle {
        edge_lengths: false,
        taxon_naming: TaxonNaming::OneIndexed,
        ..NewickStyle::plain()
    };
    assert_eq!(to_newick(&tree, &indexed), "((1,2),3);");
}
