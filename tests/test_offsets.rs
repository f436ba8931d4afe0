use phyloread::newick::{NewickStyle, to_newick};
use phyloread::{ReadError, ReadOptions, TreeList};
use proptest::prelude::*;

/// Caterpillar tree over taxa `T0..Tn`, rotated by `shift` so consecutive
/// trees differ.
fn caterpillar(num_taxa: usize, shift: usize) -> String {
    let mut newick = format!("T{}", shift % num_taxa);
    for i in 1..num_taxa {
        newick = format!("({newick},T{})", (i + shift) % num_taxa);
    }
    newick + ";"
}

fn newick_source(num_trees: usize) -> String {
    (0..num_trees).map(|i| caterpillar(4, i) + "\n").collect()
}

/// Two TREES blocks holding `first` and `second` trees.
fn nexus_source(first: usize, second: usize) -> String {
    let block = |name: &str, n: usize, skip: usize| -> String {
        let trees: String = (0..n)
            .map(|i| format!("\tTree {name}{i} = {}\n", caterpillar(4, i + skip)))
            .collect();
        format!("Begin trees;\n{trees}End;\n")
    };
    format!("#NEXUS\n{}{}", block("a", first, 0), block("b", second, first))
}

fn read(source: &str, schema: &str, collection: isize, tree: isize) -> Result<TreeList, ReadError> {
    let options = ReadOptions::default()
        .with_collection_offset(Some(collection))
        .with_tree_offset(Some(tree));
    TreeList::get_from_string(source, schema, options)
}

fn plain(trees: &TreeList) -> Vec<String> {
    trees.iter().map(|t| to_newick(t, &NewickStyle::plain())).collect()
}

proptest! {
    #[test]
    fn newick_tree_offset_selects_suffix(n in 0usize..12, t in -15isize..15) {
        let source = newick_source(n);
        let all = plain(&TreeList::get_from_string(&source, "newick", ()).unwrap());

        match read(&source, "newick", 0, t) {
            Ok(trees) => {
                let expected = if t < 0 { n.min(t.unsigned_abs()) } else { n - t as usize };
                prop_assert_eq!(trees.len(), expected);
                prop_assert_eq!(plain(&trees), all[n - expected..].to_vec());
            }
            Err(e) => {
                prop_assert!(e.is_addressing());
                prop_assert!(t > 0 && t as usize >= n);
            }
        }
    }

    #[test]
    fn nexus_offsets_select_block_suffix(
        first in 0usize..6,
        second in 0usize..6,
        c in -3isize..3,
        t in -8isize..8,
    ) {
        let source = nexus_source(first, second);
        let sizes = [first, second];

        match read(&source, "nexus", c, t) {
            Ok(trees) => {
                let block = if c < 0 { (2 + c) as usize } else { c as usize };
                let n = sizes[block];
                let expected = if t < 0 { n.min(t.unsigned_abs()) } else { n - t as usize };
                prop_assert_eq!(trees.len(), expected);

                let prefix = if block == 0 { "a" } else { "b" };
                for (i, tree) in trees.iter().enumerate() {
                    let label = format!("{prefix}{}", n - expected + i);
                    prop_assert_eq!(tree.label(), Some(label.as_str()));
                }
            }
            Err(ReadError::Addressing(_)) => {
                let collection_ok = (-2..2).contains(&c);
                let block = if c < 0 { (2 + c).max(0) as usize } else { c.min(1) as usize };
                let tree_ok = t <= 0 || (t as usize) < sizes[block];
                prop_assert!(!(collection_ok && tree_ok));
            }
            Err(e) => prop_assert!(false, "unexpected error {:?}", e),
        }
    }
}
