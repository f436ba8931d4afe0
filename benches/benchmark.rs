use criterion::{Criterion, criterion_group, criterion_main};
use phyloread::{ReadOptions, TreeList};
use std::fmt::Write;
use std::hint::black_box;

/// Caterpillar-and-cherry trees over `num_taxa` taxa, differing in their
/// edge lengths and a `[&posterior=..]` comment per tree.
fn generate_nexus(num_taxa: usize, num_trees: usize) -> String {
    let mut nexus = String::from("#NEXUS\nBegin TAXA;\n\tDimensions ntax=");
    let _ = writeln!(nexus, "{num_taxa};");
    nexus.push_str("\tTaxlabels");
    for i in 1..=num_taxa {
        let _ = write!(nexus, " taxon_{i}");
    }
    nexus.push_str(";\nEnd;\nBegin TREES;\n\tTranslate\n");
    for i in 1..=num_taxa {
        let sep = if i < num_taxa { "," } else { ";" };
        let _ = writeln!(nexus, "\t\t{i} taxon_{i}{sep}");
    }

    for t in 0..num_trees {
        let mut newick = format!("(1:0.{t},2:0.{t})");
        for i in 3..=num_taxa {
            newick = format!("({newick}[&rate={i}.5]:0.{i},{i}:1.{t})");
        }
        let _ = writeln!(nexus, "\tTree STATE_{t} = [&R] [&posterior=-{t}.25] {newick};");
    }
    nexus.push_str("End;\n");
    nexus
}

fn read_all(c: &mut Criterion) {
    let nexus = generate_nexus(50, 200);
    c.bench_function("nexus-n50-200", |b| {
        b.iter(|| TreeList::get_from_string(black_box(&nexus), "nexus", ()).unwrap());
    });

    let options = ReadOptions::default().with_extract_comment_metadata(true);
    c.bench_function("nexus-n50-200-metadata", |b| {
        b.iter(|| TreeList::get_from_string(black_box(&nexus), "nexus", &options).unwrap());
    });
}

fn read_last_tree(c: &mut Criterion) {
    let nexus = generate_nexus(50, 1000);
    let options = ReadOptions::default()
        .with_collection_offset(Some(0))
        .with_tree_offset(Some(-1));
    c.bench_function("nexus-n50-1k-last", |b| {
        b.iter(|| TreeList::get_from_string(black_box(&nexus), "nexus", &options).unwrap());
    });
}

criterion_group!(benches, read_all, read_last_tree);
criterion_main!(benches);
