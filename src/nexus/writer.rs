//! NEXUS format writer for a [TreeList].

use crate::model::tree_list::TreeList;
use crate::newick::{NewickStyle, TaxonNaming, to_newick};
use crate::nexus::defs::{
    BLOCK_BEGIN, BLOCK_END, DIMENSIONS, NEXUS_HEADER, NTAX, TAXA, TAXLABELS, TRANSLATE, TREE, TREES,
};
use crate::parser::utils::escape_label;
use std::io;
use std::io::{BufWriter, Write};

// =#========================================================================#=
// NEXUS WRITER
// =#========================================================================#=
/// Writer for a [TreeList] in NEXUS format.
///
/// # Format Structure
/// The writer produces a NEXUS document with the following structure:
/// - `#NEXUS` header
/// - `TAXA` block with dimensions and tax labels of the list's namespace
/// - `TREES` block with a TRANSLATE command (1-based taxon positions as
///   keys) and one `TREE` command per tree
///
/// # Example
/// ```
/// use phyloread::model::TreeList;
/// use phyloread::nexus::NexusWriter;
///
/// let trees = TreeList::get_from_string("(Kiwi:1,(Moa:1,Emu:1):2);", "newick", ()).unwrap();
/// let mut out = Vec::new();
/// NexusWriter::new(&mut out).write_nexus(&trees).unwrap();
///
/// let nexus = String::from_utf8(out).unwrap();
/// assert!(nexus.contains("\tTaxlabels Kiwi Moa Emu;\n"));
/// assert!(nexus.contains("Tree tree_1 = (1:1,(2:1,3:1):2);"));
/// ```
pub struct NexusWriter<W: Write> {
    bw: BufWriter<W>,
}

// ============================================================================
// API (pub)
// ============================================================================
impl<W: Write> NexusWriter<W> {
    /// Creates a new NEXUS writer writing to `writer` (buffered).
    pub fn new(writer: W) -> Self {
        NexusWriter {
            bw: BufWriter::new(writer),
        }
    }

    /// Writes a complete NEXUS document for `trees`. Trees without a label
    /// are named `tree_<n>`, counting from 1.
    ///
    /// # Errors
    /// Returns an I/O error if writing fails
    pub fn write_nexus(&mut self, trees: &TreeList) -> io::Result<()> {
        self.header()?.taxa_block(trees)?.trees_block(trees)?;
        self.bw.flush()
    }
}

// ============================================================================
// Nexus Block & Command Writing (private)
// ============================================================================
impl<W: Write> NexusWriter<W> {
    /// Writes the NEXUS file header ("#NEXUS"), returning itself for chaining.
    fn header(&mut self) -> io::Result<&mut Self> {
        self.write_all(NEXUS_HEADER)?.newline()
    }

    /// Writes the TAXA block with dimensions and taxon labels, returning itself for chaining.
    fn taxa_block(&mut self, trees: &TreeList) -> io::Result<&mut Self> {
        let namespace = trees.taxon_namespace().borrow();

        // "Begin TAXA;"
        self.write_all(BLOCK_BEGIN)?.space()?.write_all(TAXA)?.semicolon_ln()?;

        // "\tDimensions ntax=n;"
        self.tab()?
            .write_all(DIMENSIONS)?
            .space()?
            .write_all(NTAX.as_bytes())?
            .equals()?
            .write_all(namespace.len().to_string().as_bytes())?
            .semicolon_ln()?;

        // "\tTaxlabels label ...;"
        self.tab()?.write_all(TAXLABELS)?;
        for taxon in namespace.iter() {
            self.space()?.write_all(escape_label(taxon.label()).as_bytes())?;
        }
        self.semicolon_ln()?;

        self.write_all(BLOCK_END)?.semicolon_ln()
    }

    /// Writes the TREES block with TRANSLATE command and tree list, returning itself for chaining.
    fn trees_block(&mut self, trees: &TreeList) -> io::Result<&mut Self> {
        // "Begin TREES;"
        self.write_all(BLOCK_BEGIN)?.space()?.write_all(TREES)?.semicolon_ln()?;

        self.translate_cmd(trees)?.tree_cmd_list(trees)?;

        self.write_all(BLOCK_END)?.semicolon_ln()
    }

    /// Writes the TRANSLATE command mapping positions to labels, returning itself for chaining.
    fn translate_cmd(&mut self, trees: &TreeList) -> io::Result<&mut Self> {
        let namespace = trees.taxon_namespace().borrow();
        if namespace.is_empty() {
            return Ok(self);
        }

        self.tab()?.write_all(TRANSLATE)?.newline()?;
        let num_taxa = namespace.len();
        for (i, taxon) in namespace.iter().enumerate() {
            // "\t\t<i + 1> <label>,"
            self.tab()?
                .tab()?
                .write_all((i + 1).to_string().as_bytes())?
                .space()?
                .write_all(escape_label(taxon.label()).as_bytes())?;

            // No comma after last pair
            if i + 1 < num_taxa {
                self.comma()?;
            }
            self.newline()?;
        }
        self.tab()?.semicolon_ln()
    }

    /// Writes one TREE command per tree, returning itself for chaining.
    fn tree_cmd_list(&mut self, trees: &TreeList) -> io::Result<&mut Self> {
        let style = NewickStyle {
            taxon_naming: TaxonNaming::OneIndexed,
            ..NewickStyle::default()
        };

        // "\tTree <name> = <newick>;"
        for (i, tree) in trees.iter().enumerate() {
            let name = match tree.label() {
                Some(label) => escape_label(label),
                None => format!("tree_{}", i + 1),
            };

            self.tab()?
                .write_all(TREE)?
                .space()?
                .write_all(name.as_bytes())?
                .space()?
                .equals()?
                .space()?
                .write_all(to_newick(tree, &style).as_bytes())?
                .newline()?;
        }
        Ok(self)
    }
}

// ============================================================================
// Little Helpers (private)
// ============================================================================
impl<W: Write> NexusWriter<W> {
    /// Appends a byte slice to the [BufWriter], returning itself for chaining.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<&mut Self> {
        self.bw.write_all(buf)?;
        Ok(self)
    }

    fn space(&mut self) -> io::Result<&mut Self> {
        self.write_all(b" ")
    }

    fn tab(&mut self) -> io::Result<&mut Self> {
        self.write_all(b"\t")
    }

    fn newline(&mut self) -> io::Result<&mut Self> {
        self.write_all(b"\n")
    }

    /// Appends a semicolon followed by a newline (';\n'), returning itself for chaining.
    fn semicolon_ln(&mut self) -> io::Result<&mut Self> {
        self.write_all(b";\n")
    }

    fn comma(&mut self) -> io::Result<&mut Self> {
        self.write_all(b",")
    }

    fn equals(&mut self) -> io::Result<&mut Self> {
        self.write_all(b"=")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeList;

    #[test]
    fn written_document_reads_back() {
        let source = "[&U] ('Buller''s albatross':0.5,(Toroa[&ring=true]:1,'Grey-headed albatross':2));\n";
        let trees = TreeList::get_from_string(source, "newick", ()).unwrap();

        let mut out = Vec::new();
        NexusWriter::new(&mut out).write_nexus(&trees).unwrap();
        let nexus = String::from_utf8(out).unwrap();
        assert!(nexus.starts_with("#NEXUS\nBegin TAXA;\n\tDimensions ntax=3;\n"));
        assert!(nexus.contains("\t\t1 'Buller''s albatross',\n"));

        let reread = TreeList::get_from_string(&nexus, "nexus", ()).unwrap();
        assert_eq!(reread.len(), 1);
        assert_eq!(reread[0].to_string(), trees[0].to_string());
    }
}
