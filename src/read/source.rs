use std::io::Read;
use std::path::Path;

/// Where the trees of a read operation come from.
pub enum TreeSource<'a> {
    /// A file, opened and closed by the read operation
    Path(&'a Path),
    /// An open stream, read to its end; the caller keeps ownership
    Stream(&'a mut dyn Read),
    /// Raw text
    Text(&'a str),
}

impl TreeSource<'_> {
    /// Short description for log messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            TreeSource::Path(path) => format!("file {}", path.display()),
            TreeSource::Stream(_) => "stream".to_string(),
            TreeSource::Text(text) => format!("string of {} bytes", text.len()),
        }
    }
}
