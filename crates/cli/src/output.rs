//! Result sink: neighbor ids as plain decimal integers, one per line.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write `ids` in order, one per line, each line newline-terminated.
pub fn write_ids_to<W: Write>(mut writer: W, ids: &[u32]) -> io::Result<()> {
    for id in ids {
        writeln!(writer, "{id}")?;
    }
    writer.flush()
}

/// Create or truncate `path` and write `ids` to it.
pub fn write_ids(path: &Path, ids: &[u32]) -> io::Result<()> {
    write_ids_to(BufWriter::new(File::create(path)?), ids)
}
