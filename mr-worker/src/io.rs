use std::io::{BufRead, Write};
use std::path::Path;

use mr_proto::KeyValue;

/// Intermediate and final files both use one `key\tvalue` pair per line --
/// the same textual shape the original lab's worker wrote, just tab- rather
/// than space-separated so a value containing spaces round-trips.
pub(crate) fn write_kv_lines(path: &Path, records: &[KeyValue]) -> std::io::Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    for kv in records {
        writeln!(out, "{}\t{}", kv.key, kv.value)?;
    }
    out.flush()
}

pub(crate) fn read_kv_lines(path: &Path) -> std::io::Result<Vec<KeyValue>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once('\t') {
            out.push(KeyValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(out)
}
