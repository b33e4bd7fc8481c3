//! Print the entity metadata test vectors as JSON.

use std::io::{self, Write};

use metadata_registry_testkit::all_vectors;

fn main() -> io::Result<()> {
    let vectors = all_vectors();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &vectors)?;
    writeln!(out)?;
    Ok(())
}
