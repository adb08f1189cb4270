//! Log dumping for failed builds and launches.

use std::io::{self, Write};
use std::path::Path;

/// Write a log file framed by cut markers.
pub fn write_log(log: &Path, out: &mut impl Write) -> io::Result<()> {
  let name = log
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| log.display().to_string());
  let content = std::fs::read(log)?;

  writeln!(out, "---%<--- {}", name)?;
  out.write_all(&content)?;
  if !content.ends_with(b"\n") && !content.is_empty() {
    writeln!(out)?;
  }
  writeln!(out, "--->%---")?;
  Ok(())
}

/// Print a log file to stdout so it lands next to the failing test's output.
pub fn dump_log(log: &Path) -> io::Result<()> {
  let stdout = io::stdout();
  let mut lock = stdout.lock();
  write_log(log, &mut lock)?;
  lock.flush()
}
