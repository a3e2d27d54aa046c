use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Where a rendered report goes. File output is staged in a temporary file
/// next to the destination and only renamed into place by [`Sink::finish`],
/// so a failed run never leaves a partial artifact behind.
pub enum Sink {
    Stdout(io::Stdout),
    File { staged: NamedTempFile, dest: PathBuf },
}

impl Sink {
    pub fn open(dest: Option<&Path>) -> Result<Self> {
        let Some(dest) = dest else {
            return Ok(Sink::Stdout(io::stdout()));
        };

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        let staged = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to stage output in {}", dir.display()))?;

        Ok(Sink::File { staged, dest: dest.to_path_buf() })
    }

    /// ANSI styling only makes sense on an interactive stdout.
    pub fn supports_style(&self) -> bool {
        match self {
            Sink::Stdout(_) => console::colors_enabled(),
            Sink::File { .. } => false,
        }
    }

    pub fn writer(&mut self) -> &mut dyn Write {
        match self {
            Sink::Stdout(out) => out as &mut dyn Write,
            Sink::File { staged, .. } => staged.as_file_mut() as &mut dyn Write,
        }
    }

    pub fn finish(self) -> Result<()> {
        match self {
            Sink::Stdout(mut out) => out.flush()?,
            Sink::File { mut staged, dest } => {
                staged.as_file_mut().flush()?;
                staged
                    .persist(&dest)
                    .with_context(|| format!("Failed to write {}", dest.display()))?;
                info!(path = %dest.display(), "report written");
            }
        }
        Ok(())
    }
}
