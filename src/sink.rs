use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, StdoutLock, Write};
use std::path::Path;

/// Permissions for directories created on the way to an output file.
pub const DIRECTORY_WRITE_PERMISSIONS: u32 = 0o700;

/// Permissions for a newly created output file.
pub const FILE_WRITE_PERMISSIONS: u32 = 0o600;

/// Where transcribed bytes go.
pub enum Destination<'a> {
    /// A file, created (with parent directories) or truncated when the write starts.
    File(&'a Path),
    /// A caller-provided stream. It is flushed but not closed.
    Stream(&'a mut dyn Write),
    Stdout,
}

impl std::fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::File(path) => f.debug_tuple("File").field(path).finish(),
            Destination::Stream(_) => f.write_str("Stream"),
            Destination::Stdout => f.write_str("Stdout"),
        }
    }
}

impl<'a> From<&'a mut dyn Write> for Destination<'a> {
    fn from(stream: &'a mut dyn Write) -> Self {
        Destination::Stream(stream)
    }
}

impl<'a> From<&'a Path> for Destination<'a> {
    fn from(path: &'a Path) -> Self {
        Destination::File(path)
    }
}

impl<'a> Destination<'a> {
    /// Resolve to a writable target. For files this is the point where the file is created.
    pub(crate) fn open(self) -> io::Result<Sink<'a>> {
        Ok(match self {
            Destination::File(path) => Sink::File(BufWriter::new(open_file_for_write(path)?)),
            Destination::Stream(stream) => Sink::Stream(stream),
            Destination::Stdout => Sink::Stdout(io::stdout().lock()),
        })
    }
}

/// An opened destination. Dropping it releases the file handle.
pub(crate) enum Sink<'a> {
    File(BufWriter<File>),
    Stream(&'a mut dyn Write),
    Stdout(StdoutLock<'static>),
}

impl Write for Sink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::File(w) => w.write(buf),
            Sink::Stream(w) => w.write(buf),
            Sink::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::File(w) => w.flush(),
            Sink::Stream(w) => w.flush(),
            Sink::Stdout(w) => w.flush(),
        }
    }
}

/// Open `path` for writing, creating missing parent directories (owner-only) and
/// truncating an existing file.
pub fn open_file_for_write(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DIRECTORY_WRITE_PERMISSIONS);
        }
        builder.create(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_WRITE_PERMISSIONS);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_parent_directories_and_truncates() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("a").join("b").join("out.txt");

        open_file_for_write(&path)?.write_all(b"first version")?;
        open_file_for_write(&path)?.write_all(b"second")?;
        assert_eq!(fs::read_to_string(&path)?, "second");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn new_files_are_owner_only() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("out.txt");
        open_file_for_write(&path)?;

        let file_mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(file_mode & !FILE_WRITE_PERMISSIONS, 0);
        let dir_mode = fs::metadata(dir.path().join("nested"))?.permissions().mode() & 0o777;
        assert_eq!(dir_mode & !DIRECTORY_WRITE_PERMISSIONS, 0);
        Ok(())
    }

    #[test]
    fn stream_destination_writes_through() -> anyhow::Result<()> {
        let mut buf = Vec::new();
        {
            let mut sink = Destination::Stream(&mut buf).open()?;
            sink.write_all(b"hi")?;
            sink.flush()?;
        }
        assert_eq!(buf, b"hi");
        Ok(())
    }
}
