//! File comparison: content, line content and modification order

use crate::fs::{read_chunk, require_regular_file, FileSystem};
use crate::types::{IoResultExt, Result, TreeError};
use std::fs::Metadata;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::time::SystemTime;

const CHUNK_SIZE: usize = 64 * 1024;

/// Whether two files hold identical bytes.
///
/// Two missing paths are equal; one missing path is not. Directories are
/// rejected with `IsADirectory`. Files of different length are unequal
/// without being read.
pub fn content_equals(fs: &dyn FileSystem, a: &Path, b: &Path) -> Result<bool> {
    let (meta_a, meta_b) = match stat_pair(fs, a, b)? {
        Pair::Decided(equal) => return Ok(equal),
        Pair::Both(meta_a, meta_b) => (meta_a, meta_b),
    };

    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    if fs.canonicalize(a).at(a)? == fs.canonicalize(b).at(b)? {
        return Ok(true);
    }

    let mut file_a = fs.open_read(a).at(a)?;
    let mut file_b = fs.open_read(b).at(b)?;
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = fill(&mut file_a, &mut buf_a).at(a)?;
        let read_b = fill(&mut file_b, &mut buf_b).at(b)?;
        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Like [`content_equals`], but compares line by line so that `\n`, `\r`
/// and `\r\n` terminators are interchangeable.
///
/// A missing final terminator does not make two files differ.
pub fn content_equals_ignore_eol(fs: &dyn FileSystem, a: &Path, b: &Path) -> Result<bool> {
    if let Pair::Decided(equal) = stat_pair(fs, a, b)? {
        return Ok(equal);
    }
    if fs.canonicalize(a).at(a)? == fs.canonicalize(b).at(b)? {
        return Ok(true);
    }

    let mut lines_a = Lines::new(BufReader::with_capacity(CHUNK_SIZE, fs.open_read(a).at(a)?));
    let mut lines_b = Lines::new(BufReader::with_capacity(CHUNK_SIZE, fs.open_read(b).at(b)?));
    let mut line_a = Vec::new();
    let mut line_b = Vec::new();

    loop {
        let more_a = lines_a.next_into(&mut line_a).at(a)?;
        let more_b = lines_b.next_into(&mut line_b).at(b)?;
        if more_a != more_b || line_a != line_b {
            return Ok(false);
        }
        if !more_a {
            return Ok(true);
        }
    }
}

/// Whether `path` was modified strictly after `reference`.
///
/// A missing `path` is never newer.
pub fn is_newer_than(fs: &dyn FileSystem, path: &Path, reference: SystemTime) -> Result<bool> {
    Ok(modified(fs, path)?.is_some_and(|mtime| mtime > reference))
}

/// Whether `path` was modified strictly before `reference`.
///
/// A missing `path` is never older.
pub fn is_older_than(fs: &dyn FileSystem, path: &Path, reference: SystemTime) -> Result<bool> {
    Ok(modified(fs, path)?.is_some_and(|mtime| mtime < reference))
}

/// [`is_newer_than`] with the time taken from `reference`, which must exist
pub fn is_newer_than_file(fs: &dyn FileSystem, path: &Path, reference: &Path) -> Result<bool> {
    is_newer_than(fs, path, reference_time(fs, reference)?)
}

/// [`is_older_than`] with the time taken from `reference`, which must exist
pub fn is_older_than_file(fs: &dyn FileSystem, path: &Path, reference: &Path) -> Result<bool> {
    is_older_than(fs, path, reference_time(fs, reference)?)
}

fn modified(fs: &dyn FileSystem, path: &Path) -> Result<Option<SystemTime>> {
    match stat(fs, path)? {
        Some(metadata) => Ok(Some(metadata.modified().at(path)?)),
        None => Ok(None),
    }
}

fn reference_time(fs: &dyn FileSystem, reference: &Path) -> Result<SystemTime> {
    fs.metadata(reference).at(reference)?.modified().at(reference)
}

enum Pair {
    /// Settled without reading: both missing, or only one present
    Decided(bool),
    Both(Metadata, Metadata),
}

/// Existence and kind checks shared by the content comparisons
fn stat_pair(fs: &dyn FileSystem, a: &Path, b: &Path) -> Result<Pair> {
    let (meta_a, meta_b) = match (stat(fs, a)?, stat(fs, b)?) {
        (None, None) => return Ok(Pair::Decided(true)),
        (Some(_), None) | (None, Some(_)) => return Ok(Pair::Decided(false)),
        (Some(meta_a), Some(meta_b)) => (meta_a, meta_b),
    };

    for (path, metadata) in [(a, &meta_a), (b, &meta_b)] {
        if metadata.is_dir() {
            return Err(TreeError::IsADirectory {
                path: path.to_path_buf(),
            });
        }
        require_regular_file(path, metadata)?;
    }
    Ok(Pair::Both(meta_a, meta_b))
}

fn stat(fs: &dyn FileSystem, path: &Path) -> Result<Option<Metadata>> {
    match fs.metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TreeError::from_io(path, e)),
    }
}

/// Read until `buf` is full or the stream ends
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_chunk(reader, &mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Splits a byte stream on `\n`, `\r` or `\r\n`
struct Lines<R> {
    reader: R,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Replace `line` with the next line, without its terminator.
    /// Returns `false` once the input is exhausted.
    fn next_into(&mut self, line: &mut Vec<u8>) -> io::Result<bool> {
        line.clear();
        let mut started = false;
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if buf.is_empty() {
                return Ok(started);
            }
            started = true;

            match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    line.extend_from_slice(&buf[..end]);
                    let carriage_return = buf[end] == b'\r';
                    self.reader.consume(end + 1);
                    if carriage_return {
                        self.skip_line_feed()?;
                    }
                    return Ok(true);
                }
                None => {
                    let len = buf.len();
                    line.extend_from_slice(buf);
                    self.reader.consume(len);
                }
            }
        }
    }

    /// The `\n` of a `\r\n` pair may sit in the next buffer
    fn skip_line_feed(&mut self) -> io::Result<()> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => {
                    if buf.first() == Some(&b'\n') {
                        self.reader.consume(1);
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFs;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let present = temp_dir.path().join("present.txt");
        let absent = temp_dir.path().join("absent.txt");
        fs::write(&present, b"x").expect("write");

        assert!(content_equals(&StdFs, &absent, &temp_dir.path().join("also-absent"))
            .expect("both missing"));
        assert!(!content_equals(&StdFs, &present, &absent).expect("one missing"));
        assert!(!content_equals(&StdFs, &absent, &present).expect("one missing"));
    }

    #[test]
    fn test_directory_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"x").expect("write");

        let error = content_equals(&StdFs, temp_dir.path(), &file).unwrap_err();
        assert!(matches!(error, TreeError::IsADirectory { .. }));
    }

    #[test]
    fn test_equal_and_different_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a.bin");
        let b = temp_dir.path().join("b.bin");
        let c = temp_dir.path().join("c.bin");
        let big: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
        let mut changed = big.clone();
        changed[150_000] ^= 0xff;
        fs::write(&a, &big).expect("write a");
        fs::write(&b, &big).expect("write b");
        fs::write(&c, &changed).expect("write c");

        assert!(content_equals(&StdFs, &a, &b).expect("compare a b"));
        assert!(!content_equals(&StdFs, &a, &c).expect("compare a c"));
        assert!(content_equals(&StdFs, &a, &a).expect("compare a a"));
    }

    #[test]
    fn test_different_lengths() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, b"abc").expect("write a");
        fs::write(&b, b"abcd").expect("write b");

        assert!(!content_equals(&StdFs, &a, &b).expect("compare"));
    }

    #[test]
    fn test_empty_files_are_equal() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"").expect("write a");
        fs::write(&b, b"").expect("write b");

        assert!(content_equals(&StdFs, &a, &b).expect("compare"));
    }

    #[test]
    fn test_ignore_eol_treats_terminators_alike() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cr = temp_dir.path().join("cr.txt");
        let lf = temp_dir.path().join("lf.txt");
        let crlf = temp_dir.path().join("crlf.txt");
        let longer = temp_dir.path().join("longer.txt");
        fs::write(&cr, b"123\r").expect("write cr");
        fs::write(&lf, b"123\n").expect("write lf");
        fs::write(&crlf, b"123\r\n").expect("write crlf");
        fs::write(&longer, b"123\r\n2").expect("write longer");

        assert!(content_equals_ignore_eol(&StdFs, &cr, &lf).expect("cr lf"));
        assert!(content_equals_ignore_eol(&StdFs, &cr, &crlf).expect("cr crlf"));
        assert!(content_equals_ignore_eol(&StdFs, &crlf, &lf).expect("crlf lf"));
        assert!(!content_equals_ignore_eol(&StdFs, &cr, &longer).expect("cr longer"));
        assert!(!content_equals_ignore_eol(&StdFs, &lf, &longer).expect("lf longer"));
        assert!(!content_equals(&StdFs, &cr, &lf).expect("bytes differ"));
    }

    #[test]
    fn test_ignore_eol_across_buffer_boundary() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let crlf = temp_dir.path().join("crlf.txt");
        let lf = temp_dir.path().join("lf.txt");
        // The first "\r\n" straddles the reader's buffer edge.
        let mut crlf_content = vec![b'a'; CHUNK_SIZE - 1];
        crlf_content.extend_from_slice(b"\r\nnext\r\n\r\nlast");
        let mut lf_content = vec![b'a'; CHUNK_SIZE - 1];
        lf_content.extend_from_slice(b"\nnext\n\nlast\n");
        fs::write(&crlf, &crlf_content).expect("write crlf");
        fs::write(&lf, &lf_content).expect("write lf");

        assert!(content_equals_ignore_eol(&StdFs, &crlf, &lf).expect("compare"));
    }

    #[test]
    fn test_ignore_eol_missing_and_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let absent = temp_dir.path().join("absent");

        assert!(content_equals_ignore_eol(&StdFs, &absent, &temp_dir.path().join("gone"))
            .expect("both missing"));
        let error =
            content_equals_ignore_eol(&StdFs, temp_dir.path(), temp_dir.path()).unwrap_err();
        assert!(matches!(error, TreeError::IsADirectory { .. }));
    }

    #[test]
    fn test_newer_and_older() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let old = temp_dir.path().join("old.txt");
        let reference = temp_dir.path().join("reference.txt");
        let new = temp_dir.path().join("new.txt");
        let base = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_600_000_000);
        for (path, offset) in [(&old, 0), (&reference, 10), (&new, 20)] {
            fs::write(path, b"x").expect("write");
            let mtime = base + std::time::Duration::from_secs(offset);
            StdFs.set_modified(path, mtime).expect("set mtime");
        }
        let missing = temp_dir.path().join("missing.txt");

        assert!(is_newer_than_file(&StdFs, &new, &reference).expect("new"));
        assert!(!is_newer_than_file(&StdFs, &old, &reference).expect("old"));
        assert!(is_older_than_file(&StdFs, &old, &reference).expect("old"));
        assert!(!is_older_than_file(&StdFs, &new, &reference).expect("new"));
        assert!(!is_newer_than(&StdFs, &missing, base).expect("missing"));
        assert!(!is_older_than(&StdFs, &missing, base).expect("missing"));

        let error = is_newer_than_file(&StdFs, &new, &missing).unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    #[cfg(unix)]
    fn test_socket_is_not_compared() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let socket = temp_dir.path().join("sock");
        let _listener = std::os::unix::net::UnixListener::bind(&socket).expect("bind");

        let error = content_equals(&StdFs, &socket, &socket).unwrap_err();
        assert_eq!(error.kind(), crate::types::ErrorKind::NotARegularFile);
    }
}
