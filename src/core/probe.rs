//! Filesystem metadata probing for tau.
//!
//! [FsProbe] answers the two questions the cache delegates to background workers: how many items
//! a directory holds and what content type a file has.
//!
//! Content types are decided from the file header first (magic bytes), then from the extension,
//! then by a text/binary sniff of the first kilobyte.

use crate::core::source::MetadataProbe;

use phf::phf_map;

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

// Number of bytes to peek from file start for header checks (eg. PNG, ZIP, etc..)
const HEADER_PEEK_BYTES: usize = 16;
// Bytes to peek for null bytes in binary detection
const BINARY_PEEK_BYTES: usize = 1024;

/// Magic byte prefixes and the type they identify. Checked in order.
const MAGIC: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/gzip"),
    (b"\x7fELF", "application/x-executable"),
    (b"BZh", "application/x-bzip2"),
    (b"\xfd7zXZ\x00", "application/x-xz"),
    (b"7z\xbc\xaf\x27\x1c", "application/x-7z-compressed"),
    (b"OggS", "audio/ogg"),
    (b"fLaC", "audio/flac"),
    (b"ID3", "audio/mpeg"),
    (b"\x00asm", "application/wasm"),
    (b"SQLite format 3\x00", "application/vnd.sqlite3"),
];

/// File extension to content type mapping, used when the header is not conclusive.
static EXT_TYPE_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "rs" => "text/rust",
    "py" => "text/x-python",
    "js" => "text/javascript",
    "ts" => "text/typescript",
    "kt" => "text/x-kotlin",
    "java" => "text/x-java",
    "c" => "text/x-c",
    "h" => "text/x-c",
    "cpp" => "text/x-c++",
    "hpp" => "text/x-c++",
    "go" => "text/x-go",
    "sh" => "application/x-shellscript",
    "md" => "text/markdown",
    "txt" => "text/plain",
    "html" => "text/html",
    "htm" => "text/html",
    "css" => "text/css",
    "csv" => "text/csv",
    "json" => "application/json",
    "toml" => "application/toml",
    "yaml" => "application/yaml",
    "yml" => "application/yaml",
    "xml" => "application/xml",
    "svg" => "image/svg+xml",
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "mp3" => "audio/mpeg",
    "flac" => "audio/flac",
    "wav" => "audio/wav",
    "mp4" => "video/mp4",
    "mkv" => "video/x-matroska",
    "webm" => "video/webm",
    "pdf" => "application/pdf",
    "zip" => "application/zip",
    "gz" => "application/gzip",
    "tar" => "application/x-tar",
    "7z" => "application/x-7z-compressed",
    "lock" => "text/plain",
};

/// Probes metadata from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe {
    recursive_counts: bool,
}

impl FsProbe {
    /// With `recursive_counts`, [MetadataProbe::item_count] walks the whole subtree instead of
    /// counting direct children.
    pub fn new(recursive_counts: bool) -> Self {
        Self { recursive_counts }
    }
}

impl MetadataProbe for FsProbe {
    fn item_count(&self, dir: &Path) -> io::Result<u64> {
        if self.recursive_counts {
            count_recursive(dir)
        } else {
            let mut count = 0u64;
            for entry in fs::read_dir(dir)? {
                if entry.is_ok() {
                    count += 1;
                }
            }
            Ok(count)
        }
    }

    fn content_type(&self, file: &Path) -> io::Result<Option<String>> {
        probe_content_type(file)
    }
}

/// Counts every item below `dir`. Unreadable subdirectories count as a single item.
fn count_recursive(dir: &Path) -> io::Result<u64> {
    let mut count = 0u64;
    let mut stack = vec![dir.to_path_buf()];
    let mut root = true;

    while let Some(current) = stack.pop() {
        let read = match fs::read_dir(&current) {
            Ok(read) => read,
            // The root must be readable, nested failures are tolerated
            Err(e) if root => return Err(e),
            Err(_) => continue,
        };
        root = false;

        for entry in read.flatten() {
            count += 1;
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                stack.push(entry.path());
            }
        }
    }
    Ok(count)
}

/// Determines the content type of a file.
/// # Returns
/// `Ok(None)` for files that are neither recognizable nor clearly text.
pub fn probe_content_type(path: &Path) -> io::Result<Option<String>> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; BINARY_PEEK_BYTES];
    let n = read_up_to(&mut file, &mut buffer)?;
    let head = &buffer[..n];

    if n == 0 {
        return Ok(Some("application/x-empty".to_string()));
    }

    let header = &head[..n.min(HEADER_PEEK_BYTES)];
    if let Some((_, mime)) = MAGIC.iter().find(|(magic, _)| header.starts_with(magic)) {
        return Ok(Some((*mime).to_string()));
    }

    if let Some(mime) = extension_type(path) {
        return Ok(Some(mime.to_string()));
    }

    if head.contains(&0) {
        Ok(None)
    } else if std::str::from_utf8(head).is_ok() || is_utf8_truncated(head) {
        Ok(Some("text/plain".to_string()))
    } else {
        Ok(None)
    }
}

/// Looks up the content type implied by the file extension.
pub fn extension_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    EXT_TYPE_MAP
        .get(ext)
        .or_else(|| EXT_TYPE_MAP.get(ext.to_ascii_lowercase().as_str()))
        .copied()
}

fn read_up_to(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// A multi-byte character cut at the peek boundary is still text.
fn is_utf8_truncated(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}
