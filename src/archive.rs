use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::error::{DecodeError, DecodeResult};
use crate::filter::Filter;

/// Upper bound on the buffer reserved up front from a member's declared size.
const MAX_PREALLOCATION: u64 = 1 << 20;

#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct ArchiveContents {
    pub entries: Vec<ArchiveEntry>,
    /// Members that are neither directories nor class files.
    pub skipped: Vec<DecodeError>,
}

/// Reads every accepted `.class` member of a jar, zip or war.
pub fn read_class_entries(archive_path: &Path, filter: &Filter) -> DecodeResult<ArchiveContents> {
    let file = File::open(archive_path)?;
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the file, ensuring memory safety.
    let mmap = unsafe { Mmap::map(&file) }?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..])).map_err(zip_error)?;

    let mut contents = ArchiveContents::default();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_error)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if !name.to_ascii_lowercase().ends_with(".class") {
            tracing::trace!(archive = %archive_path.display(), entry = %name, "skipping non-class entry");
            contents
                .skipped
                .push(DecodeError::UnsupportedArchiveEntry { name });
            continue;
        }
        if !filter.accept_inner_class(&name) {
            continue;
        }

        let mut bytes = Vec::with_capacity(preallocation(entry.size()));
        entry.read_to_end(&mut bytes)?;
        contents.entries.push(ArchiveEntry { name, bytes });
    }

    tracing::debug!(
        archive = %archive_path.display(),
        classes = contents.entries.len(),
        skipped = contents.skipped.len(),
        "read archive"
    );
    Ok(contents)
}

/// The declared size comes from the archive header and is not trusted.
fn preallocation(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATION) as usize
}

fn zip_error(err: zip::result::ZipError) -> DecodeError {
    match err {
        zip::result::ZipError::Io(io) => DecodeError::UnreadableInput(io),
        other => DecodeError::UnreadableInput(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            other,
        )),
    }
}
