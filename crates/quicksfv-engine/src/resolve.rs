use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use quicksfv_manifest::is_enclosed;

/// An opened payload plus its length when cheaply known.
pub struct ResolvedFile {
    pub reader: Box<dyn Read>,
    pub len:    Option<u64>,
}

impl ResolvedFile {
    pub fn new(reader: impl Read + 'static, len: Option<u64>) -> Self {
        Self {
            reader: Box::new(reader),
            len,
        }
    }
}

/// Maps manifest paths to byte streams.
///
/// Return an error of kind [`io::ErrorKind::NotFound`] for paths that do not
/// exist; every other error is reported as a read error. Each call must hand
/// out an independent stream, since workers open entries concurrently.
pub trait FileResolver: Sync {
    fn open(&self, path: &str) -> io::Result<ResolvedFile>;
}

/// Resolves manifest paths under a base directory.
#[derive(Clone, Debug)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }
}

impl FileResolver for DirectoryResolver {
    fn open(&self, path: &str) -> io::Result<ResolvedFile> {
        if !is_enclosed(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("path escapes base directory: {path}"),
            ));
        }

        let file = File::open(self.root.join(path))?;
        let len = file.metadata().ok().map(|meta| meta.len());
        Ok(ResolvedFile::new(file, len))
    }
}

#[cfg(feature = "zip")]
pub use self::archive::ZipPayloadResolver;

#[cfg(feature = "zip")]
mod archive {
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::{self, Read, Seek, SeekFrom};
    use std::path::PathBuf;

    use flate2::read::DeflateDecoder;
    use quicksfv_manifest::normalize_entry_path;
    use zip::{CompressionMethod, ZipArchive};

    use super::{FileResolver, ResolvedFile};

    const LOCAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
    const LOCAL_HEADER_LEN: usize = 30;

    #[derive(Clone, Copy, Debug)]
    enum Method {
        Stored,
        Deflated,
        Unsupported,
    }

    #[derive(Clone, Copy, Debug)]
    struct Slot {
        header_start:    u64,
        compressed_size: u64,
        size:            u64,
        method:          Method,
        encrypted:       bool,
    }

    /// Streams the uncompressed payload of entries inside a ZIP archive.
    ///
    /// The archive is indexed once. Every [`open`](FileResolver::open) uses a
    /// fresh file handle and inflates the raw entry data itself, so a damaged
    /// payload reaches the provider and shows up as a mismatch.
    #[derive(Debug)]
    pub struct ZipPayloadResolver {
        archive: PathBuf,
        slots:   HashMap<String, Slot>,
    }

    impl ZipPayloadResolver {
        pub fn new(archive: impl Into<PathBuf>) -> io::Result<Self> {
            let archive = archive.into();
            let mut zip = ZipArchive::new(File::open(&archive)?).map_err(invalid_data)?;

            let mut slots = HashMap::with_capacity(zip.len());
            for index in 0..zip.len() {
                let file = zip.by_index_raw(index).map_err(invalid_data)?;
                if file.is_dir() {
                    continue;
                }
                let Some(path) = normalize_entry_path(file.name()) else {
                    continue;
                };
                let method = match file.compression() {
                    CompressionMethod::Stored => Method::Stored,
                    CompressionMethod::Deflated => Method::Deflated,
                    _ => Method::Unsupported,
                };
                slots.insert(path, Slot {
                    header_start: file.header_start(),
                    compressed_size: file.compressed_size(),
                    size: file.size(),
                    method,
                    encrypted: file.encrypted(),
                });
            }

            tracing::debug!(archive = %archive.display(), entries = slots.len(), "indexed zip payloads");
            Ok(Self { archive, slots })
        }

        fn payload(&self, slot: &Slot) -> io::Result<io::Take<File>> {
            let mut file = File::open(&self.archive)?;
            file.seek(SeekFrom::Start(slot.header_start))?;

            let mut header = [0u8; LOCAL_HEADER_LEN];
            file.read_exact(&mut header)?;
            if header[..4] != LOCAL_HEADER_SIGNATURE {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "bad zip local header signature",
                ));
            }
            let name_len = u16::from_le_bytes([header[26], header[27]]);
            let extra_len = u16::from_le_bytes([header[28], header[29]]);
            file.seek(SeekFrom::Current(i64::from(name_len) + i64::from(extra_len)))?;

            Ok(file.take(slot.compressed_size))
        }
    }

    impl FileResolver for ZipPayloadResolver {
        fn open(&self, path: &str) -> io::Result<ResolvedFile> {
            let slot = self.slots.get(path).ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no archive entry `{path}`"))
            })?;
            if slot.encrypted {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "encrypted archive entry",
                ));
            }

            let payload = self.payload(slot)?;
            let len = Some(slot.size);
            match slot.method {
                Method::Stored => Ok(ResolvedFile::new(payload, len)),
                Method::Deflated => Ok(ResolvedFile::new(DeflateDecoder::new(payload), len)),
                Method::Unsupported => Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unsupported compression method",
                )),
            }
        }
    }

    fn invalid_data(err: zip::result::ZipError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}
