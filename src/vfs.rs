//! Virtual filesystem types. Provides [Filesystem] and [FileHandle] traits,
//! implemented by directory backed [DirFilesystem] and in-memory
//! [MemoryFilesystem].

use bytes::Bytes;
use std::{
    collections::HashMap,
    env, fs,
    io::{self, Read},
    path::{Component, Path, PathBuf},
    time::SystemTime,
};

/// Metadata of an opened [FileHandle].
#[derive(Clone, Copy, Debug)]
pub struct FileMetadata {
    /// Content length in bytes.
    pub len: u64,
    /// Modification time, if the filesystem tracks one.
    pub modified: Option<SystemTime>,
    /// Whether the name resolved to a directory instead of a regular file.
    pub is_dir: bool,
}

/// Trait for an opened file. Handles are request scoped, opened and dropped
/// within a single request; dropping the handle releases the underlying
/// resource on every exit path.
pub trait FileHandle {
    /// Accesses metadata of the opened file.
    fn metadata(&self) -> io::Result<FileMetadata>;
    /// Reads whole file content.
    fn read_content(&mut self) -> io::Result<Bytes>;
}

/// Trait for a filesystem serving files by logical name, eg.
/// `/dir1/dir2/file.html`. Names correspond to http request paths directly.
pub trait Filesystem {
    /// Handle type returned by [Self::open].
    type File: FileHandle;

    /// Opens file for given name. Whether the name resolved to a regular
    /// file or a directory is only known after [FileHandle::metadata].
    fn open(
        &self,
        name: &str,
    ) -> io::Result<Self::File>;

    /// Re-anchors [self] relative to the running executable location.
    /// Default implementation returns [self] unchanged; variants resolving
    /// against the process working directory override this, see
    /// [DirFilesystem::anchored_to_executable].
    fn anchored_to_executable(self) -> Self
    where
        Self: Sized,
    {
        self
    }
}

/// [Filesystem] serving files from a directory on the real filesystem.
#[derive(Debug)]
pub struct DirFilesystem {
    root: PathBuf,
}
impl DirFilesystem {
    /// Creates [self] serving files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self { root }
    }

    /// Resolves logical name into fs path under the root.
    ///
    /// Only plain path segments are accepted, `..` (and other special
    /// components) are rejected, a colliding name can never escape the
    /// served directory.
    fn resolve(
        &self,
        name: &str,
    ) -> io::Result<PathBuf> {
        let mut path = self.root.clone();
        for component in Path::new(name.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("{name}: path escapes served directory"),
                    ));
                }
            }
        }
        Ok(path)
    }
}
impl Filesystem for DirFilesystem {
    type File = DirFile;

    fn open(
        &self,
        name: &str,
    ) -> io::Result<Self::File> {
        let path = self.resolve(name)?;
        let file = fs::File::open(path)?;
        Ok(DirFile { file })
    }

    /// Recomputes the root against the running executable location, so that
    /// a relative root resolves the same no matter what the process working
    /// directory is. The new root is `<executable dir>/../<root>` with
    /// symlinks on the executable path resolved. Absolute roots are
    /// unaffected (joining keeps them as they are). If the executable
    /// location cannot be determined, [self] is returned unchanged; if only
    /// symlink resolution fails, the unresolved location is used.
    fn anchored_to_executable(self) -> Self {
        let exe = match env::current_exe() {
            Ok(exe) => exe,
            Err(_) => return self,
        };
        let exe = fs::canonicalize(&exe).unwrap_or(exe);

        let base = match exe.parent().and_then(|directory| directory.parent()) {
            Some(base) => base,
            None => return self,
        };

        let root = base.join(&self.root);
        Self { root }
    }
}

/// [FileHandle] over a real [fs::File], returned by [DirFilesystem].
#[derive(Debug)]
pub struct DirFile {
    file: fs::File,
}
impl FileHandle for DirFile {
    fn metadata(&self) -> io::Result<FileMetadata> {
        let metadata = self.file.metadata()?;
        Ok(FileMetadata {
            len: metadata.len(),
            modified: metadata.modified().ok(),
            is_dir: metadata.is_dir(),
        })
    }

    fn read_content(&mut self) -> io::Result<Bytes> {
        let mut content = Vec::new();
        self.file.read_to_end(&mut content)?;
        Ok(content.into())
    }
}

/// In-memory [Filesystem], a deterministic stand-in for [DirFilesystem] in
/// tests. Names are matched exactly as added, eg. `/dir/file.html`.
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    entries: HashMap<String, MemoryEntry>,
}
#[derive(Debug)]
enum MemoryEntry {
    File {
        content: Bytes,
        modified: Option<SystemTime>,
    },
    Directory,
}
impl MemoryFilesystem {
    /// Creates empty [self].
    pub fn new() -> Self {
        let entries = HashMap::new();
        Self { entries }
    }

    /// Adds regular file under given name.
    pub fn file_add(
        &mut self,
        name: impl Into<String>,
        content: impl Into<Bytes>,
        modified: Option<SystemTime>,
    ) {
        self.entries.insert(
            name.into(),
            MemoryEntry::File {
                content: content.into(),
                modified,
            },
        );
    }

    /// Adds directory under given name.
    pub fn directory_add(
        &mut self,
        name: impl Into<String>,
    ) {
        self.entries.insert(name.into(), MemoryEntry::Directory);
    }
}
impl Filesystem for MemoryFilesystem {
    type File = MemoryFile;

    fn open(
        &self,
        name: &str,
    ) -> io::Result<Self::File> {
        match self.entries.get(name) {
            Some(MemoryEntry::File { content, modified }) => Ok(MemoryFile {
                content: content.clone(),
                modified: *modified,
                is_dir: false,
            }),
            Some(MemoryEntry::Directory) => Ok(MemoryFile {
                content: Bytes::new(),
                modified: None,
                is_dir: true,
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{name}: no such file"),
            )),
        }
    }
}

/// [FileHandle] returned by [MemoryFilesystem].
#[derive(Debug)]
pub struct MemoryFile {
    content: Bytes,
    modified: Option<SystemTime>,
    is_dir: bool,
}
impl FileHandle for MemoryFile {
    fn metadata(&self) -> io::Result<FileMetadata> {
        Ok(FileMetadata {
            len: self.content.len() as u64,
            modified: self.modified,
            is_dir: self.is_dir,
        })
    }

    fn read_content(&mut self) -> io::Result<Bytes> {
        Ok(self.content.clone())
    }
}


#[cfg(test)]
mod test_memory_filesystem {
    use super::{FileHandle, Filesystem, MemoryFilesystem};
    use std::io;

    #[test]
    fn resolves_file_and_directory_entries() {
        let mut fs = MemoryFilesystem::new();
        fs.file_add("/file.txt", &b"content"[..], None);
        fs.directory_add("/subdir");

        let mut file = fs.open("/file.txt").unwrap();
        assert!(!file.metadata().unwrap().is_dir);
        assert_eq!(&*file.read_content().unwrap(), b"content");

        let directory = fs.open("/subdir").unwrap();
        assert!(directory.metadata().unwrap().is_dir);

        let error = fs.open("/missing.txt").unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
