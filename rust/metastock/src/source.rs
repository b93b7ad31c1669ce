//! Access to the named files of a database.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{self, BufReader, Cursor, Read, Seek},
    path::{Path, PathBuf},
    sync::Arc,
};

/// A collection of named files, such as a database directory. Implementations
/// only read: they never create files or directories.
pub trait DataSource {
    /// The type of an opened file.
    type Reader: Read + Seek;

    /// Returns `true` if a file named `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Opens the file named `name` for reading.
    ///
    /// # Errors
    /// This function returns an error if the file doesn't exist or can't be
    /// opened.
    fn open(&self, name: &str) -> io::Result<Self::Reader>;
}

/// A database directory on disk.
///
/// Files are looked up by their exact name first, then by an ASCII
/// case-insensitive match, since databases copied from case-insensitive file
/// systems often have lowercase names.
#[derive(Clone, Debug)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    /// Creates a new source for the directory `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_owned(),
        }
    }

    /// Returns the directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let exact = self.dir.join(name);
        if exact.is_file() {
            return Some(exact);
        }
        fs::read_dir(&self.dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .find(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
    }
}

impl DataSource for DirSource {
    type Reader = BufReader<File>;

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    fn open(&self, name: &str) -> io::Result<Self::Reader> {
        let path = self.resolve(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no file named '{name}' in {}", self.dir.display()),
            )
        })?;
        File::open(path).map(BufReader::new)
    }
}

/// Named in-memory files.
#[derive(Clone, Debug, Default)]
pub struct MemSource {
    files: HashMap<String, Arc<[u8]>>,
}

impl MemSource {
    /// Creates a new source with no files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the file `name`.
    pub fn insert(&mut self, name: impl ToString, contents: impl Into<Vec<u8>>) {
        self.files
            .insert(name.to_string(), Arc::from(contents.into()));
    }

    /// Adds or replaces the file `name` and returns the source.
    pub fn with_file(mut self, name: impl ToString, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents);
        self
    }

    /// Removes the file `name`, returning `true` if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.files.remove(name).is_some()
    }
}

impl DataSource for MemSource {
    type Reader = Cursor<Arc<[u8]>>;

    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn open(&self, name: &str) -> io::Result<Self::Reader> {
        self.files
            .get(name)
            .map(|contents| Cursor::new(Arc::clone(contents)))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no file named '{name}'"))
            })
    }
}

impl<S: DataSource> DataSource for &S {
    type Reader = S::Reader;

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn open(&self, name: &str) -> io::Result<Self::Reader> {
        (**self).open(name)
    }
}
