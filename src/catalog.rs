//! Ordered image catalog built from a directory listing.
//!
//! The catalog is built once at startup and never changes afterwards. Images
//! added to or removed from the directory while the carousel runs are not
//! picked up.

use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// How catalog entries are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CatalogOrder {
    /// Byte-wise lexicographic order of the file names.
    #[default]
    Sorted,
    /// Whatever order the directory listing yields. Not stable across
    /// filesystems or runs.
    Filesystem,
}

/// An immutable, indexable list of image file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCatalog {
    dir: PathBuf,
    names: Vec<OsString>,
}

impl ImageCatalog {
    /// List `dir` and build the catalog.
    ///
    /// The `.` and `..` pseudo-entries are never included. Fails with
    /// [`Error::Directory`] when the directory cannot be listed and with
    /// [`Error::EmptyDirectory`] when it holds no entries.
    pub fn build(dir: impl AsRef<Path>, order: CatalogOrder) -> Result<Self> {
        let dir = dir.as_ref();
        let listing = fs::read_dir(dir).map_err(|source| Error::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in listing {
            let entry = entry.map_err(|source| Error::Directory {
                path: dir.to_path_buf(),
                source,
            })?;
            let name = entry.file_name();
            if is_pseudo_entry(&name) {
                continue;
            }
            names.push(name);
        }

        Self::from_names(dir, names, order)
    }

    /// Build a catalog from names that are already known.
    pub fn from_names(
        dir: impl Into<PathBuf>,
        names: impl IntoIterator<Item = impl Into<OsString>>,
        order: CatalogOrder,
    ) -> Result<Self> {
        let dir = dir.into();
        let mut names: Vec<OsString> = names
            .into_iter()
            .map(Into::<OsString>::into)
            .filter(|name| !is_pseudo_entry(name))
            .collect();

        if names.is_empty() {
            return Err(Error::EmptyDirectory(dir));
        }

        if order == CatalogOrder::Sorted {
            names.sort();
        }

        log::debug!(
            "catalog of {} images from {} ({:?} order)",
            names.len(),
            dir.display(),
            order
        );

        Ok(Self { dir, names })
    }

    /// Directory the catalog was built from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of images.
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Index of the last image.
    pub fn last_index(&self) -> usize {
        self.names.len() - 1
    }

    /// File name at `index`.
    pub fn name_at(&self, index: usize) -> Result<&OsStr> {
        self.names
            .get(index)
            .map(OsString::as_os_str)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.names.len(),
            })
    }

    /// Full path of the image at `index`.
    pub fn path_at(&self, index: usize) -> Result<PathBuf> {
        self.name_at(index).map(|name| self.dir.join(name))
    }

    /// Iterate over the file names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &OsStr> {
        self.names.iter().map(OsString::as_os_str)
    }
}

fn is_pseudo_entry(name: &OsStr) -> bool {
    name == "." || name == ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch_all(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[test]
    fn test_build_counts_real_entries() {
        let tmp = tempfile::tempdir().unwrap();
        touch_all(tmp.path(), &["c.bmp", "a.bmp", "b.bmp"]);

        let catalog = ImageCatalog::build(tmp.path(), CatalogOrder::Sorted).unwrap();
        assert_eq!(catalog.count(), 3);
        assert_eq!(catalog.last_index(), 2);
        for index in 0..catalog.count() {
            assert!(catalog.name_at(index).is_ok());
        }
    }

    #[test]
    fn test_sorted_order() {
        let tmp = tempfile::tempdir().unwrap();
        touch_all(tmp.path(), &["c.bmp", "a.bmp", "b.bmp"]);

        let catalog = ImageCatalog::build(tmp.path(), CatalogOrder::Sorted).unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["a.bmp", "b.bmp", "c.bmp"]);
        assert_eq!(catalog.path_at(1).unwrap(), tmp.path().join("b.bmp"));
    }

    #[test]
    fn test_filesystem_order_keeps_all_entries() {
        let tmp = tempfile::tempdir().unwrap();
        touch_all(tmp.path(), &["c.bmp", "a.bmp", "b.bmp"]);

        let catalog = ImageCatalog::build(tmp.path(), CatalogOrder::Filesystem).unwrap();
        let mut names: Vec<_> = catalog.names().map(|n| n.to_owned()).collect();
        names.sort();
        assert_eq!(names, ["a.bmp", "b.bmp", "c.bmp"]);
    }

    #[test]
    fn test_from_names_preserves_given_order() {
        let catalog =
            ImageCatalog::from_names("/img", ["z", ".", "y", "..", "x"], CatalogOrder::Filesystem)
                .unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["z", "y", "x"]);
    }

    #[test]
    fn test_name_at_out_of_range() {
        let catalog = ImageCatalog::from_names("/img", ["a"], CatalogOrder::Sorted).unwrap();
        assert!(matches!(
            catalog.name_at(1),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(catalog.path_at(usize::MAX).is_err());
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageCatalog::build(tmp.path(), CatalogOrder::Sorted),
            Err(Error::EmptyDirectory(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            ImageCatalog::build(&missing, CatalogOrder::Sorted),
            Err(Error::Directory { .. })
        ));
    }
}
