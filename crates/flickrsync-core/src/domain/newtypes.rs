//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for photo paths and the
//! identifiers Flickr assigns to photos and albums (photosets).
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::photo::AlbumPlacement;

// ============================================================================
// PhotoPath
// ============================================================================

/// Identifier of a local photo: its full path, as produced by the photo index
///
/// Ordering is the byte-wise ordering of the underlying string, which is the
/// order reconciliation sorts and binary-searches by. It deliberately ignores
/// locale collation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoPath(String);

/// Album for photos that sit directly in the library root
pub const ROOT_ALBUM: &str = ".";

impl PhotoPath {
    /// Create a new PhotoPath
    ///
    /// # Errors
    /// Returns error if the path is empty
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();
        if path.is_empty() {
            return Err(DomainError::InvalidPath(
                "Photo path cannot be empty".to_string(),
            ));
        }
        Ok(Self(path))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the path as a `Path`
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Splits the photo path into the album it belongs to and its file name
    ///
    /// The album name is the photo's parent directory relative to `root`,
    /// with components joined by `/` (so `root/2019/rome/a.jpg` lands in
    /// album `2019/rome`). Photos directly under `root` land in the album
    /// named `.`, the relative directory they live in.
    ///
    /// # Errors
    /// Returns `DomainError::OutsideRoot` if the path is not under `root`,
    /// and `DomainError::InvalidPath` if it has no file name component.
    pub fn placement_under(&self, root: &Path) -> Result<AlbumPlacement, DomainError> {
        let relative =
            self.as_path()
                .strip_prefix(root)
                .map_err(|_| DomainError::OutsideRoot {
                    path: self.0.clone(),
                    root: root.display().to_string(),
                })?;

        let file_name = relative
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| DomainError::InvalidPath(self.0.clone()))?;

        let album_parts: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let album = if album_parts.is_empty() {
            ROOT_ALBUM.to_string()
        } else {
            album_parts.join("/")
        };

        Ok(AlbumPlacement { album, file_name })
    }
}

impl Display for PhotoPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhotoPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PhotoPath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PhotoPath> for String {
    fn from(path: PhotoPath) -> Self {
        path.0
    }
}

// ============================================================================
// Remote identifiers
// ============================================================================

fn validate_remote_id(kind: &str, id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::InvalidRemoteId(format!(
            "{kind} cannot be empty"
        )));
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DomainError::InvalidRemoteId(format!(
            "{kind} contains whitespace or control characters: {id:?}"
        )));
    }
    Ok(())
}

/// Identifier Flickr assigns to an uploaded photo
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoId(String);

impl PhotoId {
    /// Create a new PhotoId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_remote_id("Photo ID", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PhotoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhotoId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PhotoId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PhotoId> for String {
    fn from(id: PhotoId) -> Self {
        id.0
    }
}

/// Identifier Flickr assigns to an album (photoset)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlbumId(String);

impl AlbumId {
    /// Create a new AlbumId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_remote_id("Album ID", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AlbumId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AlbumId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AlbumId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AlbumId> for String {
    fn from(id: AlbumId) -> Self {
        id.0
    }
}
