use crate::contract::{Artifact, S3Location};

/// Backing store kinds an artifact location may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    S3,
}

impl LocationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::S3 => "S3",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "S3" => Some(Self::S3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLocation {
    pub artifact: String,
    pub location_type: String,
}

impl std::fmt::Display for UnsupportedLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "artifact '{}' has unsupported location type '{}'",
            self.artifact, self.location_type
        )
    }
}

impl std::error::Error for UnsupportedLocation {}

/// Resolves the bucket and key an artifact lives at.
///
/// A location typed `S3` without an `s3Location` block is treated the same as an
/// unsupported location: nothing can be fetched from it.
pub fn resolve_s3_location(artifact: &Artifact) -> Result<&S3Location, UnsupportedLocation> {
    let unsupported = || UnsupportedLocation {
        artifact: artifact.name.clone(),
        location_type: artifact.location.location_type.clone(),
    };

    match LocationKind::parse(&artifact.location.location_type) {
        Some(LocationKind::S3) => artifact.location.s3_location.as_ref().ok_or_else(unsupported),
        None => Err(unsupported()),
    }
}
