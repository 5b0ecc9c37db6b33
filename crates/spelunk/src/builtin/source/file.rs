//! Local file source

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use crate::context::Context;
use crate::coord::SecretCoord;
use crate::error::SourceError;
use crate::source::SecretSource;

/// `file://PATH`: the whole content of a file.
///
/// Relative paths (`file://./secret`, `file://secret`) resolve against the
/// working directory; absolute ones are written `file:///etc/secret`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSourceFile;

#[async_trait]
impl SecretSource for SecretSourceFile {
    fn kind(&self) -> &str {
        "file"
    }

    async fn dig_up(&self, _ctx: &Context, coord: &SecretCoord) -> Result<String, SourceError> {
        let path = Path::new(coord.location());

        let mut file = tokio::fs::File::open(path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                SourceError::NotFound {
                    location: coord.location().to_string(),
                    source: Some(Box::new(e)),
                }
            } else {
                SourceError::OpenFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let read_failed = |source| SourceError::ReadFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut content = Vec::new();
        file.read_to_end(&mut content).await.map_err(read_failed)?;

        String::from_utf8(content)
            .map_err(|e| read_failed(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
