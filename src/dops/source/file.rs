use super::{ListOptions, RecordSource};
use crate::error::Result;
use async_trait::async_trait;
use once_cell::unsync::OnceCell;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Reads a saved `/containers/json` response, or stdin for `-`.
///
/// Listing options are not applied; the file is shown as it was captured.
/// A file is read again on every fetch, so `--watch` picks up changes. Stdin
/// can only be read once: the first payload is kept and served to every
/// later fetch.
pub struct JsonFileSource {
    input: Input,
}

enum Input {
    Stdin(OnceCell<String>),
    File(PathBuf),
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let input = if path == Path::new("-") {
            Input::Stdin(OnceCell::new())
        } else {
            Input::File(path.to_path_buf())
        };
        Self { input }
    }
}

#[async_trait(?Send)]
impl RecordSource for JsonFileSource {
    async fn fetch_raw(&self, options: &ListOptions) -> Result<String> {
        if *options != ListOptions::default() {
            tracing::debug!(?options, "listing options are ignored for file input");
        }
        match &self.input {
            Input::Stdin(buffer) => {
                if let Some(raw) = buffer.get() {
                    tracing::debug!("serving buffered stdin");
                    return Ok(raw.clone());
                }
                let mut raw = String::new();
                tokio::io::stdin().read_to_string(&mut raw).await?;
                Ok(buffer.get_or_init(|| raw).clone())
            }
            Input::File(path) => Ok(tokio::fs::read_to_string(path).await?),
        }
    }
}
