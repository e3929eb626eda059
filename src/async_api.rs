//! Async API for non-blocking merging and generation retries.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! lessonmerge = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, GenerationError, Result};
use crate::generate::RetryPolicy;
use crate::options::{ExportOptions, MergeOptions};
use crate::render::RenderOptions;
use crate::{Export, Merged};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously merges generated text into a `.docx` file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> lessonmerge::Result<()> {
/// use lessonmerge::MergeOptions;
///
/// let raw = tokio::fs::read_to_string("ket_qua.txt").await?;
/// let merged = lessonmerge::async_api::merge_file("Bai_3.docx", &raw, &MergeOptions::default()).await?;
/// tokio::fs::write("Bai_3_NLS.docx", &merged.bytes).await?;
/// # Ok(())
/// # }
/// ```
pub async fn merge_file(path: impl AsRef<Path>, raw: &str, options: &MergeOptions) -> Result<Merged> {
    let data = fs::read(path).await?;
    merge_bytes(data, raw, options).await
}

/// Asynchronously merges generated text into a `.docx` given as bytes.
pub async fn merge_bytes(original: Vec<u8>, raw: &str, options: &MergeOptions) -> Result<Merged> {
    // Merging is CPU-bound, so it runs in a blocking task
    let raw = raw.to_string();
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::merge_bytes(original, &raw, &options))
        .await
        .map_err(join_error)?
}

/// Asynchronously merges into a `.docx` read from an async reader.
pub async fn merge_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    raw: &str,
    options: &MergeOptions,
) -> Result<Merged> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    merge_bytes(data, raw, options).await
}

/// Asynchronously renders generated text into a fresh `.docx`.
pub async fn create_docx(raw: &str, options: &RenderOptions) -> Result<Vec<u8>> {
    let raw = raw.to_string();
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::create_docx(&raw, &options))
        .await
        .map_err(join_error)?
}

/// Asynchronously produces the final download and writes it into `dir`.
///
/// Returns the export and the path it was written to. A merge or render
/// failure is not an error here: the raw text is written instead.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> lessonmerge::Result<()> {
/// use lessonmerge::ExportOptions;
///
/// let raw = tokio::fs::read_to_string("ket_qua.txt").await?;
/// let (export, path) = lessonmerge::async_api::export_to_dir(
///     &raw,
///     Some(std::path::Path::new("Bai_3.docx")),
///     "out",
///     &ExportOptions::default(),
/// )
/// .await?;
/// println!("{} ({} bytes)", path.display(), export.bytes().len());
/// # Ok(())
/// # }
/// ```
pub async fn export_to_dir(
    raw: &str,
    original: Option<&Path>,
    dir: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<(Export, PathBuf)> {
    let data = match original {
        Some(path) => Some(fs::read(path).await?),
        None => None,
    };

    let raw_owned = raw.to_string();
    let task_options = options.clone();
    let export = tokio::task::spawn_blocking(move || {
        crate::export(&raw_owned, data.as_deref(), &task_options)
    })
    .await
    .map_err(join_error)?;

    let dir = dir.as_ref();
    fs::create_dir_all(dir).await?;
    let path = dir.join(export.file_name(options, original));
    fs::write(&path, export.bytes()).await?;

    Ok((export, path))
}

/// Awaits `generate` until it succeeds, retrying transient failures.
///
/// The async counterpart of [`crate::generate::with_retry`]; pauses use
/// the Tokio timer instead of blocking the thread.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut generate: F) -> std::result::Result<T, GenerationError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, GenerationError>>,
{
    let mut attempt = 1;
    loop {
        match generate(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let delay = policy.next_step(attempt, error)?;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}

/// Async builder for merging.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> lessonmerge::Result<()> {
/// use lessonmerge::async_api::AsyncLessonMerge;
///
/// let merged = AsyncLessonMerge::new()
///     .without_labels()
///     .read("ket_qua.txt")
///     .await?
///     .merge_file("Bai_3.docx")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AsyncLessonMerge {
    options: MergeOptions,
}

impl AsyncLessonMerge {
    /// Creates a new async builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the merge options.
    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    /// Omits `[IDENTIFIER]` labels before unplaced sections.
    pub fn without_labels(mut self) -> Self {
        self.options = self.options.without_labels();
        self
    }

    /// Uses already generated text.
    pub fn text(self, raw: impl Into<String>) -> AsyncParsedText {
        AsyncParsedText {
            raw: raw.into(),
            options: self.options,
        }
    }

    /// Reads generated text from a file.
    pub async fn read(self, path: impl AsRef<Path>) -> Result<AsyncParsedText> {
        let raw = fs::read_to_string(path).await?;
        Ok(self.text(raw))
    }
}

/// Generated text ready for async merging or rendering.
#[derive(Debug, Clone)]
pub struct AsyncParsedText {
    raw: String,
    options: MergeOptions,
}

impl AsyncParsedText {
    /// Returns the raw text.
    pub fn to_text(&self) -> &str {
        &self.raw
    }

    /// Merges into a `.docx` file.
    pub async fn merge_file(&self, path: impl AsRef<Path>) -> Result<Merged> {
        merge_file(path, &self.raw, &self.options).await
    }

    /// Merges into a `.docx` given as bytes.
    pub async fn merge_bytes(&self, original: Vec<u8>) -> Result<Merged> {
        merge_bytes(original, &self.raw, &self.options).await
    }

    /// Renders into a fresh `.docx`.
    pub async fn to_docx(&self) -> Result<Vec<u8>> {
        create_docx(&self.raw, &self.options.render).await
    }
}
