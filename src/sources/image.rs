//! Backend image retrieval.
//!
//! Images are gzip-compressed tarballs addressed by `http(s)://`, `file://`
//! or a plain filesystem path. The unpacked tree lands directly in the
//! backend directory and is expected to contain the `run.sh` entrypoint.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use url::Url;

use crate::util::fs::format_size;

/// Progress callback: `(stage, artifact, message, fraction in [0, 1])`.
pub type ProgressFn<'a> = dyn FnMut(&str, &str, &str, f64) + 'a;

/// Stage label reported while downloading.
pub const STAGE_DOWNLOAD: &str = "downloading";

/// Stage label reported while unpacking.
pub const STAGE_EXTRACT: &str = "extracting";

/// Fetches a backend image and unpacks it into a directory.
pub trait ImageFetcher {
    /// Fetch `uri` and unpack it into `dest`, which already exists.
    ///
    /// `progress` must be invoked with non-decreasing fractions.
    fn fetch_and_unpack(&self, uri: &str, dest: &Path, progress: &mut ProgressFn<'_>)
        -> Result<()>;
}

/// Where an image reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocation {
    Remote(Url),
    Local(PathBuf),
}

impl ImageLocation {
    /// Parse an image reference.
    pub fn parse(uri: &str) -> Result<Self> {
        if uri.is_empty() {
            bail!("empty image reference");
        }

        match Url::parse(uri) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(ImageLocation::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(ImageLocation::Local)
                    .map_err(|_| anyhow::anyhow!("invalid file URL: {}", uri)),
                // Windows drive letters parse as a one-letter scheme
                scheme if scheme.len() == 1 => Ok(ImageLocation::Local(PathBuf::from(uri))),
                scheme => bail!("unsupported image scheme `{}` in `{}`", scheme, uri),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(ImageLocation::Local(PathBuf::from(uri)))
            }
            Err(e) => Err(e).with_context(|| format!("invalid image reference `{}`", uri)),
        }
    }
}

/// Fetches gzip tarball images over HTTP or from the local filesystem.
#[derive(Debug, Default)]
pub struct TarballFetcher {
    _private: (),
}

impl TarballFetcher {
    pub fn new() -> Self {
        TarballFetcher { _private: () }
    }

    fn download(&self, uri: &str, url: &Url, progress: &mut ProgressFn<'_>) -> Result<Vec<u8>> {
        tracing::info!("Fetching image from {}", url);

        let mut response = reqwest::blocking::get(url.as_str())
            .with_context(|| format!("failed to download image from {}", url))?;

        if !response.status().is_success() {
            bail!("failed to download image from {}: HTTP {}", url, response.status());
        }

        let total = response.content_length();
        let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut buffer = [0u8; 64 * 1024];

        loop {
            let read = response
                .read(&mut buffer)
                .with_context(|| format!("failed to read image body from {}", url))?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&buffer[..read]);

            if let Some(total) = total.filter(|t| *t > 0) {
                let fraction = (data.len() as f64 / total as f64).min(1.0) * 0.9;
                let message = format!("{} of {}", format_size(data.len() as u64), format_size(total));
                progress(STAGE_DOWNLOAD, uri, &message, fraction);
            }
        }

        Ok(data)
    }
}

impl ImageFetcher for TarballFetcher {
    fn fetch_and_unpack(
        &self,
        uri: &str,
        dest: &Path,
        progress: &mut ProgressFn<'_>,
    ) -> Result<()> {
        let data = match ImageLocation::parse(uri)? {
            ImageLocation::Remote(url) => self.download(uri, &url, progress)?,
            ImageLocation::Local(path) => {
                let mut data = Vec::new();
                File::open(&path)
                    .and_then(|mut f| f.read_to_end(&mut data))
                    .with_context(|| format!("failed to read image: {}", path.display()))?;
                data
            }
        };

        progress(STAGE_DOWNLOAD, uri, &format_size(data.len() as u64), 0.9);

        extract_tarball(&data, dest)
            .with_context(|| format!("failed to extract image {}", uri))?;

        progress(STAGE_EXTRACT, uri, "done", 1.0);

        tracing::info!("Extracted image {} to {}", uri, dest.display());
        Ok(())
    }
}

/// Extract a gzip-compressed tarball to a destination directory.
///
/// Entries that would land outside `dest` are rejected.
pub fn extract_tarball(data: &[u8], dest: &Path) -> Result<()> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    for entry in archive.entries().context("failed to read tarball entries")? {
        let mut entry = entry.context("failed to read tarball entry")?;
        let entry_path = entry.path().context("failed to get entry path")?.into_owned();

        // unpack_in refuses `..` and absolute paths and returns false for them
        let unpacked = entry
            .unpack_in(dest)
            .with_context(|| format!("failed to extract {}", entry_path.display()))?;

        if !unpacked {
            bail!(
                "tarball entry escapes destination directory: {}",
                entry_path.display()
            );
        }
    }

    Ok(())
}

/// Build an in-memory gzip tarball from `(path, contents, mode)` triples.
///
/// Used to stage images for tests and local galleries.
pub fn build_tarball(files: &[(&str, &str, u32)]) -> io::Result<Vec<u8>> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tar::{Builder, Header};

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    for (path, contents, mode) in files {
        let mut header = Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append_data(&mut header, path, contents.as_bytes())?;
    }

    builder.into_inner()?.finish()
}
