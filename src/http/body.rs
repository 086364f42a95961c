//! Response body types
//!
//! [`ResponseBody`] is the single body type every responder returns. File
//! bodies own their open handle and stream it in fixed-size chunks; the
//! handle is released when the body is dropped.

use http_body_util::Full;
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::convert::Infallible;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, ReadBuf};

use crate::config::DEFAULT_CHUNK_SIZE;

/// Body of a responder-built response
#[derive(Debug, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Full(Full<Bytes>),
    File(FileBody),
}

impl ResponseBody {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Full(Full::new(Bytes::from(text.into())))
    }

    /// The streamed file, if this is a file body
    pub const fn as_file(&self) -> Option<&FileBody> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::Full(Full::new(bytes))
    }
}

impl From<FileBody> for ResponseBody {
    fn from(file: FileBody) -> Self {
        Self::File(file)
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Empty => Poll::Ready(None),
            Self::Full(full) => Pin::new(full)
                .poll_frame(cx)
                .map(|frame| frame.map(|res| res.map_err(|never: Infallible| match never {}))),
            Self::File(file) => Pin::new(file).poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Full(full) => full.is_end_stream(),
            Self::File(file) => file.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Self::Empty => SizeHint::with_exact(0),
            Self::Full(full) => full.size_hint(),
            Self::File(file) => file.size_hint(),
        }
    }
}

/// Streams a window of an open file
#[derive(Debug)]
pub struct FileBody {
    file: File,
    path: PathBuf,
    remaining: u64,
    buf: Box<[u8]>,
}

impl FileBody {
    /// Open `path` and stream `len` bytes from the current (start) position
    pub async fn open(path: &Path, len: u64, chunk_size: usize) -> io::Result<Self> {
        let file = File::open(path).await?;
        Ok(Self::from_file(file, path.to_path_buf(), len, chunk_size))
    }

    pub fn from_file(file: File, path: PathBuf, len: u64, chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 { DEFAULT_CHUNK_SIZE } else { chunk_size };
        Self {
            file,
            path,
            remaining: len,
            buf: vec![0; chunk_size].into_boxed_slice(),
        }
    }

    /// Restrict the body to bytes `start..=end` of the file
    pub async fn constrain(&mut self, start: u64, end: u64) -> io::Result<()> {
        if end < start {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("empty byte window {start}-{end}"),
            ));
        }
        self.file.seek(SeekFrom::Start(start)).await?;
        self.remaining = end - start + 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes still to be streamed
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Body for FileBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.remaining == 0 {
            return Poll::Ready(None);
        }

        let want = usize::try_from(this.remaining)
            .map_or(this.buf.len(), |r| r.min(this.buf.len()));
        let mut read_buf = ReadBuf::new(&mut this.buf[..want]);

        match Pin::new(&mut this.file).poll_read(cx, &mut read_buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                this.remaining = 0;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    // File shrank after Content-Length was announced
                    let missing = this.remaining;
                    this.remaining = 0;
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("{} ended {missing} bytes early", this.path.display()),
                    ))));
                }
                let chunk = Bytes::copy_from_slice(filled);
                this.remaining -= chunk.len() as u64;
                Poll::Ready(Some(Ok(Frame::data(chunk))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining)
    }
}
