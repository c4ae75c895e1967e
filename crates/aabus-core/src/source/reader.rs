use std::io::{ErrorKind, Read};

use super::{ChunkSource, SourceError, StreamChunk};

/// Read size used by the bridge monitor.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Source over any blocking reader: a TCP socket, a dump file, stdin.
///
/// Everything read belongs to one stream. Timestamps are not known.
///
/// # Examples
/// ```
/// use aabus_core::{ChunkSource, ReaderSource};
///
/// let mut source = ReaderSource::new("dump", &b"<U>Ping</U=00>"[..]);
/// let chunk = source.next_chunk()?.expect("one chunk");
/// assert_eq!(chunk.stream, "dump");
/// assert!(source.next_chunk()?.is_none());
/// # Ok::<(), aabus_core::SourceError>(())
/// ```
pub struct ReaderSource<R> {
    stream: String,
    reader: R,
    buf: Vec<u8>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(stream: impl Into<String>, reader: R) -> Self {
        Self::with_chunk_size(stream, reader, DEFAULT_CHUNK_SIZE)
    }

    /// A `chunk_size` of zero is raised to one byte.
    pub fn with_chunk_size(stream: impl Into<String>, reader: R, chunk_size: usize) -> Self {
        Self {
            stream: stream.into(),
            reader,
            buf: vec![0; chunk_size.max(1)],
        }
    }
}

impl<R: Read> ChunkSource for ReaderSource<R> {
    fn next_chunk(&mut self) -> Result<Option<StreamChunk>, SourceError> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    return Ok(Some(StreamChunk {
                        ts: None,
                        stream: self.stream.clone(),
                        data: self.buf[..n].to_vec(),
                    }));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(SourceError::Io(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use super::ReaderSource;
    use crate::source::{ChunkSource, SourceError};

    #[test]
    fn splits_into_chunks() {
        let data = b"0123456789";
        let mut source = ReaderSource::with_chunk_size("s", &data[..], 4);
        let mut sizes = Vec::new();
        while let Some(chunk) = source.next_chunk().unwrap() {
            assert_eq!(chunk.stream, "s");
            assert!(chunk.ts.is_none());
            sizes.push(chunk.data.len());
        }
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    struct Flaky {
        interrupted: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            Err(io::Error::from(io::ErrorKind::ConnectionReset))
        }
    }

    #[test]
    fn retries_interrupted_reads() {
        let mut source = ReaderSource::new("s", Flaky { interrupted: false });
        let err = source.next_chunk().unwrap_err();
        match err {
            SourceError::Io(err) => assert_eq!(err.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_chunk_size_still_reads() {
        let mut source = ReaderSource::with_chunk_size("s", &b"ab"[..], 0);
        assert_eq!(source.next_chunk().unwrap().unwrap().data, b"a");
    }
}
