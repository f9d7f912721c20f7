use crate::classifiers::Classifier;
use crate::service::{ClassifierService, ClassifyError};
use std::io::{self, Read, Write};
use thiserror::Error;

/// Number of bytes requested per read while draining a request.
pub const READ_CHUNK: usize = 1024;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Drains one request from the stream.
///
/// The wire format carries no length prefix: data is read in
/// [`READ_CHUNK`]-byte chunks and the request ends the moment a chunk
/// comes back short of that size. End-of-stream counts as a zero-length
/// short chunk, so a peer that half-closes after writing always
/// terminates the read.
///
/// Known limitation, kept for compatibility with existing clients: a
/// payload that is an exact multiple of [`READ_CHUNK`] produces no
/// short chunk of its own, and the read blocks until the peer closes
/// or half-closes the connection.
pub fn read_request<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut request = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk)?;
        request.extend_from_slice(&chunk[..n]);
        if n < READ_CHUNK {
            break;
        }
    }
    Ok(request)
}

/// Serves one accepted connection end-to-end: read the request,
/// classify it, write the class identifier, done.
///
/// Errors are returned to the caller for logging; by the time the
/// stream is dropped the peer observes only a closed connection,
/// with a payload exactly when classification succeeded.
pub fn handle<S, C>(stream: &mut S, service: &ClassifierService<C>) -> Result<(), ConnectionError>
where
    S: Read + Write,
    C: Classifier,
{
    let request = read_request(stream)?;
    let class = service.classify(&request)?;
    stream.write_all(class.as_bytes())?;
    stream.flush()?;
    Ok(())
}
