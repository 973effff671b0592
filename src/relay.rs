//! The relay engine: copy bytes from a source to a sink until end-of-stream
//!
//! The loop either delivers every byte the source produces or aborts on
//! the first unrecoverable error; there is no partial-success contract
//! beyond "some prefix reached the sink".

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{Phase, RelayError};
use crate::types::BufferSize;

/// Copy bytes from `source` to `sink` until the source reports
/// end-of-stream, returning the total number of bytes delivered.
///
/// Reads transfer at most `buffer_size` bytes per call. A short write is
/// completed with follow-up writes before the next read; an interrupted
/// read or write is retried silently. The sink is flushed once the source
/// is exhausted.
///
/// # Errors
///
/// Returns an `Io` error with read or write attribution on the first
/// non-retryable failure.
pub async fn copy<R, W>(
    source: &mut R,
    sink: &mut W,
    buffer_size: BufferSize,
) -> Result<u64, RelayError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size.get()];
    let mut total: u64 = 0;

    loop {
        let n = match source.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(RelayError::io(Phase::Read, e)),
        };

        // The whole chunk must reach the sink before the next read
        let mut written = 0;
        while written < n {
            match sink.write(&buffer[written..n]).await {
                Ok(0) => {
                    return Err(RelayError::io(
                        Phase::Write,
                        io::Error::new(io::ErrorKind::WriteZero, "sink accepted no bytes"),
                    ));
                }
                Ok(m) => written += m,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(RelayError::io(Phase::Write, e)),
            }
        }

        total += n as u64;
        trace!(chunk = n, total, "relayed chunk");
    }

    sink.flush()
        .await
        .map_err(|e| RelayError::io(Phase::Write, e))?;
    Ok(total)
}
