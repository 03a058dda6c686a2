/*!
    Packet demuxing loop.
*/

use media_native::Packet;
use media_types::{CancelToken, Error, Flow, Result, Termination};
use tracing::{debug, trace, warn};

use crate::Input;

/**
    Event delivered to a demux handler.
*/
#[derive(Debug)]
pub enum DemuxEvent {
    /// Next packet in container order. The handler takes ownership.
    Packet(Packet),
    /**
        End of stream for the stream with this index.

        Delivered once per stream after the last packet, so per-stream
        consumers (decoders, encoders) can flush.
    */
    Flush(usize),
    /**
        Reading failed. Returning [`Flow::Continue`] issues the next read
        at once, [`Flow::Stop`] ends the demux, and returning the error
        aborts it. The loop never waits or retries on its own.
    */
    ReadError(Error),
}

impl Input {
    /**
        Read every packet in container order and hand it to `handler`.

        After the last packet the handler receives one [`DemuxEvent::Flush`]
        per stream, in index order.

        The cancel token is checked before every read. Once it is set no
        further reads are issued and [`Error::Cancelled`] is returned.

        # Returns

        - `Ok(Termination::EndOfStream)` once all streams were flushed
        - `Ok(Termination::Stopped)` if the handler returned [`Flow::Stop`]
        - The first error returned by the handler, or `Error::Cancelled`
    */
    pub fn demux<F>(&mut self, cancel: &CancelToken, handler: F) -> Result<Termination>
    where
        F: FnMut(DemuxEvent) -> Result<Flow>,
    {
        let url = self.url().to_owned();
        let streams = self.streams().len();
        demux_loop(&url, streams, cancel, || self.read_packet(), handler)
    }
}

/**
    The demux loop over any packet source. `read` returns `Ok(None)` at
    end of input.
*/
pub(crate) fn demux_loop<R, F>(
    url: &str,
    streams: usize,
    cancel: &CancelToken,
    mut read: R,
    mut handler: F,
) -> Result<Termination>
where
    R: FnMut() -> Result<Option<Packet>>,
    F: FnMut(DemuxEvent) -> Result<Flow>,
{
    debug!(url, "demux started");
    let mut packets = 0u64;

    loop {
        if cancel.is_cancelled() {
            debug!(url, packets, "demux cancelled");
            return Err(Error::Cancelled);
        }

        match read() {
            Ok(Some(packet)) => {
                packets += 1;
                trace!(
                    stream = packet.stream(),
                    size = packet.size(),
                    pts = ?packet.timing().pts,
                    "packet"
                );
                if handler(DemuxEvent::Packet(packet))?.is_stop() {
                    debug!(url, packets, "demux stopped by handler");
                    return Ok(Termination::Stopped);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(url, error = %e, "packet read failed");
                if handler(DemuxEvent::ReadError(e))?.is_stop() {
                    debug!(url, packets, "demux stopped after read error");
                    return Ok(Termination::Stopped);
                }
            }
        }
    }

    for index in 0..streams {
        if handler(DemuxEvent::Flush(index))?.is_stop() {
            return Ok(Termination::Stopped);
        }
    }

    debug!(url, packets, "demux reached end of stream");
    Ok(Termination::EndOfStream)
}
