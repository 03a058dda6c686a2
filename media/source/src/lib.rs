/*!
    Container opening and demuxing for the media crate ecosystem.

    This crate opens files, URLs and capture devices and reads their
    compressed packets in container order.

    # Example

    ```ignore
    use media_native::{Options, Runtime};
    use media_source::{DemuxEvent, open};
    use media_types::{CancelToken, Flow};

    let _runtime = Runtime::start()?;
    let mut input = open("video.mp4", None, &Options::new())?;

    let mut counts = vec![0usize; input.streams().len()];
    let termination = input.demux(&CancelToken::new(), |event| {
        match event {
            DemuxEvent::Packet(packet) => counts[packet.stream()] += 1,
            DemuxEvent::Flush(_) => {}
            DemuxEvent::ReadError(e) => return Err(e),
        }
        Ok(Flow::Continue)
    })?;
    ```

    Selecting streams is left to the caller: the demux handler sees
    every packet of every stream.
*/

mod demux;
mod input;

pub use demux::DemuxEvent;
pub use input::{Input, open};
pub use media_native::{Options, Packet};
