/*!
    Stream copy into a new container.
*/

use std::path::Path;

use media_source::{DemuxEvent, Input};
use media_types::{CancelToken, Error, Flow, Result};
use tracing::info;

use crate::{ContainerFormat, Writer, WriterSummary};

/**
    Copy `streams` of `input` into a new container at `path` without
    re-encoding them. An empty `streams` copies every stream.

    Output streams are numbered in the order of `streams`. Packets are
    rescaled to the output time bases, and the container and stream
    metadata are carried over.

    # Errors

    - Configuration error if a stream does not exist, is listed twice, or
      the container format is unknown
    - [`Error::Cancelled`] once `cancel` is set, leaving the output
      without a trailer
    - The first read error, or any error from the muxer
*/
pub fn remux(
    input: &mut Input,
    path: impl AsRef<Path>,
    format: Option<&ContainerFormat>,
    streams: &[usize],
    cancel: &CancelToken,
) -> Result<WriterSummary> {
    let path = path.as_ref();
    let selected = if streams.is_empty() {
        (0..input.streams().len()).collect::<Vec<_>>()
    } else {
        streams.to_vec()
    };

    let mut map = vec![None; input.streams().len()];
    for (out, &index) in selected.iter().enumerate() {
        let slot = map
            .get_mut(index)
            .ok_or_else(|| Error::config(format!("input has no stream {index}")))?;
        if slot.is_some() {
            return Err(Error::config(format!("stream {index} is selected twice")));
        }
        *slot = Some(out);
    }

    let mut writer = Writer::copy(path, format, input, &selected)?;
    input.demux(cancel, |event| match event {
        DemuxEvent::Packet(mut packet) => {
            if let Some(out) = map.get(packet.stream()).copied().flatten() {
                packet.set_stream(out);
                writer.write(packet)?;
            }
            Ok(Flow::Continue)
        }
        DemuxEvent::Flush(_) => Ok(Flow::Continue),
        DemuxEvent::ReadError(e) => Err(e),
    })?;

    let summary = writer.finish()?;
    info!(
        from = input.url(),
        to = %path.display(),
        streams = selected.len(),
        packets = summary.packets(),
        "remuxed"
    );
    Ok(summary)
}
