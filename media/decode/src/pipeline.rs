/*!
    Selector-driven decoding of a whole input.
*/

use media_native::Frame;
use media_source::{DemuxEvent, Input};
use media_transform::{Rescaler, RescalerConfig};
use media_types::{
    CancelToken, Error, Flow, FrameFormat, Parameters, Result, StreamInfo, Termination,
};
use tracing::{debug, info};

use crate::{Decoder, DecoderConfig};

/**
    What to produce for a selected stream.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Target {
    /// Frames in whatever format the decoder outputs.
    Native,
    /// Frames rescaled to the given format.
    Format(FrameFormat),
}

struct Selected {
    info: StreamInfo,
    target: Target,
    decoder: Decoder,
    rescaler: Option<Rescaler>,
}

/**
    Decoder for the selected streams of an input.

    Built from a selector that is asked once per stream of the input,
    returning the [`Target`] to decode it to, or `None` to ignore it. Each
    selected stream gets its own decoder, plus a rescaler if it asked for
    a specific format.
*/
pub struct MediaDecoder {
    streams: Vec<Option<Selected>>,
}

impl MediaDecoder {
    /**
        Create a decoder with the default [`DecoderConfig`].
    */
    pub fn new<F>(input: &Input, selector: F) -> Result<Self>
    where
        F: FnMut(&StreamInfo) -> Option<Target>,
    {
        Self::with_config(input, &DecoderConfig::default(), selector)
    }

    /**
        Create a decoder, opening a codec for every stream the selector picks.

        # Errors

        - Configuration error if a selected stream is neither audio nor
          video, or its target format is of a different kind
        - Native error if a codec cannot be opened
    */
    pub fn with_config<F>(input: &Input, config: &DecoderConfig, mut selector: F) -> Result<Self>
    where
        F: FnMut(&StreamInfo) -> Option<Target>,
    {
        let mut streams = Vec::with_capacity(input.streams().len());
        for info in input.streams() {
            let Some(target) = selector(info) else {
                streams.push(None);
                continue;
            };

            let rescaler = match target {
                Target::Native => None,
                Target::Format(format) => {
                    if format.media_type() != info.media_type() {
                        return Err(Error::config(format!(
                            "stream {} is {} but its target is {format}",
                            info.index,
                            info.media_type()
                        )));
                    }
                    let rescaler_config = RescalerConfig::new().with_algorithm(config.scaling);
                    Some(Rescaler::with_config(
                        &Parameters::from(format),
                        rescaler_config,
                    )?)
                }
            };
            let decoder = Decoder::open(input, info.index, config)?;
            debug!(stream = info.index, ?target, "selected stream");

            streams.push(Some(Selected {
                info: info.clone(),
                target,
                decoder,
                rescaler,
            }));
        }

        info!(
            selected = streams.iter().flatten().count(),
            streams = streams.len(),
            "created media decoder"
        );
        Ok(Self { streams })
    }

    /**
        Indices of the selected streams, in ascending order.
    */
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.streams
            .iter()
            .flatten()
            .map(|s| s.info.index)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        matches!(self.streams.get(index), Some(Some(_)))
    }

    pub fn stream(&self, index: usize) -> Option<&StreamInfo> {
        self.get(index).map(|s| &s.info)
    }

    pub fn target(&self, index: usize) -> Option<Target> {
        self.get(index).map(|s| s.target)
    }

    fn get(&self, index: usize) -> Option<&Selected> {
        self.streams.get(index).and_then(Option::as_ref)
    }

    /**
        Demux `input`, forwarding only events of selected streams.

        See [`Input::demux`] for the event and termination semantics.
    */
    pub fn demux<F>(
        &self,
        input: &mut Input,
        cancel: &CancelToken,
        mut handler: F,
    ) -> Result<Termination>
    where
        F: FnMut(DemuxEvent) -> Result<Flow>,
    {
        input.demux(cancel, |event| match event {
            DemuxEvent::Packet(packet) if !self.is_selected(packet.stream()) => {
                Ok(Flow::Continue)
            }
            DemuxEvent::Flush(index) if !self.is_selected(index) => Ok(Flow::Continue),
            event => handler(event),
        })
    }

    /**
        Decode the selected streams of `input`.

        `handler` is called with the stream index and each decoded frame,
        already rescaled if the stream has a target format. At end of
        stream the decoders are drained and the handler is called once per
        selected stream with `None`.

        Any read error, decoding error or handler error stops decoding and
        is returned. Use [`MediaDecoder::decode_with`] to continue past
        read errors.
    */
    pub fn decode<F>(
        &mut self,
        input: &mut Input,
        cancel: &CancelToken,
        handler: F,
    ) -> Result<Termination>
    where
        F: FnMut(usize, Option<&Frame>) -> Result<Flow>,
    {
        self.decode_with(input, cancel, Err, handler)
    }

    /**
        Like [`MediaDecoder::decode`], with `on_read_error` deciding what
        happens when reading a packet fails.

        Returning [`Flow::Continue`] reads the next packet at once,
        [`Flow::Stop`] ends decoding without draining the decoders, and an
        error aborts with it.
    */
    pub fn decode_with<R, F>(
        &mut self,
        input: &mut Input,
        cancel: &CancelToken,
        mut on_read_error: R,
        mut handler: F,
    ) -> Result<Termination>
    where
        R: FnMut(Error) -> Result<Flow>,
        F: FnMut(usize, Option<&Frame>) -> Result<Flow>,
    {
        input.demux(cancel, |event| {
            self.handle_event(event, &mut on_read_error, &mut handler)
        })
    }

    fn handle_event<R, F>(
        &mut self,
        event: DemuxEvent,
        on_read_error: &mut R,
        handler: &mut F,
    ) -> Result<Flow>
    where
        R: FnMut(Error) -> Result<Flow>,
        F: FnMut(usize, Option<&Frame>) -> Result<Flow>,
    {
        match event {
            DemuxEvent::Packet(packet) => {
                let stream = packet.stream();
                let Some(selected) = self.streams.get_mut(stream).and_then(Option::as_mut) else {
                    return Ok(Flow::Continue);
                };
                let frames = selected.decoder.decode(&packet)?;
                deliver(selected, frames, handler)
            }
            DemuxEvent::Flush(index) => {
                let Some(selected) = self.streams.get_mut(index).and_then(Option::as_mut) else {
                    return Ok(Flow::Continue);
                };
                let frames = selected.decoder.flush()?;
                if deliver(selected, frames, handler)?.is_stop() {
                    return Ok(Flow::Stop);
                }
                handler(index, None)
            }
            DemuxEvent::ReadError(e) => on_read_error(e),
        }
    }
}

fn deliver<F>(selected: &mut Selected, frames: Vec<Frame>, handler: &mut F) -> Result<Flow>
where
    F: FnMut(usize, Option<&Frame>) -> Result<Flow>,
{
    let index = selected.info.index;
    for frame in &frames {
        let out = match selected.rescaler.as_mut() {
            Some(rescaler) => rescaler.rescale(Some(frame))?,
            None => Some(frame),
        };
        let Some(out) = out else { continue };
        if handler(index, Some(out))?.is_stop() {
            return Ok(Flow::Stop);
        }
    }
    Ok(Flow::Continue)
}

impl std::fmt::Debug for MediaDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaDecoder")
            .field("selected", &self.selected().collect::<Vec<_>>())
            .finish()
    }
}
