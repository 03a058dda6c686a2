/*!
    Audio device input and output for the media crate ecosystem.

    Devices are opened with an exact [`AudioSpec`]: if the device cannot
    run at the requested sample rate, sample format and channel count,
    opening fails with a configuration error instead of substituting
    another format. Callers convert their frames to the device format
    first, e.g. with a `media-transform` rescaler.

    # Threading

    The platform audio layer runs the device callback on its own thread.
    Samples move between the pipeline and the callback through a lock-free
    ring buffer, so the callback never waits for the pipeline: an output
    plays silence when the buffer runs dry, and an input drops samples
    when the buffer is full.

    # Example

    ```ignore
    use media_device::{AudioOutput, AudioSpec, Direction, default_device};
    use media_types::{CancelToken, SampleFormat};

    let device = default_device(Direction::Output)?;
    let mut output = AudioOutput::open(&device, AudioSpec::new(48000, SampleFormat::F32, 2))?;
    output.write(&samples, &CancelToken::new())?;
    output.close();
    ```
*/

pub use media_types::{AudioClock, Clock, Error, Result};

mod device;
mod input;
mod output;
mod shared;
mod spec;

pub use device::{Device, Direction, default_device, find_device, list_devices};
pub use input::AudioInput;
pub use output::AudioOutput;
pub use spec::{AudioSpec, negotiate};
