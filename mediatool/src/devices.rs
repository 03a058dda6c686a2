/*!
    Audio device commands.
*/

use anyhow::Context;
use media_device::{
    AudioOutput, Clock, Device, Direction, default_device, find_device, list_devices,
};
use media_transform::SineGenerator;
use media_types::CancelToken;
use tracing::{info, warn};

use crate::ToneArgs;

// samples per generated frame, about 20ms at common rates
const FRAME_SIZE: usize = 1024;

pub fn list() -> anyhow::Result<()> {
    for direction in [Direction::Input, Direction::Output] {
        println!("{direction} devices:");
        let devices = match list_devices(direction) {
            Ok(devices) => devices,
            Err(e) => {
                warn!(%direction, error = %e, "failed to list devices");
                continue;
            }
        };
        for device in devices {
            println!("  {}", describe(&device));
        }
    }
    Ok(())
}

fn describe(device: &Device) -> String {
    let marker = if device.is_default() { '*' } else { ' ' };
    match device.default_spec() {
        Ok(spec) => format!("{marker} {} ({spec})", device.name()),
        Err(e) => format!("{marker} {} (no default format: {e})", device.name()),
    }
}

/**
    Play a tone in the device's default sample format. The output is
    opened on this thread and dropped before returning.
*/
pub fn play_tone(
    tone: &ToneArgs,
    device: Option<&str>,
    rate: Option<u32>,
    cancel: &CancelToken,
) -> anyhow::Result<()> {
    let device = match device {
        Some(name) => find_device(Direction::Output, name)?,
        None => default_device(Direction::Output)?,
    };
    let mut spec = device
        .default_spec()
        .with_context(|| format!("{} has no default format", device.name()))?;
    if let Some(rate) = rate {
        spec.sample_rate = rate;
    }

    let mut output = AudioOutput::open(&device, spec)
        .with_context(|| format!("failed to open {} at {spec}", device.name()))?;
    let mut generator =
        SineGenerator::new(tone.frequency, tone.gain, spec.audio_format()?, FRAME_SIZE)?;

    let total = (tone.duration * f64::from(spec.sample_rate)).round() as u64;
    let mut written = 0u64;
    while written < total {
        let frame = generator.next_frame()?;
        output.write_frame(&frame, cancel)?;
        written += FRAME_SIZE as u64;
    }
    output.close();
    output.drain(cancel)?;

    info!(
        device = device.name(),
        played = ?output.clock().position(),
        "tone finished"
    );
    Ok(())
}
