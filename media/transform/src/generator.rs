/*!
    Synthetic audio frames.
*/

use std::f64::consts::TAU;
use std::time::Duration;

use ffmpeg_next::frame;
use media_native::{Frame, alloc_audio};
use media_types::{AudioFormat, Error, Pts, Rational, Result, SampleFormat};

/**
    Generator of a continuous sine tone.

    Each call to [`SineGenerator::next_frame`] returns a new frame of
    `frame_size` samples that continues the waveform of the previous one.
    Timestamps count samples, in a `1/sample_rate` time base.
*/
#[derive(Clone, Debug)]
pub struct SineGenerator {
    format: AudioFormat,
    frequency: f64,
    amplitude: f64,
    frame_size: usize,
    position: u64,
}

impl SineGenerator {
    /**
        Create a generator of a `frequency` Hz tone at `gain_db` decibels
        relative to full scale.

        # Errors

        Returns a configuration error if the frequency is not below the
        Nyquist frequency, the gain is positive, or the frame size or
        sample rate is zero.
    */
    pub fn new(frequency: f64, gain_db: f64, format: AudioFormat, frame_size: usize) -> Result<Self> {
        if format.sample_rate == 0 {
            return Err(Error::config("sample rate is zero"));
        }
        let nyquist = f64::from(format.sample_rate) / 2.0;
        if !(frequency > 0.0 && frequency < nyquist) {
            return Err(Error::config(format!(
                "frequency {frequency} Hz is outside 0..{nyquist} Hz"
            )));
        }
        if gain_db.is_nan() || gain_db > 0.0 {
            return Err(Error::config(format!("gain {gain_db} dB is above full scale")));
        }
        if frame_size == 0 {
            return Err(Error::config("frame size is zero"));
        }

        Ok(Self {
            format,
            frequency,
            amplitude: 10f64.powf(gain_db / 20.0),
            frame_size,
            position: 0,
        })
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn time_base(&self) -> Rational {
        Rational::new(1, self.format.sample_rate as i32)
    }

    /**
        Time of the next frame's first sample.
    */
    pub fn position(&self) -> Duration {
        Pts(self.position as i64).to_duration(self.time_base())
    }

    /**
        Produce the next frame of the tone.
    */
    pub fn next_frame(&mut self) -> Result<Frame> {
        let mut frame = frame::Audio::empty();
        alloc_audio(&mut frame, &self.format, self.frame_size)?;

        let channels = self.format.channels() as usize;
        let width = self.format.format.bytes_per_sample();
        let planar = self.format.format.is_planar();
        let packed = self.format.format.packed();

        for i in 0..self.frame_size {
            let t = (self.position + i as u64) as f64 / f64::from(self.format.sample_rate);
            let value = self.amplitude * (TAU * self.frequency * t).sin();
            for channel in 0..channels {
                let (plane, offset) = if planar {
                    (channel, i * width)
                } else {
                    (0, (i * channels + channel) * width)
                };
                let data = frame.data_mut(plane);
                encode(packed, value, &mut data[offset..offset + width])?;
            }
        }

        frame.set_pts(Some(self.position as i64));
        self.position += self.frame_size as u64;
        Ok(Frame::Audio(frame))
    }
}

// writes one sample of a packed format in native byte order
fn encode(format: SampleFormat, value: f64, out: &mut [u8]) -> Result<()> {
    let value = value.clamp(-1.0, 1.0);
    match format {
        SampleFormat::U8 => out.copy_from_slice(&[(value * 127.0 + 128.0).round() as u8]),
        SampleFormat::S16 => {
            out.copy_from_slice(&((value * f64::from(i16::MAX)).round() as i16).to_ne_bytes())
        }
        SampleFormat::S32 => {
            out.copy_from_slice(&((value * f64::from(i32::MAX)).round() as i32).to_ne_bytes())
        }
        SampleFormat::S64 => {
            out.copy_from_slice(&((value * i64::MAX as f64).round() as i64).to_ne_bytes())
        }
        SampleFormat::F32 => out.copy_from_slice(&(value as f32).to_ne_bytes()),
        SampleFormat::F64 => out.copy_from_slice(&value.to_ne_bytes()),
        other => {
            return Err(Error::config(format!(
                "cannot generate samples in {other}"
            )));
        }
    }
    Ok(())
}
