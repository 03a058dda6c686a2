/*!
    Audio device enumeration.
*/

use std::fmt;

use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait};
use media_types::{Error, Result};
use tracing::debug;

use crate::AudioSpec;
use crate::spec::from_cpal;

/**
    Whether a device captures or plays audio.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/**
    An audio device of the default platform host.
*/
pub struct Device {
    name: String,
    direction: Direction,
    default: bool,
    inner: cpal::Device,
}

impl Device {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /**
        Returns true if this is the host's default device for its direction.
    */
    pub fn is_default(&self) -> bool {
        self.default
    }

    /**
        Stream configurations the device supports in its direction.
    */
    pub fn supported_configs(&self) -> Result<Vec<SupportedStreamConfigRange>> {
        let configs = match self.direction {
            Direction::Input => self
                .inner
                .supported_input_configs()
                .map_err(device_error)?
                .collect(),
            Direction::Output => self
                .inner
                .supported_output_configs()
                .map_err(device_error)?
                .collect(),
        };
        Ok(configs)
    }

    /**
        The format the platform would pick for this device.

        # Errors

        Device error if the platform reports no default, configuration
        error if its sample format has no counterpart.
    */
    pub fn default_spec(&self) -> Result<AudioSpec> {
        let config = match self.direction {
            Direction::Input => self.inner.default_input_config(),
            Direction::Output => self.inner.default_output_config(),
        }
        .map_err(device_error)?;

        let format = from_cpal(config.sample_format()).ok_or_else(|| {
            Error::config(format!(
                "device {} uses unsupported sample format {}",
                self.name,
                config.sample_format()
            ))
        })?;
        Ok(AudioSpec::new(config.sample_rate().0, format, config.channels()))
    }

    pub(crate) fn inner(&self) -> &cpal::Device {
        &self.inner
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

pub(crate) fn device_error(error: impl fmt::Display) -> Error {
    Error::device(error.to_string())
}

/**
    List the devices of the default host in one direction.

    Devices whose name cannot be read are skipped.
*/
pub fn list_devices(direction: Direction) -> Result<Vec<Device>> {
    let host = cpal::default_host();
    let default_name = match direction {
        Direction::Input => host.default_input_device(),
        Direction::Output => host.default_output_device(),
    }
    .and_then(|d| d.name().ok());

    let devices: Vec<cpal::Device> = match direction {
        Direction::Input => host.input_devices().map_err(device_error)?.collect(),
        Direction::Output => host.output_devices().map_err(device_error)?.collect(),
    };

    let devices = devices
        .into_iter()
        .filter_map(|inner| {
            let name = inner.name().ok()?;
            Some(Device {
                default: default_name.as_deref() == Some(name.as_str()),
                name,
                direction,
                inner,
            })
        })
        .collect::<Vec<_>>();
    debug!(host = ?host.id(), %direction, count = devices.len(), "listed audio devices");
    Ok(devices)
}

/**
    The host's default device in one direction.
*/
pub fn default_device(direction: Direction) -> Result<Device> {
    let host = cpal::default_host();
    let inner = match direction {
        Direction::Input => host.default_input_device(),
        Direction::Output => host.default_output_device(),
    }
    .ok_or_else(|| Error::device(format!("no default {direction} device")))?;
    let name = inner.name().map_err(device_error)?;
    Ok(Device {
        name,
        direction,
        default: true,
        inner,
    })
}

/**
    The device of the given direction with exactly this name.

    # Errors

    Configuration error if no such device exists.
*/
pub fn find_device(direction: Direction, name: &str) -> Result<Device> {
    list_devices(direction)?
        .into_iter()
        .find(|d| d.name == name)
        .ok_or_else(|| Error::config(format!("no {direction} device named {name:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_names() {
        assert_eq!(Direction::Input.to_string(), "input");
        assert_eq!(Direction::Output.to_string(), "output");
    }

    #[test]
    fn device_errors_keep_their_message() {
        let err = device_error("stream invalidated");
        assert!(matches!(err, Error::Device { ref message } if message == "stream invalidated"));
    }
}
