//! Error types for embers.
//!
//! The simulation step itself never fails. Errors only come from the edges:
//! acquiring a GPU device, reading buffers back, and loading configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up or reading the GPU backend.
#[derive(Debug, Error)]
pub enum GpuError {
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    /// Failed to map buffer for reading.
    #[error("Failed to map GPU buffer: {0}")]
    BufferMapping(String),
}

impl From<wgpu::BufferAsyncError> for GpuError {
    fn from(e: wgpu::BufferAsyncError) -> Self {
        GpuError::BufferMapping(e.to_string())
    }
}

/// Errors that can occur when loading or saving a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write a configuration file.
    #[error("Failed to access config file {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid JSON for this schema.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A preset name did not match any known preset.
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
    /// A color string was not `#rrggbb`.
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_io_error_chains_source() {
        let err = ConfigError::Io {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("missing.json"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_json_error_converts() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ConfigError::UnknownPreset("lava".into()).to_string(),
            "Unknown preset 'lava'"
        );
        assert!(GpuError::NoAdapter.to_string().starts_with("No compatible GPU adapter"));
    }
}
