//! 系统麦克风（CPAL）
//!
//! 把设备原生格式统一转换为 16 位 PCM 后推送给录音会话。

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use futures::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::error::DeviceError;
use crate::infrastructure::audio_input::{AudioInput, ChunkSink, DeviceHandle};
use crate::models::audio::CaptureFormat;

/// CPAL 输入，可指定设备名称
#[derive(Debug, Clone, Default)]
pub struct MicrophoneInput {
    preferred_device: Option<String>,
}

impl MicrophoneInput {
    pub fn new(preferred_device: Option<String>) -> Self {
        Self { preferred_device }
    }

    /// 列出可用的输入设备名称
    pub fn list_devices() -> Vec<String> {
        let host = cpal::default_host();
        match host.input_devices() {
            Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
            Err(e) => {
                warn!("无法枚举输入设备: {}", e);
                Vec::new()
            }
        }
    }

    fn find_device(&self) -> Result<cpal::Device, DeviceError> {
        let host = cpal::default_host();
        match &self.preferred_device {
            Some(name) => host
                .input_devices()
                .map_err(|e| DeviceError::unavailable(format!("no input devices: {e}")))?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| DeviceError::unavailable(format!("input device '{name}' not found"))),
            None => host
                .default_input_device()
                .ok_or_else(|| DeviceError::unavailable("no default input device available")),
        }
    }

    fn open(&self, sink: ChunkSink) -> Result<MicrophoneHandle, DeviceError> {
        let device = self.find_device()?;
        let supported = device
            .default_input_config()
            .map_err(|e| DeviceError::unavailable(format!("cannot query input config: {e}")))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let format = CaptureFormat {
            sample_rate: config.sample_rate.0,
            channels: config.channels.max(1),
        };
        debug!(
            "麦克风配置: format={:?} sample_rate={}Hz channels={}",
            sample_format, format.sample_rate, format.channels
        );

        let err_fn = |err: cpal::StreamError| warn!("audio_stream_error: {}", err);
        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| sink.push(data.to_vec()),
                err_fn,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| {
                    sink.push(
                        data.iter()
                            .map(|s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
                            .collect(),
                    )
                },
                err_fn,
                None,
            ),
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| {
                    sink.push(data.iter().map(|s| (i32::from(*s) - 32_768) as i16).collect())
                },
                err_fn,
                None,
            ),
            other => {
                return Err(DeviceError::unavailable(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|e| DeviceError::unavailable(format!("cannot open input stream: {e}")))?;

        // play 失败时 stream 在这里被丢弃，设备随之释放
        stream
            .play()
            .map_err(|e| DeviceError::unavailable(format!("cannot start input stream: {e}")))?;

        Ok(MicrophoneHandle {
            stream: Some(stream),
            format,
        })
    }
}

impl AudioInput for MicrophoneInput {
    fn acquire(
        &self,
        sink: ChunkSink,
    ) -> LocalBoxFuture<'_, Result<Box<dyn DeviceHandle>, DeviceError>> {
        Box::pin(async move {
            let handle = self.open(sink)?;
            Ok(Box::new(handle) as Box<dyn DeviceHandle>)
        })
    }

    fn describe(&self) -> String {
        self.preferred_device
            .clone()
            .unwrap_or_else(|| "default input device".to_string())
    }
}

/// 独占中的麦克风流
pub struct MicrophoneHandle {
    stream: Option<Stream>,
    format: CaptureFormat,
}

impl DeviceHandle for MicrophoneHandle {
    fn format(&self) -> CaptureFormat {
        self.format
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("暂停输入流失败: {}", e);
            }
        }
    }
}

impl Drop for MicrophoneHandle {
    fn drop(&mut self) {
        self.release();
    }
}
