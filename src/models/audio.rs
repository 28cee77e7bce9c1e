//! 录音产物
//!
//! 一段已经封装好的 WAV 音频，生成后不可变。

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult, FileError};

pub const AUDIO_MIME: &str = "audio/wav";
pub const AUDIO_FILE_NAME: &str = "recording.wav";

/// 采集格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for CaptureFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
        }
    }
}

/// 已封装的音频
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    bytes: Arc<[u8]>,
    format: CaptureFormat,
    frames: u32,
}

impl AudioArtifact {
    /// 把 16 位 PCM 交错样本编码成 WAV
    pub fn encode_pcm16(format: CaptureFormat, samples: &[i16]) -> Result<Self, hound::Error> {
        let spec = hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in samples {
                writer.write_sample(*sample)?;
            }
            writer.finalize()?;
        }
        let channels = u32::from(format.channels.max(1));
        Ok(Self {
            bytes: cursor.into_inner().into(),
            format,
            frames: samples.len() as u32 / channels,
        })
    }

    /// 校验并接收一段现成的 WAV 数据
    pub fn from_wav_bytes(bytes: Vec<u8>) -> Result<Self, hound::Error> {
        let (spec, frames) = {
            let reader = hound::WavReader::new(Cursor::new(bytes.as_slice()))?;
            (reader.spec(), reader.duration())
        };
        Ok(Self {
            format: CaptureFormat {
                sample_rate: spec.sample_rate,
                channels: spec.channels,
            },
            frames,
            bytes: bytes.into(),
        })
    }

    /// 从磁盘加载 WAV 文件
    pub async fn load(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(&display, e))?;
        Self::from_wav_bytes(bytes).map_err(|source| {
            AppError::File(FileError::InvalidWav {
                path: display,
                source,
            })
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }

    pub fn duration(&self) -> Duration {
        if self.format.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(f64::from(self.frames) / f64::from(self.format.sample_rate))
    }
}
