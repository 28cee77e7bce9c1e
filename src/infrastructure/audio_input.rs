//! 音频输入 - 基础设施层
//!
//! 只暴露"独占一个输入设备并持续推送 PCM 片段"的能力，
//! 不认识录音会话的状态机，也不处理计时。

use futures::future::LocalBoxFuture;
use std::fmt;
use tokio::sync::mpsc;

use crate::error::DeviceError;
use crate::models::audio::CaptureFormat;

/// 录音会话标识
///
/// 每次 start 都会换一个新的标识，过期的片段和定时器回调凭此被丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 设备回调推送出来的一段 16 位 PCM（交错排列）
#[derive(Debug, Clone)]
pub struct CapturedChunk {
    pub session: SessionId,
    pub samples: Vec<i16>,
}

/// 设备回调向录音会话推送片段的出口
///
/// 可以跨线程移动（cpal 在自己的回调线程里调用）。
#[derive(Debug, Clone)]
pub struct ChunkSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<CapturedChunk>,
}

impl ChunkSink {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<CapturedChunk>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// 推送一段样本；接收端已关闭时静默丢弃
    pub fn push(&self, samples: Vec<i16>) {
        if samples.is_empty() {
            return;
        }
        let _ = self.tx.send(CapturedChunk {
            session: self.session,
            samples,
        });
    }
}

/// 已独占的设备
///
/// `release` 必须幂等：停止底层硬件流并释放设备。
pub trait DeviceHandle {
    fn format(&self) -> CaptureFormat;
    fn release(&mut self);
}

/// 可以获取输入设备的来源
pub trait AudioInput {
    /// 获取设备并开始向 `sink` 推送片段
    ///
    /// 权限被拒、没有设备或设备被占用时返回 `DeviceUnavailable`；
    /// 部分获取成功后失败的，实现方负责在返回错误前释放已占用的部分。
    fn acquire(
        &self,
        sink: ChunkSink,
    ) -> LocalBoxFuture<'_, Result<Box<dyn DeviceHandle>, DeviceError>>;

    /// 日志中展示的设备描述
    fn describe(&self) -> String;
}

/// 没有麦克风支持时使用的输入：总是不可用
#[derive(Debug, Clone, Default)]
pub struct UnavailableInput;

impl AudioInput for UnavailableInput {
    fn acquire(
        &self,
        _sink: ChunkSink,
    ) -> LocalBoxFuture<'_, Result<Box<dyn DeviceHandle>, DeviceError>> {
        Box::pin(async {
            Err(DeviceError::unavailable(
                "built without microphone support (enable the `microphone` feature)",
            ))
        })
    }

    fn describe(&self) -> String {
        "no input".to_string()
    }
}
