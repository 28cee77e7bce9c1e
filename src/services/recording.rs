//! 录音会话控制器 - 业务能力层
//!
//! 一次录音尝试的完整生命周期：获取设备 → 接收片段 → 计时 → 到达上限自动停止
//! → 封装音频 → 释放设备。
//!
//! ## 状态
//!
//! ```text
//! Inactive ──start()──▶ Recording ──stop() / 到达上限──▶ Inactive
//!     ▲                                                      │
//!     └──────────────────────── reset() ─────────────────────┘
//! ```
//!
//! 计时器是两个独立的 tokio 任务（每秒一次的计数、一次性的截止），
//! 它们只向控制器投递带会话标识的事件，从不直接修改控制器。
//! 离开 Recording 的每条路径都会同时取消两个任务；即便取消前已有事件在途，
//! 会话标识不匹配的事件也会被丢弃。
//!
//! 调用方没有持续 `pump()` 时，上限仍然成立：`stop()` 和 `pump()` 都会先按开始时刻
//! 核对截止时间，超时的会话按 `Deadline` 结束，封装的样本也不会超过上限时长。

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{DeviceError, RecordingError};
use crate::infrastructure::audio_input::{
    AudioInput, CapturedChunk, ChunkSink, DeviceHandle, SessionId,
};
use crate::models::audio::{AudioArtifact, CaptureFormat};

/// 默认录音上限（秒）
pub const MAX_RECORDING_SECONDS: u64 = 8;

/// 对外可见的会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingStatus {
    Inactive,
    Recording,
}

/// 停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 用户手动停止
    Manual,
    /// 到达时长上限自动停止
    Deadline,
}

/// 计时器投递的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(SessionId),
    Deadline(SessionId),
}

impl TimerEvent {
    pub fn session(self) -> SessionId {
        match self {
            TimerEvent::Tick(s) | TimerEvent::Deadline(s) => s,
        }
    }
}

/// `pump` 处理完一个事件后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// 收到一段音频
    Chunk,
    /// 计时加一
    Ticked(u32),
    /// 截止时间到，已自动停止
    AutoStopped,
    /// 过期会话的事件，已忽略
    Stale,
    /// 当前没有在录音
    Idle,
}

/// 一次录音尝试的计时任务
struct SessionTimers {
    tick: JoinHandle<()>,
    deadline: JoinHandle<()>,
}

impl SessionTimers {
    fn cancel(self) {
        self.tick.abort();
        self.deadline.abort();
    }
}

/// 录音会话控制器
///
/// 同一时刻最多持有一个设备句柄；句柄总是在转入 Inactive 的同一次转换中释放。
pub struct RecordingController<I: AudioInput> {
    input: I,
    max_duration: Duration,
    status: RecordingStatus,
    elapsed_seconds: u32,
    chunks: Vec<Vec<i16>>,
    format: CaptureFormat,
    artifact: Option<AudioArtifact>,
    device: Option<Box<dyn DeviceHandle>>,
    timers: Option<SessionTimers>,
    session: SessionId,
    started_at: Option<Instant>,
    last_stop: Option<StopReason>,
    chunk_tx: mpsc::UnboundedSender<CapturedChunk>,
    chunk_rx: mpsc::UnboundedReceiver<CapturedChunk>,
    timer_tx: mpsc::UnboundedSender<TimerEvent>,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
}

impl<I: AudioInput> RecordingController<I> {
    /// 使用默认 8 秒上限创建控制器
    pub fn new(input: I) -> Self {
        Self::with_max_duration(input, Duration::from_secs(MAX_RECORDING_SECONDS))
    }

    pub fn with_max_duration(input: I, max_duration: Duration) -> Self {
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        Self {
            input,
            max_duration,
            status: RecordingStatus::Inactive,
            elapsed_seconds: 0,
            chunks: Vec::new(),
            format: CaptureFormat::default(),
            artifact: None,
            device: None,
            timers: None,
            session: SessionId(0),
            started_at: None,
            last_stop: None,
            chunk_tx,
            chunk_rx,
            timer_tx,
            timer_rx,
        }
    }

    // ========== 查询 ==========

    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    pub fn is_recording(&self) -> bool {
        self.status == RecordingStatus::Recording
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// 录音进度（0.0 ~ 1.0），用于界面进度条
    pub fn progress(&self) -> f32 {
        let max = self.max_duration.as_secs_f32();
        if max <= 0.0 {
            return 0.0;
        }
        (self.elapsed_seconds as f32 / max).min(1.0)
    }

    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    /// 取走已完成的音频
    pub fn take_artifact(&mut self) -> Option<AudioArtifact> {
        self.artifact.take()
    }

    pub fn holds_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn has_pending_timers(&self) -> bool {
        self.timers.is_some()
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn last_stop_reason(&self) -> Option<StopReason> {
        self.last_stop
    }

    // ========== 状态转换 ==========

    /// 开始一次新的录音
    ///
    /// 先隐式 reset，旧会话的音频和计时器不会带入新尝试。
    pub async fn start(&mut self) -> Result<(), DeviceError> {
        self.reset();
        self.session = SessionId(self.session.0 + 1);
        let session = self.session;

        info!("🎙️ 开始录音 {} (设备: {})", session, self.input.describe());

        let sink = ChunkSink::new(session, self.chunk_tx.clone());
        let device = match self.input.acquire(sink).await {
            Ok(device) => device,
            Err(e) => {
                warn!("⚠️ 无法获取录音设备 {}: {}", session, e);
                return Err(e);
            }
        };

        self.format = device.format();
        self.device = Some(device);
        self.status = RecordingStatus::Recording;
        self.elapsed_seconds = 0;
        self.started_at = Some(Instant::now());
        self.timers = Some(self.spawn_timers(session));

        debug!(
            "录音 {} 已开始: {}Hz x{}，上限 {:?}",
            session, self.format.sample_rate, self.format.channels, self.max_duration
        );
        Ok(())
    }

    /// 手动停止
    ///
    /// 只在 Recording 状态下有效，否则什么也不做并返回 `Ok(None)`。
    /// 截止时间已过的会话先按超时结束，此时手动停止同样返回 `Ok(None)`，
    /// 音频从 `artifact()` 取得。
    pub fn stop(&mut self) -> Result<Option<&AudioArtifact>, RecordingError> {
        if self.expire_overdue() {
            return Ok(None);
        }
        self.finish(StopReason::Manual)
    }

    /// 丢弃一切并回到 Inactive；可重复调用
    pub fn reset(&mut self) {
        self.cancel_timers();
        self.release_device();
        self.status = RecordingStatus::Inactive;
        self.elapsed_seconds = 0;
        self.started_at = None;
        self.chunks.clear();
        self.artifact = None;
        self.last_stop = None;
        while self.chunk_rx.try_recv().is_ok() {}
        while self.timer_rx.try_recv().is_ok() {}
    }

    // ========== 事件处理 ==========

    /// 等待并处理下一个事件（音频片段或计时器）
    ///
    /// 不在录音时立即返回 `Idle`。
    pub async fn pump(&mut self) -> PumpOutcome {
        if !self.is_recording() {
            return PumpOutcome::Idle;
        }
        if self.deadline_passed() {
            return self.handle_timer(TimerEvent::Deadline(self.session));
        }
        tokio::select! {
            biased;
            Some(chunk) = self.chunk_rx.recv() => self.handle_chunk(chunk),
            Some(event) = self.timer_rx.recv() => self.handle_timer(event),
        }
    }

    /// 一直处理事件直到会话离开 Recording（通常是自动停止）
    pub async fn wait_until_inactive(&mut self) {
        while self.pump().await != PumpOutcome::Idle {}
    }

    /// 处理一个计时器事件
    ///
    /// 会话标识不匹配的事件来自已经结束的尝试，直接忽略。
    pub fn handle_timer(&mut self, event: TimerEvent) -> PumpOutcome {
        if event.session() != self.session || !self.is_recording() {
            debug!("忽略过期计时事件 {:?} (当前会话 {})", event, self.session);
            return PumpOutcome::Stale;
        }
        match event {
            TimerEvent::Tick(_) => {
                self.elapsed_seconds += 1;
                PumpOutcome::Ticked(self.elapsed_seconds)
            }
            TimerEvent::Deadline(_) => {
                info!(
                    "⏱️ 录音 {} 已达 {} 秒上限，自动停止",
                    self.session,
                    self.max_duration.as_secs()
                );
                if let Err(e) = self.finish(StopReason::Deadline) {
                    warn!("⚠️ 自动停止时封装音频失败: {}", e);
                }
                PumpOutcome::AutoStopped
            }
        }
    }

    /// 处理已经投递的计时事件，再按开始时刻核对截止时间
    ///
    /// # 返回
    /// 本次调用让会话按超时结束时返回 `true`
    fn expire_overdue(&mut self) -> bool {
        if !self.is_recording() {
            return false;
        }
        while let Ok(event) = self.timer_rx.try_recv() {
            if self.handle_timer(event) == PumpOutcome::AutoStopped {
                return true;
            }
        }
        if self.deadline_passed() {
            self.handle_timer(TimerEvent::Deadline(self.session));
            return true;
        }
        false
    }

    fn deadline_passed(&self) -> bool {
        self.started_at
            .is_some_and(|started| started.elapsed() >= self.max_duration)
    }

    /// 上限时长对应的样本数（所有声道合计，按整帧取整）
    fn max_samples(&self) -> usize {
        let channels = usize::from(self.format.channels.max(1));
        let frames = (self.max_duration.as_secs_f64() * self.format.sample_rate as f64) as usize;
        frames * channels
    }

    fn handle_chunk(&mut self, chunk: CapturedChunk) -> PumpOutcome {
        if chunk.session != self.session || !self.is_recording() {
            return PumpOutcome::Stale;
        }
        self.chunks.push(chunk.samples);
        PumpOutcome::Chunk
    }

    // ========== 内部 ==========

    fn finish(&mut self, reason: StopReason) -> Result<Option<&AudioArtifact>, RecordingError> {
        if !self.is_recording() {
            debug!("录音未在进行，忽略 {:?} 停止", reason);
            return Ok(None);
        }

        self.cancel_timers();
        // 设备停止前已经推送的片段属于本次录音
        while let Ok(chunk) = self.chunk_rx.try_recv() {
            if chunk.session == self.session {
                self.chunks.push(chunk.samples);
            }
        }
        self.release_device();
        self.status = RecordingStatus::Inactive;
        self.started_at = None;
        self.last_stop = Some(reason);
        if reason == StopReason::Deadline {
            self.elapsed_seconds = self.max_duration.as_secs() as u32;
        }

        let mut samples: Vec<i16> = std::mem::take(&mut self.chunks).concat();
        let limit = self.max_samples();
        if samples.len() > limit {
            debug!("录音 {} 超出上限，截去 {} 个样本", self.session, samples.len() - limit);
            samples.truncate(limit);
        }
        if samples.is_empty() {
            warn!("⚠️ 录音 {} 没有采集到任何音频", self.session);
            return Err(RecordingError::EmptyCapture);
        }

        let artifact = AudioArtifact::encode_pcm16(self.format, &samples)?;
        info!(
            "✓ 录音 {} 完成 ({:?}): {:.1} 秒, {} 字节",
            self.session,
            reason,
            artifact.duration().as_secs_f32(),
            artifact.bytes().len()
        );
        self.artifact = Some(artifact);
        Ok(self.artifact.as_ref())
    }

    fn spawn_timers(&self, session: SessionId) -> SessionTimers {
        let tick_tx = self.timer_tx.clone();
        let tick = tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tick_tx.send(TimerEvent::Tick(session)).is_err() {
                    break;
                }
            }
        });

        let deadline_tx = self.timer_tx.clone();
        let max_duration = self.max_duration;
        let deadline = tokio::spawn(async move {
            tokio::time::sleep(max_duration).await;
            let _ = deadline_tx.send(TimerEvent::Deadline(session));
        });

        SessionTimers { tick, deadline }
    }

    fn cancel_timers(&mut self) {
        if let Some(timers) = self.timers.take() {
            timers.cancel();
        }
    }

    fn release_device(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
            debug!("录音设备已释放 (会话 {})", self.session);
        }
    }
}

impl<I: AudioInput> Drop for RecordingController<I> {
    fn drop(&mut self) {
        self.cancel_timers();
        self.release_device();
    }
}
