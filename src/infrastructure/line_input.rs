//! 终端输入行
//!
//! 标准输入在整个进程中只由一个专用线程读取，读到的每一行经 channel 投递出来。
//! 录音时等待的是 channel 而不是 stdin 本身，放弃等待不会留下悬空的读取；
//! 进程退出时该线程随之结束，不阻塞运行时关闭。

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// 按行到达的终端输入
pub struct LineInput {
    rx: mpsc::UnboundedReceiver<String>,
}

impl LineInput {
    /// 启动读取标准输入的专用线程
    ///
    /// 线程无法创建时返回一个已关闭的输入，调用方只能等待自动停止。
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let spawned = std::thread::Builder::new()
            .name("stdin-lines".to_string())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("⚠️ 读取标准输入失败: {}", e);
                            break;
                        }
                    }
                }
                debug!("标准输入已关闭");
            });
        if let Err(e) = spawned {
            warn!("⚠️ 无法启动标准输入读取线程: {}", e);
        }
        Self { rx }
    }

    /// 由调用方提供行来源（测试中替代终端）
    pub fn channel() -> (mpsc::UnboundedSender<String>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// 丢弃开始等待之前就已到达的行
    pub fn discard_pending(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// 等待下一行；输入已关闭时返回 `None`
    ///
    /// 可以安全地放在 `tokio::select!` 中，被取消时不会丢行。
    pub async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
