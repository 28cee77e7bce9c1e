//! # Lesson Question Author
//!
//! 课程题目录入工具：三种题型（连词成句、听力、单选）的草稿编辑、校验与提交，
//! 听力题内嵌限时录音。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（音频输入设备、标准输入），只暴露能力
//! - `AudioInput` / `DeviceHandle` - 设备获取与释放
//! - `LineInput` - 唯一的标准输入读取线程
//! - `MicrophoneInput` - CPAL 麦克风（`microphone` 特性）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `RecordingController` - 录音会话状态机（计时、自动停止、设备释放）
//! - `validators` - 三种题型的校验与载荷组装
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"从编辑到提交的完整流程
//! - `OrderingForm` / `ListeningForm` / `ChoiceForm` - 题型表单
//! - `QuestionAuthor` - 题型切换与提交编排
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量草稿处理器
//! - `orchestrator/draft_processor` - 单个草稿处理器
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{LessonApiClient, QuestionSubmitter};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{AudioInput, LineInput, UnavailableInput};
pub use models::{QuestionDraft, QuestionType, SubmissionPayload};
pub use orchestrator::{App, ProcessingStats};
pub use services::{RecordingController, RecordingStatus};
pub use workflow::{ActiveForm, QuestionAuthor, SubmitReceipt};
