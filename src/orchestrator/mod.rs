//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量草稿处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描草稿目录（Vec<PathBuf>）
//! - 持有 API 客户端和音频输入
//! - 输出全局统计信息
//!
//! ### `draft_processor` - 单个草稿处理器
//! - 把草稿文件回放成编辑操作
//! - 加载或现场录制听力音频
//! - 交给 QuestionAuthor 校验并提交
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<DraftFile>)
//!     ↓
//! draft_processor (处理单个 DraftFile)
//!     ↓
//! workflow::QuestionAuthor (表单 + 提交)
//!     ↓
//! services (能力层：recording / validators)
//!     ↓
//! infrastructure (基础设施：AudioInput)
//! ```

pub mod batch_processor;
pub mod draft_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use draft_processor::process_draft;
