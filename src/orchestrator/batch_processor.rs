//! 批量草稿处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量草稿的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建 API 客户端
//! 2. **批量加载**：扫描草稿目录中的所有 TOML 文件
//! 3. **顺序处理**：录音设备同一时刻只能被一个会话独占，草稿逐个处理
//! 4. **结果确认**：提交成功后重新读取课程题目列表
//! 5. **全局统计**：汇总成功 / 失败数量
//!
//! 单个草稿失败只记录日志并计数，不会中断整批。

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::clients::LessonApiClient;
use crate::config::Config;
use crate::infrastructure::{AudioInput, LineInput};
use crate::models::loaders::{list_draft_files, load_draft_file};
use crate::orchestrator::draft_processor;
use crate::utils::logging;
use crate::workflow::{DraftCtx, QuestionAuthor};

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 应用主结构
pub struct App<I: AudioInput + Clone> {
    config: Config,
    client: LessonApiClient,
    input: I,
    /// 整个运行期间唯一的终端输入，录音时用回车提前结束
    stop_lines: LineInput,
}

impl<I: AudioInput + Clone> App<I> {
    /// 初始化应用，回车从标准输入读取
    pub fn initialize(config: Config, input: I) -> Result<Self> {
        Self::initialize_with_lines(config, input, LineInput::stdin())
    }

    /// 初始化应用，并指定结束录音用的输入来源
    pub fn initialize_with_lines(
        config: Config,
        input: I,
        stop_lines: LineInput,
    ) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        logging::log_startup(&config.api_base_url, &config.draft_folder);
        info!("🎙️ 音频输入: {}", input.describe());

        let client = LessonApiClient::new(&config).context("无法创建 API 客户端")?;

        Ok(Self {
            config,
            client,
            input,
            stop_lines,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<ProcessingStats> {
        info!("\n📁 正在扫描待处理的草稿...");
        let files = list_draft_files(&self.config.draft_folder)
            .await
            .context("无法读取草稿目录")?;

        if files.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        let stats = self.process_all_drafts(&files).await;

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );
        Ok(stats)
    }

    /// 逐个处理草稿
    async fn process_all_drafts(&mut self, files: &[std::path::PathBuf]) -> ProcessingStats {
        let mut stats = ProcessingStats {
            total: files.len(),
            ..Default::default()
        };

        // 编排器跨文件复用；每个文件都会重新选择题型，草稿不会串到下一个文件
        let mut author = QuestionAuthor::with_max_recording(
            self.input.clone(),
            &self.client,
            Duration::from_secs(self.config.max_recording_seconds),
        );

        for (idx, path) in files.iter().enumerate() {
            let draft = match load_draft_file(path).await {
                Ok(draft) => draft,
                Err(e) => {
                    error!("[草稿 {}/{}] ❌ 加载失败: {}", idx + 1, files.len(), e);
                    stats.failed += 1;
                    continue;
                }
            };

            let ctx = DraftCtx::new(
                draft.display_name(),
                idx + 1,
                files.len(),
                draft.lesson_id.clone(),
            );

            match draft_processor::process_draft(&mut author, &draft, &ctx, &mut self.stop_lines)
                .await
            {
                Ok(receipt) => {
                    stats.success += 1;
                    self.confirm_lesson(&ctx, &receipt.lesson_id).await;
                }
                Err(e) => {
                    error!("{} ❌ {}", ctx, e.user_message());
                    if e.user_message() != e.to_string() {
                        error!("{} 详情: {}", ctx, e);
                    }
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    /// 提交成功后重新读取课程题目列表，只用于日志
    async fn confirm_lesson(&self, ctx: &DraftCtx, lesson_id: &str) {
        match self.client.list_questions(lesson_id).await {
            Ok(questions) => info!("{} 📚 课程现有 {} 道题目", ctx, questions.len()),
            Err(e) => warn!("{} ⚠️ 无法刷新课程题目列表: {}", ctx, e),
        }
    }
}
