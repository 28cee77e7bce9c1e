//! 题目录入编排 - 流程层
//!
//! 核心职责：把当前题型的表单和提交边界串起来
//!
//! 流程顺序：
//! 1. 选择课程、选择题型（切换题型丢弃旧草稿）
//! 2. 表单编辑（选项、组成词、录音）
//! 3. 提交：校验 → 上传 → 成功后清空草稿，失败保留草稿

use std::time::Duration;

use tracing::{error, info, warn};

use crate::clients::QuestionSubmitter;
use crate::error::{AppResult, ValidationError};
use crate::infrastructure::AudioInput;
use crate::models::draft::QuestionType;
use crate::services::recording::{RecordingController, MAX_RECORDING_SECONDS};
use crate::workflow::forms::{ActiveForm, ChoiceForm, ListeningForm, OrderingForm};

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub lesson_id: String,
    pub question_type: QuestionType,
}

/// 题目录入编排器
///
/// - 持有当前题型和对应的表单
/// - 不直接发网络请求，只依赖 `QuestionSubmitter`
/// - 音频输入在每次创建听力表单时克隆一份交给新的录音控制器
pub struct QuestionAuthor<I: AudioInput + Clone, S: QuestionSubmitter> {
    input: I,
    submitter: S,
    max_recording: Duration,
    lesson_id: Option<String>,
    form: ActiveForm<I>,
    editor_seq: u32,
}

impl<I: AudioInput + Clone, S: QuestionSubmitter> QuestionAuthor<I, S> {
    /// 创建编排器，默认题型为排序题
    pub fn new(input: I, submitter: S) -> Self {
        Self::with_max_recording(input, submitter, Duration::from_secs(MAX_RECORDING_SECONDS))
    }

    pub fn with_max_recording(input: I, submitter: S, max_recording: Duration) -> Self {
        Self {
            input,
            submitter,
            max_recording,
            lesson_id: None,
            form: ActiveForm::Ordering(OrderingForm::new()),
            editor_seq: 0,
        }
    }

    pub fn lesson_id(&self) -> Option<&str> {
        self.lesson_id.as_deref()
    }

    pub fn select_lesson(&mut self, lesson_id: impl Into<String>) {
        let lesson_id = lesson_id.into();
        info!("📚 当前课程: {}", lesson_id);
        self.lesson_id = Some(lesson_id);
    }

    pub fn question_type(&self) -> QuestionType {
        self.form.question_type()
    }

    /// 切换题型
    ///
    /// 旧草稿整体丢弃，不在题型之间携带任何数据；
    /// 听力表单被丢弃时其录音控制器随之释放设备。
    pub fn select_variant(&mut self, question_type: QuestionType) {
        self.editor_seq += 1;
        let editor = self.editor_seq;
        self.form = match question_type {
            QuestionType::SentenceBuilding => ActiveForm::Ordering(OrderingForm::new()),
            QuestionType::Listening => ActiveForm::Listening(ListeningForm::new(
                editor,
                RecordingController::with_max_duration(self.input.clone(), self.max_recording),
            )),
            QuestionType::MultipleChoice => ActiveForm::Choice(ChoiceForm::new(editor)),
        };
        info!("📝 新建 {} 草稿", question_type);
    }

    pub fn form(&self) -> &ActiveForm<I> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ActiveForm<I> {
        &mut self.form
    }

    /// 提交当前草稿
    ///
    /// # 返回
    /// - 未选择课程或校验失败：返回 `Validation` 错误，不发起网络请求
    /// - 上传失败：返回 `Submission` 错误，草稿原样保留以便重试
    /// - 成功：草稿重置为同题型的空白表单
    pub async fn submit(&mut self) -> AppResult<SubmitReceipt> {
        let lesson_id = match self.lesson_id.clone() {
            Some(id) => id,
            None => {
                warn!("⚠️ {}", ValidationError::NoLessonSelected);
                return Err(ValidationError::NoLessonSelected.into());
            }
        };

        let payload = match self.form.validate() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("⚠️ 校验未通过: {}", e);
                return Err(e.into());
            }
        };

        let question_type = payload.question_type();
        info!("📤 提交 {} 到课程 {}...", question_type, lesson_id);

        if let Err(e) = self.submitter.submit_question(&lesson_id, &payload).await {
            error!("❌ 提交失败: {}", e);
            return Err(e.into());
        }

        info!("✅ {} 提交成功", question_type);
        self.select_variant(question_type);
        Ok(SubmitReceipt {
            lesson_id,
            question_type,
        })
    }
}
