//! 三种题型的录入表单
//!
//! 表单持有草稿和编辑器；听力表单另外独占一个录音会话控制器。
//! 编辑器拒绝的操作只产生提示，草稿保持原样。

use tracing::{debug, warn};

use crate::error::{DeviceError, RecordingError, ValidationError};
use crate::infrastructure::AudioInput;
use crate::models::audio::AudioArtifact;
use crate::models::draft::{ChoiceDraft, ListeningDraft, OrderingDraft, QuestionDraft, QuestionType};
use crate::models::option_set::{OptionId, OptionSet, OptionSetWarning};
use crate::models::payload::SubmissionPayload;
use crate::models::word_list::{WordList, WordListWarning};
use crate::services::recording::{PumpOutcome, RecordingController};
use crate::services::validators;

/// 记录并透传编辑器提示
fn surface<T, W: std::fmt::Display>(result: Result<T, W>) -> Result<T, W> {
    if let Err(w) = &result {
        warn!("⚠️ {}", w);
    }
    result
}

// ========== 排序题 ==========

/// 排序题表单
#[derive(Debug, Clone, Default)]
pub struct OrderingForm {
    draft: OrderingDraft,
}

impl OrderingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &OrderingDraft {
        &self.draft
    }

    pub fn words(&self) -> &WordList {
        &self.draft.words
    }

    pub fn set_prompt_sentence(&mut self, text: impl Into<String>) {
        self.draft.prompt_sentence = text.into();
    }

    pub fn set_correct_sentence(&mut self, text: impl Into<String>) {
        self.draft.correct_sentence = text.into();
    }

    pub fn add_word(&mut self) -> Result<usize, WordListWarning> {
        surface(self.draft.words.add())
    }

    pub fn remove_word(&mut self, index: usize) -> Result<(), WordListWarning> {
        surface(self.draft.words.remove(index))
    }

    pub fn set_word(&mut self, index: usize, text: impl Into<String>) -> Result<(), WordListWarning> {
        surface(self.draft.words.set(index, text))
    }

    pub fn validate(&self) -> Result<SubmissionPayload, ValidationError> {
        validators::validate_ordering(&self.draft)
    }
}

// ========== 选项编辑（单选 / 听力共用） ==========

/// 持有选项集的表单共有的编辑操作
pub trait OptionEditing {
    fn option_set(&self) -> &OptionSet;
    fn option_set_mut(&mut self) -> &mut OptionSet;

    fn add_option(&mut self) -> Result<OptionId, OptionSetWarning> {
        surface(self.option_set_mut().add())
    }

    fn remove_option(&mut self, id: OptionId) -> Result<(), OptionSetWarning> {
        surface(self.option_set_mut().remove(id))
    }

    fn set_option_text(
        &mut self,
        id: OptionId,
        text: impl Into<String>,
    ) -> Result<(), OptionSetWarning>
    where
        Self: Sized,
    {
        surface(self.option_set_mut().set_text(id, text))
    }

    fn mark_correct(&mut self, id: OptionId) -> Result<(), OptionSetWarning> {
        surface(self.option_set_mut().mark_correct(id))
    }

    /// 按位置取候选标识，供批量录入按下标定位
    fn option_id_at(&self, index: usize) -> Option<OptionId> {
        self.option_set().candidates().get(index).map(|c| c.id)
    }
}

// ========== 单选题 ==========

/// 单选题表单
#[derive(Debug, Clone)]
pub struct ChoiceForm {
    draft: ChoiceDraft,
}

impl ChoiceForm {
    pub fn new(editor: u32) -> Self {
        Self {
            draft: ChoiceDraft::new(editor),
        }
    }

    pub fn draft(&self) -> &ChoiceDraft {
        &self.draft
    }

    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.draft.prompt_text = text.into();
    }

    pub fn validate(&self) -> Result<SubmissionPayload, ValidationError> {
        validators::validate_choice(&self.draft)
    }
}

impl OptionEditing for ChoiceForm {
    fn option_set(&self) -> &OptionSet {
        &self.draft.options
    }

    fn option_set_mut(&mut self) -> &mut OptionSet {
        &mut self.draft.options
    }
}

// ========== 听力题 ==========

/// 听力题表单
///
/// 草稿中的音频只在录音完成（手动停止或到达上限）后才出现，
/// 录音进行中草稿没有音频。
pub struct ListeningForm<I: AudioInput> {
    draft: ListeningDraft,
    recorder: RecordingController<I>,
}

impl<I: AudioInput> ListeningForm<I> {
    pub fn new(editor: u32, recorder: RecordingController<I>) -> Self {
        Self {
            draft: ListeningDraft::new(editor),
            recorder,
        }
    }

    pub fn draft(&self) -> &ListeningDraft {
        &self.draft
    }

    pub fn recorder(&self) -> &RecordingController<I> {
        &self.recorder
    }

    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.draft.prompt_text = text.into();
    }

    /// 开始录音；之前的音频随隐式 reset 一起丢弃
    pub async fn start_recording(&mut self) -> Result<(), DeviceError> {
        self.draft.audio = None;
        self.recorder.start().await
    }

    /// 手动停止录音，成功时音频写入草稿
    ///
    /// 已经超过上限的会话按自动停止结束，草稿同样拿到截断到上限的音频。
    pub fn stop_recording(&mut self) -> Result<Option<&AudioArtifact>, RecordingError> {
        match self.recorder.stop() {
            Ok(_) => {
                self.sync_artifact();
                Ok(self.draft.audio.as_ref())
            }
            Err(e) => {
                warn!("⚠️ 停止录音失败: {}", e);
                Err(e)
            }
        }
    }

    /// 丢弃录音和草稿中的音频
    pub fn reset_recording(&mut self) {
        self.recorder.reset();
        self.draft.audio = None;
    }

    /// 处理录音会话的下一个事件；自动停止时同步音频到草稿
    pub async fn pump_recording(&mut self) -> PumpOutcome {
        let outcome = self.recorder.pump().await;
        if outcome == PumpOutcome::AutoStopped {
            self.sync_artifact();
        }
        outcome
    }

    /// 等待录音因到达上限而结束
    pub async fn wait_for_auto_stop(&mut self) {
        self.recorder.wait_until_inactive().await;
        self.sync_artifact();
    }

    /// 直接附加一段已有音频（例如从 WAV 文件加载）
    pub fn attach_audio(&mut self, artifact: AudioArtifact) {
        self.recorder.reset();
        debug!("附加音频: {:.1} 秒", artifact.duration().as_secs_f32());
        self.draft.audio = Some(artifact);
    }

    pub fn validate(&self) -> Result<SubmissionPayload, ValidationError> {
        validators::validate_listening(&self.draft)
    }

    fn sync_artifact(&mut self) {
        if let Some(artifact) = self.recorder.artifact() {
            self.draft.audio = Some(artifact.clone());
        }
    }
}

impl<I: AudioInput> OptionEditing for ListeningForm<I> {
    fn option_set(&self) -> &OptionSet {
        &self.draft.options
    }

    fn option_set_mut(&mut self) -> &mut OptionSet {
        &mut self.draft.options
    }
}

// ========== 当前表单 ==========

/// 当前选中的题型表单
pub enum ActiveForm<I: AudioInput> {
    Ordering(OrderingForm),
    Listening(ListeningForm<I>),
    Choice(ChoiceForm),
}

impl<I: AudioInput> ActiveForm<I> {
    pub fn question_type(&self) -> QuestionType {
        match self {
            ActiveForm::Ordering(_) => QuestionType::SentenceBuilding,
            ActiveForm::Listening(_) => QuestionType::Listening,
            ActiveForm::Choice(_) => QuestionType::MultipleChoice,
        }
    }

    /// 当前草稿的快照
    pub fn to_draft(&self) -> QuestionDraft {
        match self {
            ActiveForm::Ordering(form) => QuestionDraft::Ordering(form.draft.clone()),
            ActiveForm::Listening(form) => QuestionDraft::Listening(form.draft.clone()),
            ActiveForm::Choice(form) => QuestionDraft::Choice(form.draft.clone()),
        }
    }

    pub fn validate(&self) -> Result<SubmissionPayload, ValidationError> {
        validators::validate(&self.to_draft())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::UnavailableInput;

    #[test]
    fn test_fresh_forms_start_with_blank_slots() {
        let ordering = OrderingForm::new();
        assert_eq!(ordering.words().len(), 3);

        let choice = ChoiceForm::new(1);
        assert_eq!(choice.option_set().len(), 4);
        assert!(choice.option_set().correct_id().is_none());
    }

    #[test]
    fn test_editor_warnings_leave_form_unchanged() {
        let mut choice = ChoiceForm::new(1);
        assert_eq!(choice.add_option(), Err(OptionSetWarning::MaximumReached));
        assert_eq!(choice.option_set().len(), 4);

        let mut ordering = OrderingForm::new();
        ordering.remove_word(0).unwrap();
        assert_eq!(
            ordering.remove_word(0),
            Err(WordListWarning::MinimumRequired)
        );
        assert_eq!(ordering.words().len(), 2);
    }

    #[test]
    fn test_choice_form_builds_payload() {
        let mut form = ChoiceForm::new(7);
        form.set_prompt("Apa ini?");
        let ids: Vec<OptionId> = form.option_set().ids();
        for (id, text) in ids.iter().zip(["buku", "pena", "meja", "kerusi"]) {
            form.set_option_text(*id, text).unwrap();
        }
        form.mark_correct(ids[2]).unwrap();

        let payload = form.validate().unwrap();
        assert_eq!(payload.question_type(), QuestionType::MultipleChoice);
        assert_eq!(payload.metadata("L1").correct_answer_index, Some(2));
    }

    #[test]
    fn test_listening_form_uses_attached_audio() {
        let mut form = ListeningForm::new(2, RecordingController::new(UnavailableInput));
        form.set_prompt("Listen");
        let first = form.option_id_at(0).unwrap();
        let second = form.option_id_at(1).unwrap();
        form.remove_option(form.option_id_at(3).unwrap()).unwrap();
        form.remove_option(form.option_id_at(2).unwrap()).unwrap();
        form.set_option_text(first, "cat").unwrap();
        form.set_option_text(second, "dog").unwrap();
        form.mark_correct(second).unwrap();

        assert_eq!(form.validate(), Err(ValidationError::MissingAudio));

        let audio = AudioArtifact::encode_pcm16(Default::default(), &[0, 1, 2]).unwrap();
        form.attach_audio(audio);
        let payload = form.validate().unwrap();
        assert!(payload.audio().is_some());
        assert_eq!(payload.metadata("L1").options.unwrap(), ["cat", "dog"]);
    }

    #[test]
    fn test_active_form_snapshot_validates_like_the_form() {
        let mut form = ChoiceForm::new(4);
        form.set_prompt("  Apa ini?  ");
        let ids = form.option_set().ids();
        for (id, text) in ids.iter().zip(["buku", "pena", "meja", "kerusi"]) {
            form.set_option_text(*id, text).unwrap();
        }
        form.mark_correct(ids[1]).unwrap();
        let expected = form.validate().unwrap();

        let active: ActiveForm<UnavailableInput> = ActiveForm::Choice(form);
        let draft = active.to_draft();
        assert_eq!(draft.question_type(), active.question_type());
        assert_eq!(active.validate().unwrap(), expected);

        let ordering: ActiveForm<UnavailableInput> = ActiveForm::Ordering(OrderingForm::new());
        assert_eq!(ordering.validate(), Err(ValidationError::MissingSentence));
    }

    #[tokio::test]
    async fn test_listening_form_keeps_no_audio_when_device_missing() {
        let mut form = ListeningForm::new(3, RecordingController::new(UnavailableInput));
        assert!(form.start_recording().await.is_err());
        assert!(!form.recorder().holds_device());
        assert!(form.draft().audio.is_none());
        assert!(form.stop_recording().unwrap().is_none());
    }
}
