//! 单个草稿处理器 - 编排层
//!
//! ## 职责
//!
//! 把一个草稿文件翻译成录入界面上的编辑操作，再交给 `QuestionAuthor` 提交。
//!
//! ## 核心功能
//!
//! 1. **选择课程和题型**：每个文件都从空白表单开始
//! 2. **回放编辑**：组成词、选项、正确答案都经过编辑器，编辑器拒绝时视为草稿无效
//! 3. **音频**：加载 WAV 文件，或现场录音（回车提前结束，到达上限自动结束）
//! 4. **提交**：校验与上传由 `QuestionAuthor` 完成

use tracing::{debug, info, warn};

use crate::clients::QuestionSubmitter;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{AudioInput, LineInput};
use crate::models::audio::AudioArtifact;
use crate::models::loaders::DraftFile;
use crate::models::option_set::MIN_OPTIONS;
use crate::models::word_list::MIN_WORDS;
use crate::utils::truncate_text;
use crate::workflow::{
    ActiveForm, DraftCtx, ListeningForm, OptionEditing, OrderingForm, QuestionAuthor, SubmitReceipt,
};

/// 处理单个草稿
///
/// # 参数
/// - `author`: 录入编排器（跨文件复用）
/// - `draft`: 草稿文件内容
/// - `ctx`: 日志上下文
/// - `stop_lines`: 终端输入，现场录音时收到一行即提前结束
///
/// # 返回
/// 提交成功时返回回执
pub async fn process_draft<I, S>(
    author: &mut QuestionAuthor<I, S>,
    draft: &DraftFile,
    ctx: &DraftCtx,
    stop_lines: &mut LineInput,
) -> AppResult<SubmitReceipt>
where
    I: AudioInput + Clone,
    S: QuestionSubmitter,
{
    info!(
        "{} 📄 {}: {}",
        ctx,
        draft.question_type,
        truncate_text(&draft.prompt, 40)
    );

    author.select_lesson(draft.lesson_id.as_str());
    author.select_variant(draft.question_type);

    match author.form_mut() {
        ActiveForm::Ordering(form) => fill_ordering(form, draft)?,
        ActiveForm::Choice(form) => {
            form.set_prompt(draft.prompt.as_str());
            fill_options(form, draft)?;
        }
        ActiveForm::Listening(form) => {
            form.set_prompt(draft.prompt.as_str());
            fill_options(form, draft)?;
            provide_audio(form, draft, ctx, stop_lines).await?;
        }
    }

    author.submit().await
}

fn fill_ordering(form: &mut OrderingForm, draft: &DraftFile) -> AppResult<()> {
    form.set_prompt_sentence(draft.prompt.as_str());
    form.set_correct_sentence(draft.correct_sentence.as_str());

    let target = draft.words.len().max(MIN_WORDS);
    while form.words().len() > target {
        let last = form.words().len() - 1;
        form.remove_word(last)
            .map_err(|w| invalid(draft, w.to_string()))?;
    }
    while form.words().len() < target {
        form.add_word().map_err(|w| invalid(draft, w.to_string()))?;
    }

    for (index, word) in draft.words.iter().enumerate() {
        form.set_word(index, word.as_str())
            .map_err(|w| invalid(draft, w.to_string()))?;
    }
    Ok(())
}

fn fill_options<F: OptionEditing>(form: &mut F, draft: &DraftFile) -> AppResult<()> {
    let target = draft.options.len().max(MIN_OPTIONS);
    while form.option_set().len() > target {
        let last = form.option_set().ids()[form.option_set().len() - 1];
        form.remove_option(last)
            .map_err(|w| invalid(draft, w.to_string()))?;
    }
    while form.option_set().len() < target {
        form.add_option().map_err(|w| invalid(draft, w.to_string()))?;
    }

    for (index, text) in draft.options.iter().enumerate() {
        let id = form
            .option_id_at(index)
            .ok_or_else(|| invalid(draft, format!("选项 {} 不存在", index)))?;
        form.set_option_text(id, text.as_str())
            .map_err(|w| invalid(draft, w.to_string()))?;
    }

    if let Some(correct) = draft.correct_option {
        let id = form.option_id_at(correct).ok_or_else(|| {
            invalid(
                draft,
                format!("correct_option={} 超出选项范围 (共 {} 个)", correct, draft.options.len()),
            )
        })?;
        form.mark_correct(id)
            .map_err(|w| invalid(draft, w.to_string()))?;
    }
    Ok(())
}

/// 为听力题准备音频：优先使用文件，其次现场录音
async fn provide_audio<I: AudioInput>(
    form: &mut ListeningForm<I>,
    draft: &DraftFile,
    ctx: &DraftCtx,
    stop_lines: &mut LineInput,
) -> AppResult<()> {
    if let Some(path) = draft.resolved_audio_path() {
        let artifact = AudioArtifact::load(&path).await?;
        info!(
            "{} 🎧 已加载音频 {} ({:.1} 秒)",
            ctx,
            path.display(),
            artifact.duration().as_secs_f32()
        );
        form.attach_audio(artifact);
        return Ok(());
    }

    if draft.record {
        return record_interactively(form, ctx, stop_lines).await;
    }

    debug!("{} 草稿没有提供音频", ctx);
    Ok(())
}

/// 现场录音：按回车提前结束，否则到达上限自动结束
async fn record_interactively<I: AudioInput>(
    form: &mut ListeningForm<I>,
    ctx: &DraftCtx,
    stop_lines: &mut LineInput,
) -> AppResult<()> {
    let stale = stop_lines.discard_pending();
    if stale > 0 {
        debug!("{} 丢弃录音开始前的 {} 行输入", ctx, stale);
    }

    form.start_recording().await?;
    info!(
        "{} 🔴 录音中，按回车结束（最长 {} 秒）...",
        ctx,
        form.recorder().max_duration().as_secs()
    );

    tokio::select! {
        _ = form.wait_for_auto_stop() => {}
        line = stop_lines.next_line() => match line {
            Some(_) => {
                form.stop_recording()?;
            }
            None => {
                debug!("{} 终端输入已关闭，等待自动停止", ctx);
                form.wait_for_auto_stop().await;
            }
        }
    }

    match &form.draft().audio {
        Some(audio) => info!(
            "{} ⏹️ 录音结束: {:.1} 秒",
            ctx,
            audio.duration().as_secs_f32()
        ),
        None => warn!("{} ⚠️ 录音结束但没有得到音频", ctx),
    }
    Ok(())
}

fn invalid(draft: &DraftFile, reason: String) -> AppError {
    AppError::invalid_draft(draft.file_path.display().to_string(), reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeviceError, SubmissionError, ValidationError};
    use crate::infrastructure::{ChunkSink, DeviceHandle, UnavailableInput};
    use crate::models::audio::CaptureFormat;
    use crate::models::draft::QuestionType;
    use crate::models::payload::{PayloadBody, SubmissionPayload};
    use futures::future::LocalBoxFuture;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::time::Instant;

    /// 假麦克风：获取后推送 1 秒音频，并记下设备释放的时刻
    #[derive(Clone, Default)]
    struct ToneInput {
        released_at: Rc<Cell<Option<Instant>>>,
    }

    struct ToneHandle {
        released_at: Rc<Cell<Option<Instant>>>,
    }

    impl DeviceHandle for ToneHandle {
        fn format(&self) -> CaptureFormat {
            CaptureFormat {
                sample_rate: 8_000,
                channels: 1,
            }
        }

        fn release(&mut self) {
            if self.released_at.get().is_none() {
                self.released_at.set(Some(Instant::now()));
            }
        }
    }

    impl AudioInput for ToneInput {
        fn acquire(
            &self,
            sink: ChunkSink,
        ) -> LocalBoxFuture<'_, Result<Box<dyn DeviceHandle>, DeviceError>> {
            Box::pin(async move {
                sink.push(vec![100; 8_000]);
                Ok(Box::new(ToneHandle {
                    released_at: self.released_at.clone(),
                }) as Box<dyn DeviceHandle>)
            })
        }

        fn describe(&self) -> String {
            "tone".to_string()
        }
    }

    fn closed_lines() -> LineInput {
        LineInput::channel().1
    }

    fn recorded_listening() -> DraftFile {
        let mut file = draft(QuestionType::Listening);
        file.prompt = "Listen".to_string();
        file.options = vec!["cat".to_string(), "dog".to_string()];
        file.correct_option = Some(0);
        file.record = true;
        file
    }

    #[derive(Default)]
    struct CollectingSubmitter {
        payloads: RefCell<Vec<SubmissionPayload>>,
    }

    impl QuestionSubmitter for CollectingSubmitter {
        fn submit_question<'a>(
            &'a self,
            _lesson_id: &'a str,
            payload: &'a SubmissionPayload,
        ) -> LocalBoxFuture<'a, Result<(), SubmissionError>> {
            self.payloads.borrow_mut().push(payload.clone());
            Box::pin(async { Ok(()) })
        }
    }

    fn draft(question_type: QuestionType) -> DraftFile {
        DraftFile {
            lesson_id: "7".to_string(),
            question_type,
            prompt: String::new(),
            words: Vec::new(),
            correct_sentence: String::new(),
            options: Vec::new(),
            correct_option: None,
            audio_file: None,
            record: false,
            file_path: PathBuf::from("drafts/test.toml"),
        }
    }

    fn ctx() -> DraftCtx {
        DraftCtx::new("test.toml".to_string(), 1, 1, "7".to_string())
    }

    #[tokio::test]
    async fn test_ordering_draft_submits_trimmed_words() {
        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(UnavailableInput, &submitter);
        let mut file = draft(QuestionType::SentenceBuilding);
        file.prompt = "I like to eat rice".to_string();
        file.words = ["Saya", "suka", "makan", "nasi", " goreng "]
            .iter()
            .map(|w| w.to_string())
            .collect();
        file.correct_sentence = "Saya suka makan nasi goreng".to_string();

        process_draft(&mut author, &file, &ctx(), &mut closed_lines()).await.unwrap();

        let payloads = submitter.payloads.borrow();
        match &payloads[0].body {
            PayloadBody::Ordering { words, .. } => {
                assert_eq!(words.len(), 5);
                assert_eq!(words[4], "goreng");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_choice_with_two_options_shrinks_editor() {
        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(UnavailableInput, &submitter);
        let mut file = draft(QuestionType::MultipleChoice);
        file.prompt = "Which one is a fruit?".to_string();
        file.options = vec!["epal".to_string(), "kereta".to_string()];
        file.correct_option = Some(0);

        let receipt = process_draft(&mut author, &file, &ctx(), &mut closed_lines()).await.unwrap();
        assert_eq!(receipt.lesson_id, "7");
        assert_eq!(
            submitter.payloads.borrow()[0].metadata("7").options.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_too_many_options_is_invalid_draft() {
        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(UnavailableInput, &submitter);
        let mut file = draft(QuestionType::MultipleChoice);
        file.prompt = "Pick".to_string();
        file.options = (0..5).map(|i| format!("option {}", i)).collect();

        let err = process_draft(&mut author, &file, &ctx(), &mut closed_lines()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("Maximum of 4 options allowed."));
        assert!(submitter.payloads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_listening_without_audio_fails_validation() {
        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(UnavailableInput, &submitter);
        let mut file = draft(QuestionType::Listening);
        file.prompt = "Listen".to_string();
        file.options = vec!["cat".to_string(), "dog".to_string()];
        file.correct_option = Some(1);

        let err = process_draft(&mut author, &file, &ctx(), &mut closed_lines()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingAudio)
        ));
    }

    #[tokio::test]
    async fn test_listening_record_without_device_reports_device_error() {
        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(UnavailableInput, &submitter);
        let mut file = draft(QuestionType::Listening);
        file.prompt = "Listen".to_string();
        file.options = vec!["cat".to_string(), "dog".to_string()];
        file.record = true;

        let err = process_draft(&mut author, &file, &ctx(), &mut closed_lines()).await.unwrap_err();
        assert!(matches!(err, AppError::Device(_)));
        assert!(submitter.payloads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_listening_loads_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = AudioArtifact::encode_pcm16(Default::default(), &[0; 1600]).unwrap();
        std::fs::write(dir.path().join("clip.wav"), artifact.bytes()).unwrap();

        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(UnavailableInput, &submitter);
        let mut file = draft(QuestionType::Listening);
        file.prompt = "Listen".to_string();
        file.options = vec!["cat".to_string(), "dog".to_string()];
        file.correct_option = Some(1);
        file.audio_file = Some(PathBuf::from("clip.wav"));
        file.file_path = dir.path().join("listen.toml");

        process_draft(&mut author, &file, &ctx(), &mut closed_lines()).await.unwrap();
        let payloads = submitter.payloads.borrow();
        assert_eq!(payloads[0].audio().unwrap().bytes(), artifact.bytes());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_stops_recording_early() {
        let input = ToneInput::default();
        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(input.clone(), &submitter);
        let (tx, mut lines) = LineInput::channel();
        let started = Instant::now();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            let _ = tx.send(String::new());
        });

        process_draft(&mut author, &recorded_listening(), &ctx(), &mut lines)
            .await
            .unwrap();

        let released = input.released_at.get().unwrap();
        assert_eq!(released - started, Duration::from_secs(2));
        let payloads = submitter.payloads.borrow();
        assert_eq!(
            payloads[0].audio().unwrap().duration(),
            Duration::from_secs(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_without_enter_auto_stops_at_limit() {
        let input = ToneInput::default();
        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(input.clone(), &submitter);
        let (tx, mut lines) = LineInput::channel();
        let started = Instant::now();

        // 录音开始前就按下的回车不算数
        tx.send(String::new()).unwrap();

        process_draft(&mut author, &recorded_listening(), &ctx(), &mut lines)
            .await
            .unwrap();

        let released = input.released_at.get().unwrap();
        assert_eq!(released - started, Duration::from_secs(8));
        assert!(submitter.payloads.borrow()[0].audio().is_some());
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_input_waits_for_auto_stop() {
        let input = ToneInput::default();
        let submitter = CollectingSubmitter::default();
        let mut author = QuestionAuthor::new(input.clone(), &submitter);
        let started = Instant::now();

        process_draft(&mut author, &recorded_listening(), &ctx(), &mut closed_lines())
            .await
            .unwrap();

        let released = input.released_at.get().unwrap();
        assert_eq!(released - started, Duration::from_secs(8));
        assert_eq!(submitter.payloads.borrow().len(), 1);
    }
}
