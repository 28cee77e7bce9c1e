//! 题型校验 - 业务能力层
//!
//! 纯函数：草稿 → 提交载荷 或 第一条违反的规则。
//! 只在提交时运行，按固定优先级逐条检查，遇到第一条违反即返回：
//!
//! 题干为空 → 题型必需内容（音频 / 句子 / 词数）→ 选项数量下限 → 未选正确答案 → 空白选项

use crate::error::ValidationError;
use crate::models::draft::{ChoiceDraft, ListeningDraft, OrderingDraft, QuestionDraft};
use crate::models::option_set::OptionSet;
use crate::models::payload::{PayloadBody, SubmissionPayload};
use crate::models::word_list::{MAX_WORDS, MIN_WORDS};

/// 按题型分派校验
pub fn validate(draft: &QuestionDraft) -> Result<SubmissionPayload, ValidationError> {
    match draft {
        QuestionDraft::Ordering(d) => validate_ordering(d),
        QuestionDraft::Listening(d) => validate_listening(d),
        QuestionDraft::Choice(d) => validate_choice(d),
    }
}

/// 排序题
///
/// 空白词不会被提前剔除，它的存在本身就是失败。
pub fn validate_ordering(draft: &OrderingDraft) -> Result<SubmissionPayload, ValidationError> {
    let prompt = draft.prompt_sentence.trim();
    let correct_sentence = draft.correct_sentence.trim();
    if prompt.is_empty() || correct_sentence.is_empty() {
        return Err(ValidationError::MissingSentence);
    }

    let words = draft.words.words();
    if !(MIN_WORDS..=MAX_WORDS).contains(&words.len()) {
        return Err(ValidationError::WordCountOutOfRange);
    }
    if words.iter().any(|w| is_blank(w)) {
        return Err(ValidationError::BlankWord);
    }

    Ok(SubmissionPayload {
        prompt_text: prompt.to_string(),
        body: PayloadBody::Ordering {
            words: words.iter().map(|w| w.trim().to_string()).collect(),
            correct_sentence: correct_sentence.to_string(),
        },
    })
}

/// 听力题：选项规则与单选题相同，另外要求录音已经完成
pub fn validate_listening(draft: &ListeningDraft) -> Result<SubmissionPayload, ValidationError> {
    let prompt = require_prompt(&draft.prompt_text)?;
    let audio = draft.audio.clone().ok_or(ValidationError::MissingAudio)?;
    let (options, correct_answer_index) = check_options(&draft.options)?;

    Ok(SubmissionPayload {
        prompt_text: prompt,
        body: PayloadBody::Listening {
            options,
            correct_answer_index,
            audio,
        },
    })
}

/// 单选题
pub fn validate_choice(draft: &ChoiceDraft) -> Result<SubmissionPayload, ValidationError> {
    let prompt = require_prompt(&draft.prompt_text)?;
    let (options, correct_answer_index) = check_options(&draft.options)?;

    Ok(SubmissionPayload {
        prompt_text: prompt,
        body: PayloadBody::Choice {
            options,
            correct_answer_index,
        },
    })
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn require_prompt(prompt: &str) -> Result<String, ValidationError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ValidationError::MissingPrompt);
    }
    Ok(prompt.to_string())
}

/// 选项共用规则，返回去空白后的选项文本和正确答案位置
fn check_options(set: &OptionSet) -> Result<(Vec<String>, usize), ValidationError> {
    let filled = set.candidates().iter().filter(|c| !c.is_blank()).count();
    if filled < 2 {
        return Err(ValidationError::TooFewOptions);
    }

    // 标记总是指向现存候选；指向不存在的候选按未选择处理
    let correct_index = set
        .correct_index()
        .ok_or(ValidationError::MissingCorrectAnswer)?;

    if set.candidates().iter().any(|c| c.is_blank()) {
        return Err(ValidationError::BlankOption);
    }

    let options = set
        .candidates()
        .iter()
        .map(|c| c.text.trim().to_string())
        .collect();
    Ok((options, correct_index))
}
