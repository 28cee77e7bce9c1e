//! 题目草稿
//!
//! 草稿只存在于录入界面：选择题型时创建，切换题型或提交成功后丢弃，从不持久化。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::audio::AudioArtifact;
use crate::models::option_set::OptionSet;
use crate::models::word_list::WordList;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    /// 连词成句（排序题）
    SentenceBuilding,
    /// 听力题
    Listening,
    /// 单选题
    MultipleChoice,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::SentenceBuilding,
        QuestionType::Listening,
        QuestionType::MultipleChoice,
    ];

    /// 与服务端约定的类型代码
    pub fn code(self) -> &'static str {
        match self {
            QuestionType::SentenceBuilding => "SENTENCE_BUILDING",
            QuestionType::Listening => "LISTENING",
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
        }
    }

    /// 界面显示名称
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::SentenceBuilding => "Sentence Building",
            QuestionType::Listening => "Listening",
            QuestionType::MultipleChoice => "Multiple Choices",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 排序题草稿
#[derive(Debug, Clone, Default)]
pub struct OrderingDraft {
    pub prompt_sentence: String,
    pub words: WordList,
    pub correct_sentence: String,
}

/// 听力题草稿
#[derive(Debug, Clone)]
pub struct ListeningDraft {
    pub prompt_text: String,
    pub audio: Option<AudioArtifact>,
    pub options: OptionSet,
}

impl ListeningDraft {
    pub fn new(editor: u32) -> Self {
        Self {
            prompt_text: String::new(),
            audio: None,
            options: OptionSet::new(editor),
        }
    }
}

/// 单选题草稿
#[derive(Debug, Clone)]
pub struct ChoiceDraft {
    pub prompt_text: String,
    pub options: OptionSet,
}

impl ChoiceDraft {
    pub fn new(editor: u32) -> Self {
        Self {
            prompt_text: String::new(),
            options: OptionSet::new(editor),
        }
    }
}

/// 按题型区分的草稿
#[derive(Debug, Clone)]
pub enum QuestionDraft {
    Ordering(OrderingDraft),
    Listening(ListeningDraft),
    Choice(ChoiceDraft),
}

impl QuestionDraft {
    /// 为指定题型创建空草稿
    pub fn empty(question_type: QuestionType, editor: u32) -> Self {
        match question_type {
            QuestionType::SentenceBuilding => QuestionDraft::Ordering(OrderingDraft::default()),
            QuestionType::Listening => QuestionDraft::Listening(ListeningDraft::new(editor)),
            QuestionType::MultipleChoice => QuestionDraft::Choice(ChoiceDraft::new(editor)),
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionDraft::Ordering(_) => QuestionType::SentenceBuilding,
            QuestionDraft::Listening(_) => QuestionType::Listening,
            QuestionDraft::Choice(_) => QuestionType::MultipleChoice,
        }
    }

    pub fn options(&self) -> Option<&OptionSet> {
        match self {
            QuestionDraft::Ordering(_) => None,
            QuestionDraft::Listening(d) => Some(&d.options),
            QuestionDraft::Choice(d) => Some(&d.options),
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut OptionSet> {
        match self {
            QuestionDraft::Ordering(_) => None,
            QuestionDraft::Listening(d) => Some(&mut d.options),
            QuestionDraft::Choice(d) => Some(&mut d.options),
        }
    }
}
