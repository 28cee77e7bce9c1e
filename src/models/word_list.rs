//! 排序题的组成词列表
//!
//! 编辑器从不自动清理空白词，空白词是否允许由提交时的校验决定。

use thiserror::Error;

pub const MIN_WORDS: usize = 2;
pub const MAX_WORDS: usize = 8;
pub const INITIAL_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WordListWarning {
    #[error("Maximum of 8 words allowed.")]
    MaximumReached,
    #[error("At least two words are required.")]
    MinimumRequired,
    #[error("Word slot does not exist.")]
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl Default for WordList {
    fn default() -> Self {
        Self {
            words: vec![String::new(); INITIAL_WORDS],
        }
    }
}

impl WordList {
    /// 直接从给定词构建，不做数量限制（用于校验场景）
    pub fn from_words(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// 追加一个空白词，返回其位置
    pub fn add(&mut self) -> Result<usize, WordListWarning> {
        if self.words.len() >= MAX_WORDS {
            return Err(WordListWarning::MaximumReached);
        }
        self.words.push(String::new());
        Ok(self.words.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Result<(), WordListWarning> {
        if self.words.len() <= MIN_WORDS {
            return Err(WordListWarning::MinimumRequired);
        }
        if index >= self.words.len() {
            return Err(WordListWarning::OutOfRange);
        }
        self.words.remove(index);
        Ok(())
    }

    pub fn set(&mut self, index: usize, text: impl Into<String>) -> Result<(), WordListWarning> {
        let slot = self
            .words
            .get_mut(index)
            .ok_or(WordListWarning::OutOfRange)?;
        *slot = text.into();
        Ok(())
    }
}
