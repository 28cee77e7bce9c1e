//! 选项集编辑器
//!
//! 维护一组有序的候选答案和唯一的"正确答案"标记。
//! 候选数量在任何一次变更之后都保持在 [2, 4] 之间。

use std::fmt;
use thiserror::Error;

/// 候选数量下限
pub const MIN_OPTIONS: usize = 2;
/// 候选数量上限
pub const MAX_OPTIONS: usize = 4;
/// 新表单默认提供的空白候选数
pub const INITIAL_OPTIONS: usize = 4;

/// 候选项标识
///
/// 由所属编辑器实例签发，文本修改和重新排序都不会改变它。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionId {
    editor: u32,
    seq: u32,
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option-{}-{}", self.editor, self.seq)
    }
}

/// 单个候选答案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCandidate {
    pub id: OptionId,
    pub text: String,
}

impl OptionCandidate {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 编辑器拒绝执行时给用户的提示，集合本身保持不变
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OptionSetWarning {
    #[error("Maximum of 4 options allowed.")]
    MaximumReached,
    #[error("At least 2 options are required.")]
    MinimumRequired,
    #[error("Option no longer exists.")]
    UnknownOption,
}

/// 选项集：候选列表 + 正确答案标记
#[derive(Debug, Clone)]
pub struct OptionSet {
    editor: u32,
    next_seq: u32,
    candidates: Vec<OptionCandidate>,
    correct_id: Option<OptionId>,
}

impl OptionSet {
    /// 创建带 4 个空白候选的选项集
    ///
    /// `editor` 是编辑器实例的编号，与本集合内部的序号一起构成候选标识，
    /// 不同实例签发的标识互不重复。
    pub fn new(editor: u32) -> Self {
        let mut set = Self {
            editor,
            next_seq: 0,
            candidates: Vec::with_capacity(MAX_OPTIONS),
            correct_id: None,
        };
        for _ in 0..INITIAL_OPTIONS {
            let id = set.mint_id();
            set.candidates.push(OptionCandidate {
                id,
                text: String::new(),
            });
        }
        set
    }

    fn mint_id(&mut self) -> OptionId {
        let id = OptionId {
            editor: self.editor,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        id
    }

    pub fn candidates(&self) -> &[OptionCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn correct_id(&self) -> Option<OptionId> {
        self.correct_id
    }

    pub fn get(&self, id: OptionId) -> Option<&OptionCandidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// 正确答案在当前顺序中的位置
    pub fn correct_index(&self) -> Option<usize> {
        let correct = self.correct_id?;
        self.candidates.iter().position(|c| c.id == correct)
    }

    /// 第一个空白候选（仅用于界面聚焦）
    pub fn first_blank(&self) -> Option<OptionId> {
        self.candidates.iter().find(|c| c.is_blank()).map(|c| c.id)
    }

    /// 追加一个空白候选
    pub fn add(&mut self) -> Result<OptionId, OptionSetWarning> {
        if self.candidates.len() >= MAX_OPTIONS {
            return Err(OptionSetWarning::MaximumReached);
        }
        let id = self.mint_id();
        self.candidates.push(OptionCandidate {
            id,
            text: String::new(),
        });
        Ok(id)
    }

    /// 删除候选；删除的是正确答案时清除标记
    pub fn remove(&mut self, id: OptionId) -> Result<(), OptionSetWarning> {
        if self.candidates.len() <= MIN_OPTIONS {
            return Err(OptionSetWarning::MinimumRequired);
        }
        let index = self
            .candidates
            .iter()
            .position(|c| c.id == id)
            .ok_or(OptionSetWarning::UnknownOption)?;
        self.candidates.remove(index);
        if self.correct_id == Some(id) {
            self.correct_id = None;
        }
        Ok(())
    }

    /// 替换候选文本，不改变顺序和标识
    pub fn set_text(&mut self, id: OptionId, text: impl Into<String>) -> Result<(), OptionSetWarning> {
        let candidate = self
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(OptionSetWarning::UnknownOption)?;
        candidate.text = text.into();
        Ok(())
    }

    /// 标记正确答案
    pub fn mark_correct(&mut self, id: OptionId) -> Result<(), OptionSetWarning> {
        if self.get(id).is_none() {
            return Err(OptionSetWarning::UnknownOption);
        }
        self.correct_id = Some(id);
        Ok(())
    }

    pub fn ids(&self) -> Vec<OptionId> {
        self.candidates.iter().map(|c| c.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_set_has_four_blank_candidates_and_no_marker() {
        let set = OptionSet::new(1);
        assert_eq!(set.len(), 4);
        assert!(set.candidates().iter().all(|c| c.is_blank()));
        assert_eq!(set.correct_id(), None);
        assert_eq!(set.first_blank(), Some(set.candidates()[0].id));
    }

    #[test]
    fn test_add_at_maximum_is_noop_with_warning() {
        let mut set = OptionSet::new(1);
        let before = set.ids();
        assert_eq!(set.add(), Err(OptionSetWarning::MaximumReached));
        assert_eq!(set.ids(), before);
    }

    #[test]
    fn test_remove_at_minimum_is_noop_with_warning() {
        let mut set = OptionSet::new(1);
        let ids = set.ids();
        set.remove(ids[0]).unwrap();
        set.remove(ids[1]).unwrap();
        assert_eq!(set.remove(ids[2]), Err(OptionSetWarning::MinimumRequired));
        assert_eq!(set.ids(), vec![ids[2], ids[3]]);
    }

    #[test]
    fn test_cardinality_holds_after_any_sequence() {
        let mut set = OptionSet::new(7);
        // 固定的伪随机操作序列
        let mut state: u32 = 0x2545_f491;
        for _ in 0..500 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if state % 2 == 0 {
                let _ = set.add();
            } else {
                let ids = set.ids();
                let victim = ids[(state as usize / 2) % ids.len()];
                let _ = set.remove(victim);
            }
            assert!((MIN_OPTIONS..=MAX_OPTIONS).contains(&set.len()));
        }
    }

    #[test]
    fn test_removing_correct_candidate_clears_marker() {
        let mut set = OptionSet::new(1);
        let ids = set.ids();
        set.mark_correct(ids[2]).unwrap();
        set.remove(ids[2]).unwrap();
        assert_eq!(set.correct_id(), None);
        assert_eq!(set.correct_index(), None);
    }

    #[test]
    fn test_removing_other_candidate_keeps_marker_and_shifts_index() {
        let mut set = OptionSet::new(1);
        let ids = set.ids();
        set.mark_correct(ids[2]).unwrap();
        set.remove(ids[0]).unwrap();
        assert_eq!(set.correct_id(), Some(ids[2]));
        assert_eq!(set.correct_index(), Some(1));
    }

    #[test]
    fn test_set_text_keeps_identity_and_order() {
        let mut set = OptionSet::new(1);
        let ids = set.ids();
        set.mark_correct(ids[1]).unwrap();
        set.set_text(ids[1], "dog").unwrap();
        assert_eq!(set.ids(), ids);
        assert_eq!(set.get(ids[1]).unwrap().text, "dog");
        assert_eq!(set.correct_id(), Some(ids[1]));
    }

    #[test]
    fn test_ids_are_unique_across_editor_instances() {
        let a = OptionSet::new(1);
        let b = OptionSet::new(2);
        for id in a.ids() {
            assert!(!b.ids().contains(&id));
        }
    }

    #[test]
    fn test_ids_are_never_reused_after_removal() {
        let mut set = OptionSet::new(1);
        let removed = set.ids()[3];
        set.remove(removed).unwrap();
        let added = set.add().unwrap();
        assert_ne!(added, removed);
    }

    #[test]
    fn test_duplicate_text_is_allowed() {
        let mut set = OptionSet::new(1);
        let ids = set.ids();
        set.set_text(ids[0], "same").unwrap();
        set.set_text(ids[1], "same").unwrap();
        assert_eq!(set.get(ids[0]).unwrap().text, set.get(ids[1]).unwrap().text);
    }
}
