//! 草稿处理上下文
//!
//! 封装"我正在处理第几个草稿文件、投向哪个课程"这一信息

use std::fmt::Display;

/// 草稿处理上下文（仅用于日志显示）
#[derive(Debug, Clone)]
pub struct DraftCtx {
    /// 草稿文件名
    pub file_name: String,

    /// 文件序号（从1开始）
    pub index: usize,

    /// 本次运行的文件总数
    pub total: usize,

    /// 目标课程
    pub lesson_id: String,
}

impl DraftCtx {
    pub fn new(file_name: String, index: usize, total: usize, lesson_id: String) -> Self {
        Self {
            file_name,
            index,
            total,
            lesson_id,
        }
    }
}

impl Display for DraftCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[草稿 {}/{} {} 课程#{}]",
            self.index, self.total, self.file_name, self.lesson_id
        )
    }
}
