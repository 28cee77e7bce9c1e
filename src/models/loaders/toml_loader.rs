use crate::error::{AppError, AppResult, FileError};
use crate::models::draft::QuestionType;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 草稿描述文件（TOML）
///
/// ```toml
/// lesson_id = "12"
/// type = "LISTENING"
/// prompt = "What animal do you hear?"
/// options = ["kucing", "anjing"]
/// correct_option = 1
/// audio_file = "audio/anjing.wav"   # 或 record = true 现场录音
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DraftFile {
    pub lesson_id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// 题干；排序题中是需要翻译/重组的原句
    #[serde(default)]
    pub prompt: String,
    /// 排序题：组成词
    #[serde(default)]
    pub words: Vec<String>,
    /// 排序题：正确的完整句子
    #[serde(default)]
    pub correct_sentence: String,
    /// 单选 / 听力：候选答案
    #[serde(default)]
    pub options: Vec<String>,
    /// 正确答案在 `options` 中的下标（从0开始）
    #[serde(default)]
    pub correct_option: Option<usize>,
    /// 听力：已有的 WAV 文件，相对路径以草稿文件所在目录为基准
    #[serde(default)]
    pub audio_file: Option<PathBuf>,
    /// 听力：现场录音
    #[serde(default)]
    pub record: bool,

    #[serde(skip)]
    pub file_path: PathBuf,
}

impl DraftFile {
    /// 日志中显示的文件名
    pub fn display_name(&self) -> String {
        self.file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// 音频文件的实际路径
    pub fn resolved_audio_path(&self) -> Option<PathBuf> {
        let audio = self.audio_file.as_ref()?;
        if audio.is_absolute() {
            return Some(audio.clone());
        }
        let base = self.file_path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(audio))
    }

    /// 文件层面的一致性检查；内容是否完整由提交时的校验决定
    fn check(&self) -> AppResult<()> {
        let name = self.file_path.display().to_string();
        if self.lesson_id.trim().is_empty() {
            return Err(AppError::invalid_draft(name, "lesson_id 不能为空"));
        }
        let wants_audio = self.audio_file.is_some() || self.record;
        match self.question_type {
            QuestionType::Listening if self.audio_file.is_some() && self.record => Err(
                AppError::invalid_draft(name, "audio_file 与 record 只能二选一"),
            ),
            QuestionType::Listening => Ok(()),
            _ if wants_audio => Err(AppError::invalid_draft(
                name,
                format!("{} 题型不需要音频", self.question_type.code()),
            )),
            _ => Ok(()),
        }
    }
}

/// 从 TOML 文件加载一个草稿
pub async fn load_draft_file(path: &Path) -> AppResult<DraftFile> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let mut draft: DraftFile =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;

    draft.file_path = path.to_path_buf();
    draft.check()?;
    Ok(draft)
}

/// 列出文件夹中的所有 TOML 草稿文件（按文件名排序）
pub async fn list_draft_files(folder_path: &str) -> AppResult<Vec<PathBuf>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            files.push(path);
        }
    }

    files.sort();
    if files.is_empty() {
        tracing::warn!("在文件夹 {} 中没有找到 TOML 草稿", folder_path);
    } else {
        tracing::info!("找到 {} 个草稿文件", files.len());
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_listening_draft_resolves_audio_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "listen.toml",
            r#"
lesson_id = "12"
type = "LISTENING"
prompt = "What animal do you hear?"
options = ["kucing", "anjing"]
correct_option = 1
audio_file = "audio/anjing.wav"
"#,
        );

        let draft = load_draft_file(&path).await.unwrap();
        assert_eq!(draft.question_type, QuestionType::Listening);
        assert_eq!(draft.options, vec!["kucing", "anjing"]);
        assert_eq!(draft.correct_option, Some(1));
        assert_eq!(draft.display_name(), "listen.toml");
        assert_eq!(
            draft.resolved_audio_path().unwrap(),
            dir.path().join("audio/anjing.wav")
        );
    }

    #[tokio::test]
    async fn test_ordering_draft_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "order.toml",
            r#"
lesson_id = "3"
type = "SENTENCE_BUILDING"
prompt = "I like rice"
words = ["Saya", "suka", "nasi"]
correct_sentence = "Saya suka nasi"
"#,
        );
        let draft = load_draft_file(&path).await.unwrap();
        assert!(draft.options.is_empty());
        assert!(!draft.record);
        assert!(draft.resolved_audio_path().is_none());
    }

    #[tokio::test]
    async fn test_rejects_audio_on_choice_and_ambiguous_listening() {
        let dir = tempfile::tempdir().unwrap();
        let choice = write(
            dir.path(),
            "choice.toml",
            "lesson_id = \"1\"\ntype = \"MULTIPLE_CHOICE\"\nrecord = true\n",
        );
        assert!(matches!(
            load_draft_file(&choice).await,
            Err(AppError::Config(_))
        ));

        let listening = write(
            dir.path(),
            "both.toml",
            "lesson_id = \"1\"\ntype = \"LISTENING\"\nrecord = true\naudio_file = \"a.wav\"\n",
        );
        assert!(matches!(
            load_draft_file(&listening).await,
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_type_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.toml", "lesson_id = \"1\"\ntype = \"ESSAY\"\n");
        assert!(matches!(
            load_draft_file(&path).await,
            Err(AppError::File(FileError::TomlParseFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_draft_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.toml", "");
        write(dir.path(), "a.toml", "");
        write(dir.path(), "notes.txt", "");

        let files = list_draft_files(dir.path().to_str().unwrap()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.toml", "b.toml"]);

        assert!(matches!(
            list_draft_files("/definitely/not/here").await,
            Err(AppError::File(FileError::DirectoryNotFound { .. }))
        ));
    }
}
