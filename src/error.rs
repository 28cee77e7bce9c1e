use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 录音设备错误
    #[error("设备错误: {0}")]
    Device(#[from] DeviceError),
    /// 录音会话错误
    #[error("录音错误: {0}")]
    Recording(#[from] RecordingError),
    /// 草稿校验失败
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 提交失败
    #[error("提交错误: {0}")]
    Submission(#[from] SubmissionError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 录音设备错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// 无法独占获取音频输入设备（权限被拒、没有设备、设备被占用）
    #[error("音频输入设备不可用: {reason}")]
    DeviceUnavailable { reason: String },
}

impl DeviceError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        DeviceError::DeviceUnavailable {
            reason: reason.into(),
        }
    }
}

/// 录音会话错误
#[derive(Debug, Error)]
pub enum RecordingError {
    /// 把采集到的片段编码为 WAV 失败
    #[error("音频封装失败: {0}")]
    FinalizeFailed(#[from] hound::Error),
    /// 本次录音没有采集到任何样本
    #[error("本次录音没有采集到任何音频")]
    EmptyCapture,
}

/// 草稿校验失败
///
/// 每条规则对应一条固定的提示文案，直接展示给用户。
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a prompt text.")]
    MissingPrompt,
    #[error("Please fill in both the sentence and the correct full sentence.")]
    MissingSentence,
    #[error("Please provide between 2 and 8 component words.")]
    WordCountOutOfRange,
    #[error("Please fill in all word fields or remove empty ones.")]
    BlankWord,
    #[error("Please record a reference audio.")]
    MissingAudio,
    #[error("Please provide at least two answer options.")]
    TooFewOptions,
    #[error("Please select a correct answer.")]
    MissingCorrectAnswer,
    #[error("Please fill in all option fields or remove empty ones.")]
    BlankOption,
    #[error("Please select a lesson before submitting a question.")]
    NoLessonSelected,
}

/// 提交到题库接口失败
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非 2xx
    #[error("服务器拒绝 ({endpoint}): status={status}, message={message:?}")]
    Rejected {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// 元数据序列化失败
    #[error("JSON 序列化失败: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SubmissionError {
    /// 展示给用户的通用提示，细节只进日志
    pub fn user_message(&self) -> &'static str {
        "Question submission failed. Please try again."
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML 解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("不是有效的 WAV 文件 ({path}): {source}")]
    InvalidWav {
        path: String,
        #[source]
        source: hound::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 草稿文件内容与题型不符
    #[error("草稿 {file} 无效: {reason}")]
    InvalidDraft { file: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建草稿格式错误
    pub fn invalid_draft(file: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidDraft {
            file: file.into(),
            reason: reason.into(),
        })
    }

    /// 面向用户的提示文案
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Submission(e) => e.user_message().to_string(),
            AppError::Device(_) => {
                "Microphone is unavailable. Please check permissions and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
