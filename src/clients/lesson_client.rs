//! 课程题目 API 客户端
//!
//! 封装提交题目（multipart）与读取课程题目列表两个调用
use std::time::Duration;

use futures::future::LocalBoxFuture;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SubmissionError;
use crate::models::audio::{AUDIO_FILE_NAME, AUDIO_MIME};
use crate::models::payload::SubmissionPayload;

/// multipart 中元数据部分的字段名
pub const DATA_PART: &str = "data";
/// multipart 中音频部分的字段名
pub const AUDIO_PART: &str = "audioFile";

const CLIENT_AGENT: &str = "lesson-question-author/0.1";

/// 题目提交边界
///
/// 编排层只依赖这一个操作；测试中用内存实现替换。
pub trait QuestionSubmitter {
    fn submit_question<'a>(
        &'a self,
        lesson_id: &'a str,
        payload: &'a SubmissionPayload,
    ) -> LocalBoxFuture<'a, Result<(), SubmissionError>>;
}

impl<S: QuestionSubmitter + ?Sized> QuestionSubmitter for &S {
    fn submit_question<'a>(
        &'a self,
        lesson_id: &'a str,
        payload: &'a SubmissionPayload,
    ) -> LocalBoxFuture<'a, Result<(), SubmissionError>> {
        (**self).submit_question(lesson_id, payload)
    }
}

/// 基于 reqwest 的课程 API 客户端
pub struct LessonApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl LessonApiClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|source| SubmissionError::RequestFailed {
                endpoint: config.api_base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 提交一道题目
    ///
    /// # 参数
    /// - `lesson_id`: 所属课程
    /// - `payload`: 校验通过的载荷；听力题的音频作为独立的二进制部分上传
    pub async fn add_question(
        &self,
        lesson_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<(), SubmissionError> {
        let endpoint = format!("{}/questions/question", self.base_url);
        let form = build_form(&endpoint, lesson_id, payload)?;

        debug!(
            "POST {} (lesson={}, type={})",
            endpoint,
            lesson_id,
            payload.question_type().code()
        );

        let res = self
            .client
            .post(&endpoint)
            .header(USER_AGENT, CLIENT_AGENT)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .multipart(form)
            .send()
            .await
            .map_err(|source| SubmissionError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            let message = extract_error_message(&body);
            warn!(
                "❌ 提交题目被拒绝: status={}, message={}",
                status,
                message.as_deref().unwrap_or("-")
            );
            return Err(SubmissionError::Rejected {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        info!("✓ 题目已提交到课程 {}", lesson_id);
        Ok(())
    }

    /// 获取课程下的全部题目
    ///
    /// # 返回
    /// 服务端返回的题目 JSON 列表
    pub async fn list_questions(&self, lesson_id: &str) -> Result<Vec<Value>, SubmissionError> {
        let endpoint = format!("{}/questions/{}", self.base_url, lesson_id);
        let request_failed = |source| SubmissionError::RequestFailed {
            endpoint: endpoint.clone(),
            source,
        };

        let res = self
            .client
            .get(&endpoint)
            .header(USER_AGENT, CLIENT_AGENT)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(request_failed)?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SubmissionError::Rejected {
                endpoint: endpoint.clone(),
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let questions: Vec<Value> = res.json().await.map_err(request_failed)?;
        debug!("课程 {} 共有 {} 道题目", lesson_id, questions.len());
        Ok(questions)
    }
}

impl QuestionSubmitter for LessonApiClient {
    fn submit_question<'a>(
        &'a self,
        lesson_id: &'a str,
        payload: &'a SubmissionPayload,
    ) -> LocalBoxFuture<'a, Result<(), SubmissionError>> {
        Box::pin(self.add_question(lesson_id, payload))
    }
}

/// 组装 multipart 表单：`data` 为 JSON 元数据，`audioFile` 为 WAV 音频（仅听力题）
fn build_form(
    endpoint: &str,
    lesson_id: &str,
    payload: &SubmissionPayload,
) -> Result<Form, SubmissionError> {
    let invalid_part = |source| SubmissionError::RequestFailed {
        endpoint: endpoint.to_string(),
        source,
    };

    let data = serde_json::to_string(&payload.metadata(lesson_id))?;
    let data_part = Part::text(data)
        .mime_str("application/json")
        .map_err(invalid_part)?;
    let mut form = Form::new().part(DATA_PART, data_part);

    if let Some(audio) = payload.audio() {
        let audio_part = Part::bytes(audio.bytes().to_vec())
            .file_name(AUDIO_FILE_NAME)
            .mime_str(AUDIO_MIME)
            .map_err(invalid_part)?;
        form = form.part(AUDIO_PART, audio_part);
    }
    Ok(form)
}

/// 从错误响应体中取出服务端的 `message` 字段
fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}
