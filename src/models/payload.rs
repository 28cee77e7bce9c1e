//! 提交载荷
//!
//! 只有通过校验的草稿才会生成载荷，这是唯一会离开客户端的数据结构。

use serde::Serialize;

use crate::models::audio::AudioArtifact;
use crate::models::draft::QuestionType;

/// 题型相关字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadBody {
    Ordering {
        words: Vec<String>,
        correct_sentence: String,
    },
    Listening {
        options: Vec<String>,
        correct_answer_index: usize,
        audio: AudioArtifact,
    },
    Choice {
        options: Vec<String>,
        correct_answer_index: usize,
    },
}

/// 规范化后的提交载荷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub prompt_text: String,
    pub body: PayloadBody,
}

/// multipart 中 `data` 部分的 JSON 结构
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetadata<'a> {
    pub lesson_id: &'a str,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub prompt_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_sentence: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer_index: Option<usize>,
}

impl SubmissionPayload {
    pub fn question_type(&self) -> QuestionType {
        match self.body {
            PayloadBody::Ordering { .. } => QuestionType::SentenceBuilding,
            PayloadBody::Listening { .. } => QuestionType::Listening,
            PayloadBody::Choice { .. } => QuestionType::MultipleChoice,
        }
    }

    /// 需要单独作为二进制部分上传的音频
    pub fn audio(&self) -> Option<&AudioArtifact> {
        match &self.body {
            PayloadBody::Listening { audio, .. } => Some(audio),
            _ => None,
        }
    }

    /// 构建 `data` 部分，音频不在其中
    pub fn metadata<'a>(&'a self, lesson_id: &'a str) -> QuestionMetadata<'a> {
        let mut meta = QuestionMetadata {
            lesson_id,
            question_type: self.question_type(),
            prompt_text: &self.prompt_text,
            words: None,
            correct_sentence: None,
            options: None,
            correct_answer_index: None,
        };
        match &self.body {
            PayloadBody::Ordering {
                words,
                correct_sentence,
            } => {
                meta.words = Some(words.as_slice());
                meta.correct_sentence = Some(correct_sentence.as_str());
            }
            PayloadBody::Listening {
                options,
                correct_answer_index,
                ..
            }
            | PayloadBody::Choice {
                options,
                correct_answer_index,
            } => {
                meta.options = Some(options.as_slice());
                meta.correct_answer_index = Some(*correct_answer_index);
            }
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio::CaptureFormat;
    use serde_json::json;

    #[test]
    fn test_ordering_metadata_shape() {
        let payload = SubmissionPayload {
            prompt_text: "Saya suka nasi".to_string(),
            body: PayloadBody::Ordering {
                words: vec!["I".into(), "like".into(), "rice".into()],
                correct_sentence: "I like rice".to_string(),
            },
        };
        let value = serde_json::to_value(payload.metadata("les_01")).unwrap();
        assert_eq!(
            value,
            json!({
                "lessonId": "les_01",
                "type": "SENTENCE_BUILDING",
                "promptText": "Saya suka nasi",
                "words": ["I", "like", "rice"],
                "correctSentence": "I like rice"
            })
        );
        assert!(payload.audio().is_none());
    }

    #[test]
    fn test_listening_metadata_excludes_audio() {
        let audio = AudioArtifact::encode_pcm16(CaptureFormat::default(), &[0, 1, 2]).unwrap();
        let payload = SubmissionPayload {
            prompt_text: "Listen".to_string(),
            body: PayloadBody::Listening {
                options: vec!["cat".into(), "dog".into()],
                correct_answer_index: 1,
                audio,
            },
        };
        let value = serde_json::to_value(payload.metadata("7")).unwrap();
        assert_eq!(
            value,
            json!({
                "lessonId": "7",
                "type": "LISTENING",
                "promptText": "Listen",
                "options": ["cat", "dog"],
                "correctAnswerIndex": 1
            })
        );
        assert!(payload.audio().is_some());
    }
}
