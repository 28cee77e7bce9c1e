/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 课程/题目接口根地址
    pub api_base_url: String,
    /// Bearer 凭证（由登录会话提供，这里只负责透传）
    pub auth_token: String,
    /// 草稿 TOML 文件存放目录
    pub draft_folder: String,
    /// 单次录音的硬上限（秒）
    pub max_recording_seconds: u64,
    /// 指定录音设备名称，空则使用系统默认输入设备
    pub input_device: Option<String>,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            auth_token: String::new(),
            draft_folder: "drafts".to_string(),
            max_recording_seconds: 8,
            input_device: None,
            request_timeout_secs: 30,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构建配置，解析失败的值回退到默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            api_base_url: lookup("API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.api_base_url),
            auth_token: lookup("AUTH_TOKEN").unwrap_or(default.auth_token),
            draft_folder: lookup("DRAFT_FOLDER").unwrap_or(default.draft_folder),
            max_recording_seconds: lookup("MAX_RECORDING_SECONDS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(default.max_recording_seconds),
            input_device: lookup("INPUT_DEVICE").filter(|v| !v.trim().is_empty()),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.request_timeout_secs),
            verbose_logging: lookup("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_overrides_and_falls_back() {
        let vars: HashMap<&str, &str> = [
            ("API_BASE_URL", "https://example.test/api/"),
            ("MAX_RECORDING_SECONDS", "not-a-number"),
            ("VERBOSE_LOGGING", "true"),
            ("INPUT_DEVICE", "  "),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "https://example.test/api");
        assert_eq!(config.max_recording_seconds, 8);
        assert!(config.verbose_logging);
        assert_eq!(config.input_device, None);
        assert_eq!(config.draft_folder, "drafts");
    }

    #[test]
    fn test_zero_recording_ceiling_is_rejected() {
        let config = Config::from_lookup(|k| (k == "MAX_RECORDING_SECONDS").then(|| "0".into()));
        assert_eq!(config.max_recording_seconds, 8);
    }
}
