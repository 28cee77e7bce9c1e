use anyhow::Result;
use lesson_question_author::utils::logging;
use lesson_question_author::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    #[cfg(feature = "microphone")]
    let input = {
        use lesson_question_author::infrastructure::MicrophoneInput;
        tracing::debug!("可用输入设备: {:?}", MicrophoneInput::list_devices());
        MicrophoneInput::new(config.input_device.clone())
    };
    #[cfg(not(feature = "microphone"))]
    let input = {
        if config.input_device.is_some() {
            tracing::warn!("⚠️ 未启用 microphone 特性，INPUT_DEVICE 被忽略");
        }
        lesson_question_author::UnavailableInput
    };

    // 初始化并运行应用
    let stats = App::initialize(config, input)?.run().await?;
    if stats.failed > 0 {
        tracing::warn!("⚠️ 有 {} 个草稿未能提交", stats.failed);
    }

    Ok(())
}
