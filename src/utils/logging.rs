// 日志工具模块
//
// 封装 flexi_logger 的初始化和关闭操作，确保异步日志在退出前 flush

use crate::config::LogConfig;
use flexi_logger::{
    detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use parking_lot::{const_mutex, Mutex};

/// 全局日志句柄
///
/// flexi_logger 在一个进程内只能启动一次，之后的配置变更都通过这个句柄完成。
static LOGGER_HANDLE: Mutex<Option<LoggerHandle>> = const_mutex(None);

/// 初始化日志系统
///
/// 已经初始化过时只替换日志级别，不会重新创建日志文件。
///
/// # Examples
/// ```no_run
/// use graph_pgq::config::Config;
/// use graph_pgq::utils::logging;
///
/// let config = Config::default();
/// logging::init(&config.log).expect("日志初始化失败");
/// ```
pub fn init(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut guard = LOGGER_HANDLE.lock();
    if let Some(handle) = guard.as_mut() {
        handle.parse_new_spec(&config.level)?;
        log::debug!("日志级别已更新为 {}", config.level);
        return Ok(());
    }

    let handle = Logger::try_with_str(&config.level)?
        .log_to_file(
            FileSpec::default()
                .basename(&config.file)
                .directory(&config.dir),
        )
        .rotate(
            Criterion::Size(config.max_file_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .format(detailed_format)
        .duplicate_to_stderr(Duplicate::Warn)
        .write_mode(WriteMode::Async)
        .append()
        .start()?;
    *guard = Some(handle);
    drop(guard);

    log::info!("日志系统初始化完成: {}/{}", config.dir, config.file);
    Ok(())
}

/// 刷新并关闭日志系统
///
/// 阻塞到异步写线程处理完已提交的日志。
pub fn shutdown() {
    if let Some(handle) = LOGGER_HANDLE.lock().take() {
        handle.flush();
        handle.shutdown();
    }
}

pub fn is_initialized() -> bool {
    LOGGER_HANDLE.lock().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_logging_init_reconfigure_and_shutdown() {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        let mut config = LogConfig {
            dir: temp_dir.path().to_string_lossy().into_owned(),
            ..LogConfig::default()
        };

        let result = init(&config);
        assert!(result.is_ok(), "日志初始化失败: {:?}", result.err());
        assert!(is_initialized());
        log::info!("测试日志消息");

        config.level = "debug".to_string();
        let result = init(&config);
        assert!(result.is_ok(), "重复初始化应只更新级别: {:?}", result.err());
        log::debug!("调试日志消息");

        shutdown();
        assert!(!is_initialized());
    }

    #[test]
    #[serial]
    fn test_shutdown_without_init_is_noop() {
        shutdown();
        assert!(!is_initialized());
    }
}
