use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

use crate::settings::logging::{LogFormat, LogOutput, LogSettings};

fn env_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.to_string().to_lowercase()))
}

/// 전역 로거를 초기화합니다.
///
/// 돌려받은 guard 는 프로그램이 끝날 때까지 살아 있어야 합니다.
pub fn init_logging(settings: &LogSettings) -> WorkerGuard {
    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "pkg_upgrade_check.log".into());
            tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
        }
    };

    let builder = fmt()
        .with_env_filter(env_filter(settings))
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let result = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if let Err(e) = result {
        eprintln!("로거 초기화 실패: {}", e);
    }

    guard
}
