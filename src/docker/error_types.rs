use std::fmt;

#[derive(Debug)]
pub enum DockerError {
    /// Docker 데몬 연결 실패
    ConnectionError {
        source: bollard::errors::Error,
        context: String,
    },
    /// docker 프로세스 실행 자체가 실패 (종료 코드 없음)
    InvocationError {
        program: String,
        source: std::io::Error,
        context: String,
    },
    /// Docker API 호출 실패
    ApiError {
        source: bollard::errors::Error,
        context: String,
    },
}

impl fmt::Display for DockerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerError::ConnectionError { source, context } =>
                write!(f, "Docker 데몬 연결 실패 ({}): {}", context, source),
            DockerError::InvocationError { program, source, context } =>
                write!(f, "{} 실행 실패 ({}): {}", program, context, source),
            DockerError::ApiError { source, context } =>
                write!(f, "Docker API 호출 실패 ({}): {}", context, source),
        }
    }
}

impl std::error::Error for DockerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DockerError::ConnectionError { source, .. } => Some(source),
            DockerError::InvocationError { source, .. } => Some(source),
            DockerError::ApiError { source, .. } => Some(source),
        }
    }
}

impl From<bollard::errors::Error> for DockerError {
    fn from(err: bollard::errors::Error) -> Self {
        DockerError::ConnectionError {
            source: err,
            context: "Docker 데몬 연결 실패".to_string(),
        }
    }
}
