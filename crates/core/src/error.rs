//! 에러 타입 — 도메인별 에러 정의

/// Logvigil 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogvigilError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 원격 API 호출 에러
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// 모니터링 루프 에러
    #[error("monitor error: {0}")]
    Monitor(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 설정 파일 쓰기 실패
    #[error("failed to write config to {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

/// 원격 API 호출 에러
///
/// fetch/restart 요청이 실패한 모든 경우를 포괄합니다.
/// 네트워크 오류, 비정상 상태 코드, 응답 디코딩 실패를 상위에서
/// 구분하지 않으며, 사이클 단위로 복구됩니다.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// 요청 자체가 실패 (연결 불가, 타임아웃 등)
    #[error("request failed: {0}")]
    Request(String),

    /// 비정상 HTTP 상태 코드 응답
    #[error("unexpected status {status}: {reason}")]
    Status { status: u16, reason: String },

    /// 응답 본문 디코딩 실패
    #[error("failed to decode response: {0}")]
    Decode(String),
}
