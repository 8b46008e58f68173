//! 모니터 에러 타입
//!
//! [`MonitorError`]는 모니터링 파이프라인 내부에서 발생하는 모든 에러를
//! 표현합니다. `From<MonitorError> for LogvigilError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logvigil_core::error::{LogvigilError, TransportError};

/// 모니터링 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// 원격 호출 실패 — 사이클 단위 복구 대상
    ///
    /// fetch가 이 에러로 끝나면 해당 사이클은 상태 변경 없이 종료되고,
    /// 같은 라인들이 다음 사이클에서 다시 고려됩니다.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 이벤트 채널 에러
    #[error("channel error: {0}")]
    Channel(String),
}

impl From<MonitorError> for LogvigilError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::Transport(e) => LogvigilError::Transport(e),
            other => LogvigilError::Monitor(other.to_string()),
        }
    }
}
