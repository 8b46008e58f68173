//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입

use std::fmt;

use serde::{Deserialize, Serialize};

/// 파싱된 로그 라인
///
/// 원격에서 가져온 로그 블롭의 한 줄을 나타냅니다.
/// 한 사이클 처리 후 버려지며, `raw`에서 계산한 fingerprint만
/// 중복 제거 상태에 남습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// 라인 앞부분에서 추출한 타임스탬프 토큰 (달력 시각으로 검증되지 않음)
    pub timestamp: String,
    /// 타임스탬프를 제외한 메시지 본문
    pub message: String,
    /// 원본 라인 전체 — fingerprint 계산의 유일한 입력
    pub raw: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.message)
    }
}

/// 원격 재기동 요청 결과
///
/// 재기동 API가 수락한 요청의 응답 정보를 담습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartOutcome {
    /// 원격이 돌려준 메시지
    pub message: String,
    /// 응답 HTTP 상태 코드
    pub status_code: u16,
    /// 비동기 재기동 작업 ID (원격이 제공하는 경우)
    pub operation_id: Option<String>,
}

impl fmt::Display for RestartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (status={}, operation={})",
            self.message,
            self.status_code,
            self.operation_id.as_deref().unwrap_or("N/A"),
        )
    }
}
