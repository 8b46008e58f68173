//! 이벤트 — 재기동 감사 로그의 기본 단위
//!
//! 워처가 재기동을 시도할 때마다 [`RestartEvent`]를 발행하고,
//! 데몬의 감사 로거 태스크가 이를 수신하여 기록합니다.
//! [`EventMetadata`]는 발생 시각, 생성 모듈, 추적 ID를 담습니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 워처 모듈명
pub const MODULE_MONITOR: &str = "monitor";

/// 이벤트 메타데이터 — 발생 시각, 생성 모듈, 추적 ID
///
/// 추적 ID는 사이클마다 하나 생성되어, 같은 사이클의 로그와
/// 재기동 이벤트를 연결합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 이벤트 발생 시각
    pub timestamp: SystemTime,
    /// 이벤트를 생성한 모듈명
    pub source_module: String,
    /// 추적 ID — 같은 사이클의 이벤트를 연결합니다
    pub trace_id: String,
}

impl EventMetadata {
    /// 기존 trace_id를 사용하여 새 메타데이터를 생성합니다.
    pub fn new(source_module: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: trace_id.into(),
        }
    }

    /// 새로운 UUID v4 trace_id를 생성하여 메타데이터를 만듭니다.
    pub fn with_new_trace(source_module: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// 재기동 시도 이벤트
///
/// 성공/실패와 무관하게 재기동을 시도할 때마다 발행됩니다.
#[derive(Debug, Clone)]
pub struct RestartEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 재기동 대상 환경 ID
    pub environment_id: String,
    /// 재기동 요청 성공 여부
    pub success: bool,
    /// 상세 내용 (성공 시 원격 메시지, 실패 시 에러 메시지)
    pub detail: String,
    /// 비동기 재기동 작업 ID (성공 시, 원격이 제공하는 경우)
    pub operation_id: Option<String>,
}

impl RestartEvent {
    /// 기존 trace에 연결된 재기동 이벤트를 생성합니다.
    pub fn with_trace(
        environment_id: impl Into<String>,
        success: bool,
        detail: impl Into<String>,
        operation_id: Option<String>,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_MONITOR, trace_id),
            environment_id: environment_id.into(),
            success,
            detail: detail.into(),
            operation_id,
        }
    }
}

impl fmt::Display for RestartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "OK" } else { "FAILED" };
        write!(
            f,
            "RestartEvent[{}] environment={} status={} detail={}",
            &self.id[..8.min(self.id.len())],
            self.environment_id,
            status,
            self.detail,
        )
    }
}
