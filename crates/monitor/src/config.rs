//! 워처 설정
//!
//! [`WatcherConfig`]는 core의 [`LogvigilConfig`](logvigil_core::config::LogvigilConfig)를
//! 기반으로 워처 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logvigil_core::config::LogvigilConfig;
//! use logvigil_monitor::config::WatcherConfig;
//!
//! let core_config = LogvigilConfig::default();
//! let config = WatcherConfig::from_core(&core_config);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// 워처 설정
///
/// core 설정의 `[remote]`/`[monitor]` 섹션에서 파생되며,
/// 루프 동작에 관한 추가 설정을 포함합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// 감시 대상 환경 ID
    pub environment_id: String,
    /// 가져올 로그 파일 이름
    pub log_file_name: String,
    /// 한 번에 가져올 마지막 라인 수
    pub tail_lines: usize,
    /// 재기동 판정 대상 트리거 문자열 (대소문자 구분 부분 문자열)
    pub trigger_string: String,
    /// 체크 주기 (분) — 사이클 시작 시각 기준
    pub check_interval_minutes: u64,
    /// 중복 제거 집합 상한
    pub seen_high_watermark: usize,
    /// 트림 후 유지할 엔트리 수
    pub seen_trim_to: usize,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// 취소 확인 겸 대기 슬라이스 (밀리초)
    pub poll_slice_ms: u64,
    /// 예기치 못한 사이클 실패 후 대기 시간 (초)
    pub error_cooldown_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            environment_id: String::new(),
            log_file_name: "error".to_owned(),
            tail_lines: 200,
            trigger_string: "upstream timed out (110: Connection timed out)".to_owned(),
            check_interval_minutes: 5,
            seen_high_watermark: 1000,
            seen_trim_to: 500,
            poll_slice_ms: 1000,
            error_cooldown_secs: 30,
        }
    }
}

impl WatcherConfig {
    /// core 설정에서 워처 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &logvigil_core::config::LogvigilConfig) -> Self {
        Self {
            environment_id: core.remote.environment_id.clone(),
            log_file_name: core.remote.log_file_name.clone(),
            tail_lines: core.remote.tail_lines,
            trigger_string: core.monitor.trigger_string.clone(),
            check_interval_minutes: core.monitor.check_interval_minutes,
            seen_high_watermark: core.monitor.seen_high_watermark,
            seen_trim_to: core.monitor.seen_trim_to,
            ..Self::default()
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.environment_id.is_empty() {
            return Err(MonitorError::Config {
                field: "environment_id".to_owned(),
                reason: "environment id must not be empty".to_owned(),
            });
        }
        if self.log_file_name.is_empty() {
            return Err(MonitorError::Config {
                field: "log_file_name".to_owned(),
                reason: "log file name must not be empty".to_owned(),
            });
        }
        if self.trigger_string.is_empty() {
            return Err(MonitorError::Config {
                field: "trigger_string".to_owned(),
                reason: "trigger string must not be empty".to_owned(),
            });
        }
        if self.check_interval_minutes == 0 {
            return Err(MonitorError::Config {
                field: "check_interval_minutes".to_owned(),
                reason: "check interval must be at least 1 minute".to_owned(),
            });
        }
        if self.tail_lines == 0 {
            return Err(MonitorError::Config {
                field: "tail_lines".to_owned(),
                reason: "tail lines must be at least 1".to_owned(),
            });
        }
        if self.seen_trim_to == 0 || self.seen_trim_to >= self.seen_high_watermark {
            return Err(MonitorError::Config {
                field: "seen_trim_to".to_owned(),
                reason: "must be at least 1 and below seen_high_watermark".to_owned(),
            });
        }
        if self.poll_slice_ms == 0 {
            return Err(MonitorError::Config {
                field: "poll_slice_ms".to_owned(),
                reason: "poll slice must be at least 1 ms".to_owned(),
            });
        }
        // 쿨다운은 일반 슬라이스보다 길어야 타이트한 실패 루프를 막습니다.
        if self.error_cooldown_secs * 1000 <= self.poll_slice_ms {
            return Err(MonitorError::Config {
                field: "error_cooldown_secs".to_owned(),
                reason: "error cooldown must be longer than the poll slice".to_owned(),
            });
        }
        Ok(())
    }

    /// 체크 주기를 반환합니다.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes * 60)
    }

    /// 대기 슬라이스를 반환합니다.
    pub fn poll_slice(&self) -> Duration {
        Duration::from_millis(self.poll_slice_ms)
    }

    /// 실패 후 쿨다운을 반환합니다.
    pub fn error_cooldown(&self) -> Duration {
        Duration::from_secs(self.error_cooldown_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> WatcherConfig {
        WatcherConfig {
            environment_id: "env-1".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_durations() {
        let config = WatcherConfig::default();
        assert_eq!(config.check_interval(), Duration::from_secs(300));
        assert_eq!(config.poll_slice(), Duration::from_millis(1000));
        assert_eq!(config.error_cooldown(), Duration::from_secs(30));
    }

    #[test]
    fn from_core_copies_sections() {
        let mut core = logvigil_core::config::LogvigilConfig::default();
        core.remote.environment_id = "env-9".to_owned();
        core.remote.log_file_name = "access".to_owned();
        core.monitor.check_interval_minutes = 2;

        let config = WatcherConfig::from_core(&core);
        assert_eq!(config.environment_id, "env-9");
        assert_eq!(config.log_file_name, "access");
        assert_eq!(config.check_interval_minutes, 2);
        // 확장 필드는 기본값
        assert_eq!(config.poll_slice_ms, 1000);
        assert_eq!(config.error_cooldown_secs, 30);
    }

    #[test]
    fn validate_accepts_valid_config() {
        valid_config().validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_environment_id() {
        let config = WatcherConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("environment_id"));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = WatcherConfig {
            check_interval_minutes: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_trim_at_watermark() {
        let config = WatcherConfig {
            seen_trim_to: 1000,
            seen_high_watermark: 1000,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_cooldown_not_longer_than_slice() {
        let config = WatcherConfig {
            poll_slice_ms: 30_000,
            error_cooldown_secs: 30,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_trigger() {
        let config = WatcherConfig {
            trigger_string: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }
}
