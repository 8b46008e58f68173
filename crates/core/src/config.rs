//! 설정 관리 — logvigil.toml 파싱 및 런타임 설정
//!
//! [`LogvigilConfig`]는 데몬과 워처의 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGVIGIL_REMOTE_API_KEY=...` 형식)
//! 3. 설정 파일 (`logvigil.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logvigil_core::error::LogvigilError> {
//! use logvigil_core::config::LogvigilConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogvigilConfig::load("logvigil.toml").await?;
//!
//! // 파일이 없으면 기본 설정을 생성하고 저장
//! let (config, created) = LogvigilConfig::load_or_create("logvigil.toml").await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogvigilError};

/// Logvigil 통합 설정
///
/// `logvigil.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogvigilConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 원격 환경 API 설정
    #[serde(default)]
    pub remote: RemoteConfig,
    /// 모니터링 루프 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 메트릭 엔드포인트 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogvigilConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogvigilError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogvigilError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogvigilError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogvigilError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogvigilError> {
        toml::from_str(toml_str).map_err(|e| {
            LogvigilError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 설정을 TOML 파일로 저장합니다.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), LogvigilError> {
        let path = path.as_ref();
        let toml_str = toml::to_string_pretty(self).map_err(|e| {
            LogvigilError::Config(ConfigError::WriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        tokio::fs::write(path, toml_str).await.map_err(|e| {
            LogvigilError::Config(ConfigError::WriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(())
    }

    /// 설정 파일을 로드하되, 없으면 기본 설정을 생성해 저장합니다.
    ///
    /// 반환값의 두 번째 요소는 이번 호출에서 파일을 새로 만들었는지 여부입니다.
    /// 새로 만든 파일은 `api_key`와 `environment_id`가 비어 있으므로,
    /// 호출자는 [`validate_runtime`](Self::validate_runtime) 전에 사용자가
    /// 값을 채우도록 안내해야 합니다.
    pub async fn load_or_create(path: impl AsRef<Path>) -> Result<(Self, bool), LogvigilError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Ok(config) => Ok((config, false)),
            Err(LogvigilError::Config(ConfigError::FileNotFound { .. })) => {
                let config = Self::default();
                config.save(path).await?;
                Ok((config, true))
            }
            Err(e) => Err(e),
        }
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGVIGIL_{SECTION}_{FIELD}`
    /// 예: `LOGVIGIL_REMOTE_API_KEY=secret`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGVIGIL_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGVIGIL_GENERAL_LOG_FORMAT");

        // Remote
        override_string(&mut self.remote.api_base_url, "LOGVIGIL_REMOTE_API_BASE_URL");
        override_string(&mut self.remote.api_key, "LOGVIGIL_REMOTE_API_KEY");
        override_string(
            &mut self.remote.environment_id,
            "LOGVIGIL_REMOTE_ENVIRONMENT_ID",
        );
        override_string(
            &mut self.remote.log_file_name,
            "LOGVIGIL_REMOTE_LOG_FILE_NAME",
        );
        override_usize(&mut self.remote.tail_lines, "LOGVIGIL_REMOTE_TAIL_LINES");
        override_u64(
            &mut self.remote.request_timeout_secs,
            "LOGVIGIL_REMOTE_REQUEST_TIMEOUT_SECS",
        );

        // Monitor
        override_string(
            &mut self.monitor.trigger_string,
            "LOGVIGIL_MONITOR_TRIGGER_STRING",
        );
        override_u64(
            &mut self.monitor.check_interval_minutes,
            "LOGVIGIL_MONITOR_CHECK_INTERVAL_MINUTES",
        );
        override_usize(
            &mut self.monitor.seen_high_watermark,
            "LOGVIGIL_MONITOR_SEEN_HIGH_WATERMARK",
        );
        override_usize(
            &mut self.monitor.seen_trim_to,
            "LOGVIGIL_MONITOR_SEEN_TRIM_TO",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGVIGIL_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "LOGVIGIL_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "LOGVIGIL_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 기본 설정은 이 검증을 통과합니다. 비밀 값 등 실행에만 필요한
    /// 필드는 [`validate_runtime`](Self::validate_runtime)에서 검증합니다.
    pub fn validate(&self) -> Result<(), LogvigilError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.remote.tail_lines == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.tail_lines".to_owned(),
                reason: "must be at least 1".to_owned(),
            }
            .into());
        }

        if self.remote.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.request_timeout_secs".to_owned(),
                reason: "must be at least 1".to_owned(),
            }
            .into());
        }

        if self.monitor.trigger_string.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.trigger_string".to_owned(),
                reason: "trigger string must not be empty".to_owned(),
            }
            .into());
        }

        if self.monitor.check_interval_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.check_interval_minutes".to_owned(),
                reason: "must be at least 1".to_owned(),
            }
            .into());
        }

        if self.monitor.seen_trim_to == 0
            || self.monitor.seen_trim_to >= self.monitor.seen_high_watermark
        {
            return Err(ConfigError::InvalidValue {
                field: "monitor.seen_trim_to".to_owned(),
                reason: "must be at least 1 and below seen_high_watermark".to_owned(),
            }
            .into());
        }

        Ok(())
    }

    /// 실행 시점에만 필요한 필드를 검증합니다.
    ///
    /// 데몬 시작 시 호출합니다. 기본 설정 파일은 이 검증을 통과하지
    /// 못하므로, 사용자가 원격 접속 정보를 채워야 합니다.
    pub fn validate_runtime(&self) -> Result<(), LogvigilError> {
        if self.remote.api_base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote.api_base_url".to_owned(),
                reason: "api_base_url must be set".to_owned(),
            }
            .into());
        }
        if self.remote.api_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote.api_key".to_owned(),
                reason: "api_key must be set".to_owned(),
            }
            .into());
        }
        if self.remote.environment_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote.environment_id".to_owned(),
                reason: "environment_id must be set".to_owned(),
            }
            .into());
        }
        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 원격 환경 API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// API 베이스 URL (환경 컬렉션 엔드포인트)
    pub api_base_url: String,
    /// API 키 (비밀 — 환경변수 `LOGVIGIL_REMOTE_API_KEY` 권장)
    pub api_key: String,
    /// 감시 대상 환경 ID
    pub environment_id: String,
    /// 가져올 로그 파일 이름
    pub log_file_name: String,
    /// 한 번에 가져올 마지막 라인 수
    pub tail_lines: usize,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_key: String::new(),
            environment_id: String::new(),
            log_file_name: "error".to_owned(),
            tail_lines: 200,
            request_timeout_secs: 30,
        }
    }
}

/// 모니터링 루프 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 재기동 판정 대상 트리거 문자열 (대소문자 구분 부분 문자열)
    pub trigger_string: String,
    /// 체크 주기 (분)
    pub check_interval_minutes: u64,
    /// 중복 제거 집합 상한 — 초과 시 트림 발동
    pub seen_high_watermark: usize,
    /// 트림 후 유지할 엔트리 수
    pub seen_trim_to: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            trigger_string: "upstream timed out (110: Connection timed out)".to_owned(),
            check_interval_minutes: 5,
            seen_high_watermark: 1000,
            seen_trim_to: 500,
        }
    }
}

/// 메트릭 엔드포인트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 수신 주소
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9184,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = LogvigilConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.remote.log_file_name, "error");
        assert_eq!(config.remote.tail_lines, 200);
        assert_eq!(config.monitor.check_interval_minutes, 5);
        assert_eq!(config.monitor.seen_high_watermark, 1000);
        assert_eq!(config.monitor.seen_trim_to, 500);
        assert!(
            config
                .monitor
                .trigger_string
                .contains("upstream timed out")
        );
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = LogvigilConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn default_config_fails_runtime_validation() {
        // api_key/environment_id가 비어 있으므로 실행 검증은 실패해야 함
        let config = LogvigilConfig::default();
        let err = config.validate_runtime().unwrap_err();
        assert!(err.to_string().contains("api_base_url"));
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = LogvigilConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.remote.log_file_name, "error");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[remote]
environment_id = "env-prod-01"
"#;
        let config = LogvigilConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.remote.environment_id, "env-prod-01");
        assert_eq!(config.remote.tail_lines, 200);
    }

    #[test]
    fn from_str_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "pretty"

[remote]
api_base_url = "https://portal.example.net/api/environments"
api_key = "secret-key"
environment_id = "env-prod-01"
log_file_name = "access"
tail_lines = 500
request_timeout_secs = 10

[monitor]
trigger_string = "connection refused"
check_interval_minutes = 1
seen_high_watermark = 2000
seen_trim_to = 900

[metrics]
enabled = true
listen_addr = "0.0.0.0"
port = 9999
"#;
        let config = LogvigilConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.remote.log_file_name, "access");
        assert_eq!(config.remote.tail_lines, 500);
        assert_eq!(config.monitor.trigger_string, "connection refused");
        assert_eq!(config.monitor.seen_high_watermark, 2000);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9999);
        config.validate().unwrap();
        config.validate_runtime().unwrap();
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = LogvigilConfig::parse("invalid = [[[toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LogvigilError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = LogvigilConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = LogvigilConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = LogvigilConfig::default();
        config.monitor.check_interval_minutes = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("check_interval_minutes"));
    }

    #[test]
    fn validate_rejects_empty_trigger() {
        let mut config = LogvigilConfig::default();
        config.monitor.trigger_string = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("trigger_string"));
    }

    #[test]
    fn validate_rejects_trim_at_or_above_watermark() {
        let mut config = LogvigilConfig::default();
        config.monitor.seen_trim_to = config.monitor.seen_high_watermark;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("seen_trim_to"));
    }

    #[test]
    fn validate_rejects_zero_tail_lines() {
        let mut config = LogvigilConfig::default();
        config.remote.tail_lines = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tail_lines"));
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGVIGIL_STR", "overridden") };
        override_string(&mut val, "TEST_LOGVIGIL_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_LOGVIGIL_STR") };
    }

    #[test]
    fn env_override_u64_invalid_keeps_original() {
        let mut val = 5u64;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGVIGIL_U64_BAD", "not-a-number") };
        override_u64(&mut val, "TEST_LOGVIGIL_U64_BAD");
        assert_eq!(val, 5); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_LOGVIGIL_U64_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_LOGVIGIL_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = LogvigilConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = LogvigilConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.remote.log_file_name, parsed.remote.log_file_name);
        assert_eq!(
            config.monitor.trigger_string,
            parsed.monitor.trigger_string
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = LogvigilConfig::from_file("/nonexistent/path/logvigil.toml").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LogvigilError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logvigil.toml");

        let (config, created) = LogvigilConfig::load_or_create(&path).await.unwrap();
        assert!(created);
        assert!(path.exists());
        assert_eq!(config.monitor.check_interval_minutes, 5);

        // 두 번째 호출은 기존 파일을 읽음
        let (_config, created_again) = LogvigilConfig::load_or_create(&path).await.unwrap();
        assert!(!created_again);
    }

    #[tokio::test]
    async fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logvigil.toml");

        let mut config = LogvigilConfig::default();
        config.remote.environment_id = "env-42".to_owned();
        config.save(&path).await.unwrap();

        let loaded = LogvigilConfig::from_file(&path).await.unwrap();
        assert_eq!(loaded.remote.environment_id, "env-42");
    }
}
