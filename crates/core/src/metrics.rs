//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logvigil_`
//! - 모듈명: `monitor_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds` (시간), 없음 (gauge)

use metrics::{describe_counter, describe_gauge};

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Monitor 메트릭 ────────────────────────────────────────────────

/// Monitor: 완료된 체크 사이클 수 (counter)
pub const MONITOR_CYCLES_TOTAL: &str = "logvigil_monitor_cycles_total";

/// Monitor: 가져와 파싱한 로그 라인 수 (counter)
pub const MONITOR_LINES_FETCHED_TOTAL: &str = "logvigil_monitor_lines_fetched_total";

/// Monitor: 처음 관측된 로그 라인 수 (counter)
pub const MONITOR_LINES_UNSEEN_TOTAL: &str = "logvigil_monitor_lines_unseen_total";

/// Monitor: 트리거 문자열에 매칭된 라인 수 (counter)
pub const MONITOR_TRIGGER_HITS_TOTAL: &str = "logvigil_monitor_trigger_hits_total";

/// Monitor: 재기동 시도 수 (counter, label: result)
pub const MONITOR_RESTARTS_TOTAL: &str = "logvigil_monitor_restarts_total";

/// Monitor: 원격 호출 실패 수 (counter)
pub const MONITOR_TRANSPORT_ERRORS_TOTAL: &str = "logvigil_monitor_transport_errors_total";

/// Monitor: 현재 중복 제거 집합 크기 (gauge)
pub const MONITOR_SEEN_SET_SIZE: &str = "logvigil_monitor_seen_set_size";

// ─── Daemon 메트릭 ─────────────────────────────────────────────────

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "logvigil_daemon_build_info";

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "logvigil_daemon_uptime_seconds";

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    describe_counter!(MONITOR_CYCLES_TOTAL, "Completed check cycles");
    describe_counter!(MONITOR_LINES_FETCHED_TOTAL, "Log lines fetched and parsed");
    describe_counter!(
        MONITOR_LINES_UNSEEN_TOTAL,
        "Log lines observed for the first time"
    );
    describe_counter!(
        MONITOR_TRIGGER_HITS_TOTAL,
        "Log lines matching the trigger string"
    );
    describe_counter!(MONITOR_RESTARTS_TOTAL, "Restart attempts by result");
    describe_counter!(MONITOR_TRANSPORT_ERRORS_TOTAL, "Failed remote API calls");
    describe_gauge!(MONITOR_SEEN_SET_SIZE, "Current size of the seen-line set");
    describe_gauge!(DAEMON_BUILD_INFO, "Build info (always 1, version label)");
    describe_gauge!(DAEMON_UPTIME_SECONDS, "Daemon uptime in seconds");
}
