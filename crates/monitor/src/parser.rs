//! 원시 로그 블롭 파서
//!
//! 원격에서 받은 개행 구분 텍스트를 [`LogLine`] 시퀀스로 변환합니다.
//! 입력이 어떤 형태든 실패하지 않는 최선 노력(best-effort) 파서입니다.
//!
//! # 라인 형식
//! nginx 스타일 에러 로그를 가정합니다:
//! ```text
//! 2025/05/26 08:10:32 [error] 1234#0: upstream timed out ...
//! ```
//! 앞의 두 공백 구분 토큰이 타임스탬프, 나머지가 메시지입니다.
//! 토큰이 3개 미만이면 라인 전체가 메시지가 되고 타임스탬프는
//! 현재 시각으로 합성됩니다 — 합성된 값은 실제 발생 시각이 아닙니다.

use chrono::Local;

use logvigil_core::types::LogLine;

/// 합성 타임스탬프 형식 — 감시 대상 로그의 타임스탬프와 같은 모양
const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// 원시 블롭을 파싱하여 로그 라인 시퀀스를 반환합니다.
///
/// 빈 라인과 공백만 있는 라인은 버려지고, 입력 순서가 유지됩니다.
/// 어떤 입력에도 패닉하거나 에러를 반환하지 않습니다.
pub fn parse_blob(blob: &str) -> Vec<LogLine> {
    blob.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

/// 한 라인을 파싱합니다.
fn parse_line(line: &str) -> LogLine {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() >= 3 {
        LogLine {
            timestamp: format!("{} {}", tokens[0], tokens[1]),
            message: tokens[2..].join(" "),
            raw: line.to_owned(),
        }
    } else {
        LogLine {
            timestamp: Local::now().format(FALLBACK_TIMESTAMP_FORMAT).to_string(),
            message: line.to_owned(),
            raw: line.to_owned(),
        }
    }
}
