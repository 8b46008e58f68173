//! 폴링 워처 -- 주기 판정, 사이클 실행, 취소 처리의 전체 흐름 관리
//!
//! [`LogWatcher`]는 단일 협조적 루프로 전체 사이클을 순차 실행합니다.
//! 사이클이 겹치는 일은 구조적으로 불가능합니다 — 잠금이 아니라
//! 루프가 하나뿐이라는 설계로 보장됩니다.
//!
//! # 사이클 흐름
//! ```text
//! fetch -> parse -> filter_unseen -> trigger scan -> restart gate -> absorb -> trim
//! ```
//!
//! # 주기와 취소
//! 사이클은 시작 시각 기준으로 주기를 측정합니다. 루프는 주기 전체를
//! 자는 대신 짧은 슬라이스 단위로 자면서 취소를 확인하므로, 취소 지연은
//! 슬라이스에 의해 제한됩니다.
//!
//! # 실패 처리
//! fetch 실패(transport)는 상태 변경 없이 사이클을 끝내고 다음 주기를
//! 기다립니다. 그 밖의 사이클 실패는 기록 후 쿨다운을 거쳐 재개합니다.

use std::sync::Arc;

use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use logvigil_core::event::RestartEvent;
use logvigil_core::metrics as m;

use crate::config::WatcherConfig;
use crate::dedup::SeenLines;
use crate::error::MonitorError;
use crate::gateway::EnvironmentClient;
use crate::parser;
use crate::remediation::RestartGate;
use crate::trigger::TriggerMatcher;

/// 빌더가 내부 이벤트 채널을 만들 때 사용하는 기본 용량
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// 한 사이클의 처리 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// 파싱된 라인 수
    pub fetched: usize,
    /// 처음 관측된 라인 수
    pub unseen: usize,
    /// 트리거에 매칭된 미관측 라인 수
    pub trigger_hits: usize,
    /// 이번 사이클에 재기동을 시도했는지 여부
    pub restart_attempted: bool,
    /// 용량 트림으로 제거된 fingerprint 수
    pub evicted: usize,
}

/// 로그 워처
///
/// 모든 가변 상태(중복 제거 집합, 마지막 체크 시각)를 단독으로
/// 소유합니다. `run`으로 루프를 시작하면 소유권이 루프로 넘어갑니다.
pub struct LogWatcher<C: EnvironmentClient> {
    /// 워처 설정
    config: WatcherConfig,
    /// 원격 클라이언트 (공유)
    client: Arc<C>,
    /// 관측한 라인의 fingerprint 집합
    seen: SeenLines,
    /// 트리거 매처
    matcher: TriggerMatcher,
    /// 재기동 게이트
    gate: RestartGate<C>,
    /// 마지막 사이클 시작 시각
    last_check: Option<Instant>,
    /// 완료된 사이클 수 (실패 포함 안 함)
    cycles_completed: u64,
    /// transport 실패로 끝난 사이클 수
    transport_errors: u64,
}

impl<C: EnvironmentClient> LogWatcher<C> {
    /// 새 사이클이 필요한 시점인지 확인합니다.
    ///
    /// 이전 체크가 없으면 즉시 필요로 판정합니다.
    pub fn needs_check(&self) -> bool {
        match self.last_check {
            Some(last) => last.elapsed() >= self.config.check_interval(),
            None => true,
        }
    }

    /// 한 사이클을 실행합니다.
    ///
    /// 사이클 시작 시각은 결과와 무관하게 기록됩니다 — 주기는
    /// 완료가 아니라 시작 시각 사이의 간격을 측정합니다.
    /// fetch가 실패하면 중복 제거 상태는 변경되지 않고, 같은 라인들이
    /// 다음 사이클에서 다시 고려됩니다.
    pub async fn run_cycle(&mut self) -> Result<CycleSummary, MonitorError> {
        self.last_check = Some(Instant::now());
        let trace_id = uuid::Uuid::new_v4().to_string();

        let fetched = self
            .client
            .fetch_logs(
                &self.config.environment_id,
                &self.config.log_file_name,
                self.config.tail_lines,
            )
            .await;
        let blob = match fetched {
            Ok(blob) => blob,
            Err(e) => {
                self.transport_errors += 1;
                counter!(m::MONITOR_TRANSPORT_ERRORS_TOTAL).increment(1);
                return Err(e.into());
            }
        };

        let lines = parser::parse_blob(&blob);
        let unseen = self.seen.filter_unseen(&lines);
        let hits = self.matcher.scan(&unseen);

        for hit in &hits {
            info!(trace_id = %trace_id, timestamp = %hit.timestamp, message = %hit.message, "trigger line observed");
        }

        let restart_attempted = self
            .gate
            .evaluate(&self.config.environment_id, hits.len(), &trace_id)
            .await;

        // 트리거 결과와 무관하게 이번 사이클의 모든 라인을 흡수
        self.seen.absorb(&lines);
        let evicted = self.seen.enforce_capacity();

        self.cycles_completed += 1;
        counter!(m::MONITOR_CYCLES_TOTAL).increment(1);
        counter!(m::MONITOR_LINES_FETCHED_TOTAL).increment(lines.len() as u64);
        counter!(m::MONITOR_LINES_UNSEEN_TOTAL).increment(unseen.len() as u64);
        counter!(m::MONITOR_TRIGGER_HITS_TOTAL).increment(hits.len() as u64);
        #[allow(clippy::cast_precision_loss)]
        gauge!(m::MONITOR_SEEN_SET_SIZE).set(self.seen.len() as f64);

        let summary = CycleSummary {
            fetched: lines.len(),
            unseen: unseen.len(),
            trigger_hits: hits.len(),
            restart_attempted,
            evicted,
        };
        debug!(
            trace_id = %trace_id,
            fetched = summary.fetched,
            unseen = summary.unseen,
            trigger_hits = summary.trigger_hits,
            restart_attempted = summary.restart_attempted,
            "check cycle completed"
        );
        Ok(summary)
    }

    /// 워처 루프를 시작합니다.
    ///
    /// 취소될 때까지 실행됩니다. `tokio::spawn`으로 별도 태스크에서
    /// 호출하세요. 진행 중인 사이클은 취소로 중단되지 않고 스스로
    /// 끝나며, 이후 새 사이클이 시작되지 않습니다.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            environment_id = %self.config.environment_id,
            log_file = %self.config.log_file_name,
            interval_minutes = self.config.check_interval_minutes,
            trigger = %self.matcher.needle(),
            "log watcher started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            if self.needs_check() {
                match self.run_cycle().await {
                    Ok(summary) => {
                        if summary.unseen > 0 {
                            info!(
                                unseen = summary.unseen,
                                trigger_hits = summary.trigger_hits,
                                restart_attempted = summary.restart_attempted,
                                "new log lines processed"
                            );
                        }
                    }
                    Err(MonitorError::Transport(e)) => {
                        // 상태는 변경되지 않았고 다음 주기에 같은 라인을 다시 고려함
                        warn!(error = %e, "log fetch failed, cycle skipped");
                    }
                    Err(e) => {
                        error!(error = %e, "check cycle failed unexpectedly, backing off");
                        tokio::select! {
                            _ = tokio::time::sleep(self.config.error_cooldown()) => {}
                            _ = cancel.cancelled() => break,
                        }
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_slice()) => {}
                _ = cancel.cancelled() => break,
            }
        }

        info!(
            cycles = self.cycles_completed,
            transport_errors = self.transport_errors,
            restarts = self.gate.restarts_succeeded(),
            "log watcher stopped"
        );
    }

    /// 완료된 사이클 수를 반환합니다.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// transport 실패로 끝난 사이클 수를 반환합니다.
    pub fn transport_errors(&self) -> u64 {
        self.transport_errors
    }

    /// 현재 중복 제거 집합 크기를 반환합니다.
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// 성공한 재기동 요청 수를 반환합니다.
    pub fn restarts_succeeded(&self) -> u64 {
        self.gate.restarts_succeeded()
    }

    /// 실패한 재기동 요청 수를 반환합니다.
    pub fn restarts_failed(&self) -> u64 {
        self.gate.restarts_failed()
    }
}

/// 로그 워처 빌더
///
/// 워처를 구성하고 재기동 감사 이벤트 채널을 생성합니다.
pub struct LogWatcherBuilder<C: EnvironmentClient> {
    config: WatcherConfig,
    client: Option<Arc<C>>,
    event_tx: Option<mpsc::Sender<RestartEvent>>,
    event_channel_capacity: usize,
}

impl<C: EnvironmentClient> LogWatcherBuilder<C> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: WatcherConfig::default(),
            client: None,
            event_tx: None,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }

    /// 워처 설정을 지정합니다.
    pub fn config(mut self, config: WatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// 원격 클라이언트를 설정합니다.
    pub fn client(mut self, client: Arc<C>) -> Self {
        self.client = Some(client);
        self
    }

    /// 외부 이벤트 전송 채널을 설정합니다.
    ///
    /// 설정하지 않으면 빌더가 새 채널을 생성합니다.
    pub fn event_sender(mut self, tx: mpsc::Sender<RestartEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// 이벤트 채널 용량을 설정합니다 (외부 채널 미사용 시).
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// 워처를 빌드합니다.
    ///
    /// # Returns
    /// - `LogWatcher`: 워처 인스턴스
    /// - `Option<mpsc::Receiver<RestartEvent>>`: 감사 이벤트 수신 채널
    ///   (외부 event_sender를 설정한 경우 None)
    pub fn build(
        self,
    ) -> Result<(LogWatcher<C>, Option<mpsc::Receiver<RestartEvent>>), MonitorError> {
        self.config.validate()?;

        let client = self.client.ok_or_else(|| MonitorError::Config {
            field: "client".to_owned(),
            reason: "remote client must be provided".to_owned(),
        })?;

        let (event_tx, event_rx) = if let Some(tx) = self.event_tx {
            (tx, None)
        } else {
            let (tx, rx) = mpsc::channel(self.event_channel_capacity);
            (tx, Some(rx))
        };

        let seen = SeenLines::new(self.config.seen_high_watermark, self.config.seen_trim_to);
        let matcher = TriggerMatcher::new(self.config.trigger_string.clone());
        let gate = RestartGate::new(Arc::clone(&client), event_tx);

        let watcher = LogWatcher {
            config: self.config,
            client,
            seen,
            matcher,
            gate,
            last_check: None,
            cycles_completed: 0,
            transport_errors: 0,
        };

        Ok((watcher, event_rx))
    }
}

impl<C: EnvironmentClient> Default for LogWatcherBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
