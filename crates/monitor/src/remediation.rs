//! 재기동 게이트 -- 임계값 판정과 원격 재기동 실행
//!
//! [`RestartGate`]는 한 사이클에서 관측된 트리거 매칭 수를 임계값과
//! 비교하여 원격 재기동을 실행할지 결정합니다.
//!
//! # 정책
//! - 매칭 2건 이상: 사이클당 정확히 한 번 재기동 요청 (50건이어도 한 번)
//! - 매칭 1건: 무시 — 단발 사건으로 재기동하지 않는 의도적 anti-flap 정책
//! - 재기동 실패: 기록하고 이벤트로 보고하되 사이클을 중단하지 않으며,
//!   같은 사이클 안에서 재시도하지 않음

use std::sync::Arc;

use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use logvigil_core::event::RestartEvent;
use logvigil_core::metrics as m;

use crate::gateway::EnvironmentClient;

/// 재기동 발동에 필요한 최소 트리거 매칭 수
///
/// 정책 상수입니다. 노이즈가 많은 로그에서 재기동 폭풍을 막기 위한
/// 값이며, 파생되는 값이 아닙니다.
pub const RESTART_THRESHOLD: usize = 2;

/// 재기동 게이트
///
/// 워처 루프가 단독으로 소유하며, 사이클마다 한 번 호출됩니다.
pub struct RestartGate<C: EnvironmentClient> {
    /// 원격 클라이언트 (공유)
    client: Arc<C>,
    /// 재기동 감사 이벤트 전송 채널
    event_tx: mpsc::Sender<RestartEvent>,
    /// 성공한 재기동 요청 수
    restarts_succeeded: u64,
    /// 실패한 재기동 요청 수
    restarts_failed: u64,
}

impl<C: EnvironmentClient> RestartGate<C> {
    /// 새 게이트를 생성합니다.
    pub fn new(client: Arc<C>, event_tx: mpsc::Sender<RestartEvent>) -> Self {
        Self {
            client,
            event_tx,
            restarts_succeeded: 0,
            restarts_failed: 0,
        }
    }

    /// 매칭 수를 평가하고 필요하면 재기동을 요청합니다.
    ///
    /// 재기동을 시도했으면 (성공/실패 무관) `true`를 반환합니다.
    /// 원격 호출 실패는 여기서 흡수되므로 호출자의 사이클은 계속됩니다.
    pub async fn evaluate(&mut self, environment_id: &str, hits: usize, trace_id: &str) -> bool {
        if hits < RESTART_THRESHOLD {
            if hits == 1 {
                debug!(
                    trace_id,
                    "single trigger hit below threshold, not restarting"
                );
            }
            return false;
        }

        info!(
            trace_id,
            environment_id,
            hits,
            threshold = RESTART_THRESHOLD,
            "trigger threshold reached, requesting restart"
        );

        match self.client.restart_service(environment_id).await {
            Ok(outcome) => {
                self.restarts_succeeded += 1;
                counter!(m::MONITOR_RESTARTS_TOTAL, m::LABEL_RESULT => "success").increment(1);
                info!(trace_id, environment_id, outcome = %outcome, "restart accepted");
                self.emit_event(RestartEvent::with_trace(
                    environment_id,
                    true,
                    outcome.message.clone(),
                    outcome.operation_id.clone(),
                    trace_id,
                ))
                .await;
            }
            Err(e) => {
                self.restarts_failed += 1;
                counter!(m::MONITOR_RESTARTS_TOTAL, m::LABEL_RESULT => "failure").increment(1);
                error!(trace_id, environment_id, error = %e, "restart request failed");
                self.emit_event(RestartEvent::with_trace(
                    environment_id,
                    false,
                    e.to_string(),
                    None,
                    trace_id,
                ))
                .await;
            }
        }

        true
    }

    /// 감사 이벤트를 전송합니다. 수신 측이 사라져도 사이클은 계속됩니다.
    async fn emit_event(&self, event: RestartEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            warn!(error = %e, "restart event receiver dropped, audit event lost");
        }
    }

    /// 성공한 재기동 요청 수를 반환합니다.
    pub fn restarts_succeeded(&self) -> u64 {
        self.restarts_succeeded
    }

    /// 실패한 재기동 요청 수를 반환합니다.
    pub fn restarts_failed(&self) -> u64 {
        self.restarts_failed
    }
}
