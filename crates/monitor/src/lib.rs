#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: 원시 로그 블롭 → [`LogLine`](logvigil_core::types::LogLine) 시퀀스
//! - [`dedup`]: 관측 라인 fingerprint 집합 및 용량 트림
//! - [`trigger`]: 트리거 문자열 부분 문자열 매칭
//! - [`remediation`]: 임계값 게이트와 재기동 실행
//! - [`gateway`]: 원격 환경 API 추상화 (trait + reqwest 구현)
//! - [`watcher`]: 폴링 루프 오케스트레이션
//! - [`config`]: 워처 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입

pub mod config;
pub mod dedup;
pub mod error;
pub mod gateway;
pub mod parser;
pub mod remediation;
pub mod trigger;
pub mod watcher;

// --- 주요 타입 re-export ---

// 워처
pub use watcher::{CycleSummary, LogWatcher, LogWatcherBuilder};

// 설정
pub use config::WatcherConfig;

// 에러
pub use error::MonitorError;

// 원격 클라이언트
pub use gateway::{EnvironmentClient, HttpEnvironmentClient};

// 파이프라인 구성 요소
pub use dedup::SeenLines;
pub use remediation::{RESTART_THRESHOLD, RestartGate};
pub use trigger::TriggerMatcher;
