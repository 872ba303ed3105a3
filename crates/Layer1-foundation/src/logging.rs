//! Logging - tracing 구독자 초기화

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 전역 tracing 구독자 설치
///
/// `RUST_LOG`가 있으면 우선하고, 없으면 `level`을 사용합니다.
/// 이미 설치된 구독자가 있으면 `false`를 반환합니다.
pub fn init_tracing(level: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .is_ok()
}
