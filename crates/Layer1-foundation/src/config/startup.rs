//! Startup Config - 부트스트랩 설정
//!
//! 환경 변수 또는 JSON 파일에서 로드하고, 나중 소스가 앞선 소스를 덮어씁니다.

use crate::temporal::CLOCK_ENV;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 로그 레벨을 지정하는 환경 변수
pub const LOG_ENV: &str = "KEYSTONE_LOG";

const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// StartupConfig
// ============================================================================

/// 컨텍스트 빌드 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupConfig {
    /// 시계 구현 이름 (`ClockCatalog`에 등록된 이름)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,

    /// 로그 레벨 (`info`, `debug` 등)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// 프로세스 전역 panic 핸들러 설치 여부
    #[serde(default = "default_true")]
    pub install_fault_handler: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            clock: None,
            log_level: None,
            install_fault_handler: true,
        }
    }
}

impl StartupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 프로세스 환경 변수에서 로드
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// 주어진 조회 함수로 로드 (테스트용)
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            clock: lookup(CLOCK_ENV).filter(|v| !v.trim().is_empty()),
            log_level: lookup(LOG_ENV).filter(|v| !v.trim().is_empty()),
            ..Self::default()
        }
    }

    /// JSON 파일에서 로드
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 다른 설정 병합 (`other`에 지정된 값 우선)
    pub fn merge(&mut self, other: StartupConfig) {
        if other.clock.is_some() {
            self.clock = other.clock;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if !other.install_fault_handler {
            self.install_fault_handler = false;
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_clock(mut self, name: impl Into<String>) -> Self {
        self.clock = Some(name.into());
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn without_fault_handler(mut self) -> Self {
        self.install_fault_handler = false;
        self
    }

    /// 실제로 적용할 로그 레벨
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
