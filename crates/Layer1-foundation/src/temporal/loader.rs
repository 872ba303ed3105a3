//! Clock Loader - 환경 변수 기반 시계 선택
//!
//! 우선순위: `KEYSTONE_CLOCK` 환경 변수 → 명시적으로 지정된 시계 → `AccurateClock`

use super::clock::{AccurateClock, Clock, SystemClock};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 시계 구현을 지정하는 환경 변수
pub const CLOCK_ENV: &str = "KEYSTONE_CLOCK";

/// 시계 생성 함수
pub type ClockFactory = Arc<dyn Fn() -> Arc<dyn Clock> + Send + Sync>;

// ============================================================================
// ClockCatalog - 이름 → 시계 구현
// ============================================================================

/// 이름으로 선택 가능한 시계 구현 목록
#[derive(Clone)]
pub struct ClockCatalog {
    factories: BTreeMap<String, ClockFactory>,
}

impl ClockCatalog {
    /// 기본 구현(`accurate`, `system`)이 등록된 카탈로그
    pub fn with_builtins() -> Self {
        let mut catalog = Self {
            factories: BTreeMap::new(),
        };
        catalog.register("accurate", || Arc::new(AccurateClock) as Arc<dyn Clock>);
        catalog.register("system", || Arc::new(SystemClock) as Arc<dyn Clock>);
        catalog
    }

    /// 구현 등록 (같은 이름이면 교체)
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn Clock> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// 이름으로 시계 생성
    pub fn instantiate(&self, name: &str) -> Result<Arc<dyn Clock>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Failed to instantiate clock: {}, known clocks: [{}]",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    /// 등록된 이름들 (정렬)
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl Default for ClockCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for ClockCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockCatalog")
            .field("names", &self.names())
            .finish()
    }
}

// ============================================================================
// SystemEnvClockLoader
// ============================================================================

/// 환경 변수에 지정된 시계를 로드
#[derive(Debug, Clone, Default)]
pub struct SystemEnvClockLoader {
    catalog: ClockCatalog,
}

impl SystemEnvClockLoader {
    pub fn new(catalog: ClockCatalog) -> Self {
        Self { catalog }
    }

    /// 이미 읽어 둔 이름으로 로드 (`StartupConfig::clock`, 보통 `KEYSTONE_CLOCK`)
    ///
    /// 빈 문자열은 지정하지 않은 것으로 취급합니다.
    pub fn load_named(
        &self,
        configured: Option<&str>,
        fallback: Option<Arc<dyn Clock>>,
    ) -> Result<Arc<dyn Clock>> {
        match configured.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => {
                tracing::debug!("Using clock from {}: {}", CLOCK_ENV, name);
                self.catalog.instantiate(name)
            }
            None => Ok(fallback.unwrap_or_else(|| Arc::new(AccurateClock))),
        }
    }

    pub fn catalog(&self) -> &ClockCatalog {
        &self.catalog
    }
}
