//! Service Context - 빌드 결과

use crate::extension::{Extension, InstalledExtensions};
use keystone_foundation::{Clock, Result, TypeKey, Typed};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// 초기화가 끝난 서비스 컨텍스트
///
/// 빌드 이후에는 변경되지 않으며 어느 스레드에서든 사용할 수 있습니다.
pub struct ServiceContext {
    clock: Arc<dyn Clock>,
    extensions: InstalledExtensions,
    closed: AtomicBool,
}

impl ServiceContext {
    pub(crate) fn new(clock: Arc<dyn Clock>, extensions: InstalledExtensions) -> Self {
        Self {
            clock,
            extensions,
            closed: AtomicBool::new(false),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// 현재 시각 (바인딩된 시계 기준)
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn extensions(&self) -> &InstalledExtensions {
        &self.extensions
    }

    /// 요청 타입에 할당 가능한 첫 익스텐션
    pub fn extension_of(&self, extension_type: TypeKey) -> Result<&Arc<dyn Extension>> {
        self.extensions.get(extension_type)
    }

    /// 구체 타입으로 익스텐션 조회
    pub fn extension<E: Extension + Typed>(&self) -> Result<&E> {
        self.extensions.get_as::<E>()
    }

    /// 익스텐션들을 설치 역순으로 닫음 (두 번째 호출부터는 무시)
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("Closing {} extension(s)", self.extensions.len());
        self.extensions.close()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("clock", &self.clock.name())
            .field("extensions", &self.extensions)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
