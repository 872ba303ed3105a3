//! Extension traits - 익스텐션과 provider 인터페이스

use crate::api::ServiceApi;
use keystone_foundation::{Provenance, Result, TypeKey};
use std::any::Any;
use std::sync::Arc;

// ============================================================================
// Extension
// ============================================================================

/// 빌드가 끝난 서비스 컨텍스트에 설치되는 익스텐션
pub trait Extension: Any + Send + Sync {
    /// 표시 이름
    fn name(&self) -> &str;

    /// 구체 익스텐션 타입
    fn extension_type(&self) -> TypeKey;

    /// 다운캐스팅용
    fn as_any(&self) -> &dyn Any;

    /// 컨텍스트 종료 시 호출
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// ExtensionProvider
// ============================================================================

/// 익스텐션을 만드는 provider
///
/// `initialize` 안에서 `api.model_mut()`으로 리소스 핸들러를 등록하고, 옵션을 조회하고,
/// `api.ensure_extension_of(..)`로 다른 익스텐션에 의존할 수 있습니다.
///
/// `initialize`에서 panic이 발생하면 빌드 전체가 중단됩니다.
pub trait ExtensionProvider: Send + Sync {
    /// provider 타입 (캐싱 키)
    fn provider_type(&self) -> TypeKey;

    /// 진단용 코드 위치 (`module_path!()` 등)
    fn location(&self) -> Option<&'static str> {
        None
    }

    /// 익스텐션 생성
    ///
    /// `Ok(None)`은 계약 위반으로 빌드를 실패시킵니다.
    fn initialize(&self, api: &mut ServiceApi) -> Result<Option<Arc<dyn Extension>>>;
}

/// provider의 진단용 출처
pub fn provenance_of(provider: &dyn ExtensionProvider) -> Provenance {
    let provenance = Provenance::new(provider.provider_type().name());
    match provider.location() {
        Some(location) => provenance.with_location(location),
        None => provenance,
    }
}

/// 익스텐션을 구체 타입으로 다운캐스팅
pub fn downcast<E: Extension>(extension: &Arc<dyn Extension>) -> Result<&E> {
    extension.as_any().downcast_ref::<E>().ok_or_else(|| {
        keystone_foundation::Error::UnsupportedOperation(format!(
            "Extension {} is not a {}",
            extension.name(),
            std::any::type_name::<E>()
        ))
    })
}
