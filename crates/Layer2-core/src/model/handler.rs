//! Resource Handler - 리소스 타입별 콜백

use crate::component::ResourceDescriptor;
use keystone_foundation::{Error, Result};
use std::sync::Arc;

/// 한 리소스 타입(과 그 자손)을 담당하는 핸들러
///
/// 각 메서드는 같은 구체 타입의 리소스 묶음을 한 번에 받습니다.
pub trait ResourceHandler: Send + Sync {
    /// 리소스 선언 검증
    fn validate(&self, resources: &[Arc<dyn ResourceDescriptor>]) -> Result<()>;

    /// 서비스가 소유한 리소스 생성 (`is_creatable()` 인 것만 전달됨)
    fn ensure(&self, _resources: &[Arc<dyn ResourceDescriptor>]) -> Result<()> {
        Err(Error::UnsupportedOperation(
            "Not a handler of owned resources".to_string(),
        ))
    }

    /// 사용 준비
    fn prepare(&self, resources: &[Arc<dyn ResourceDescriptor>]) -> Result<()>;
}
