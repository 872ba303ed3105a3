//! Component - 컴포넌트와 리소스 디스크립터
//!
//! - `walk.rs` - 리소스 그래프 순회 (id 기준 중복 제거, 순환 허용)
//! - `initializer.rs` - 타입별 배치 validate/ensure/prepare

mod initializer;
mod walk;

pub use initializer::ResourceInitializer;
pub use walk::{walk, WalkedResource};

use keystone_foundation::TypeKey;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// ResourceId
// ============================================================================

/// 리소스의 안정적인 식별자
///
/// 같은 id를 가진 디스크립터는 같은 리소스로 취급됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// ResourceDescriptor
// ============================================================================

/// 컴포넌트가 사용하는 리소스 선언
pub trait ResourceDescriptor: fmt::Debug + Send + Sync {
    /// 리소스 id
    fn id(&self) -> &ResourceId;

    /// 구체 리소스 타입
    fn resource_type(&self) -> TypeKey;

    /// 이 리소스가 의존하는 하위 리소스들
    ///
    /// 자기 자신이나 이미 방문한 리소스를 포함해도 됩니다.
    fn resources(&self) -> Vec<Arc<dyn ResourceDescriptor>> {
        Vec::new()
    }

    /// 서비스가 소유하여 생성해야 하는 리소스인지
    fn is_creatable(&self) -> bool {
        false
    }

    /// 다운캐스팅용
    fn as_any(&self) -> &dyn Any;
}

/// 그룹에서 특정 구체 타입의 디스크립터만 추출
pub fn resources_of<T: ResourceDescriptor + 'static>(
    group: &[Arc<dyn ResourceDescriptor>],
) -> Vec<&T> {
    group
        .iter()
        .filter_map(|resource| resource.as_any().downcast_ref::<T>())
        .collect()
}

// ============================================================================
// ComponentDescriptor
// ============================================================================

/// 컴포넌트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// 실행되는 서비스
    Service,

    /// 서비스들이 공유하는 API 묶음
    Aggregate,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Service => write!(f, "service"),
            ComponentKind::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// 서비스 또는 aggregate 선언
pub trait ComponentDescriptor: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ComponentKind {
        ComponentKind::Service
    }

    /// 최상위 리소스들
    fn resources(&self) -> Vec<Arc<dyn ResourceDescriptor>>;
}

// ============================================================================
// Components - 컴포넌트 목록
// ============================================================================

/// 빌드 대상 컴포넌트 목록 (입력 순서 유지)
#[derive(Debug, Clone, Default)]
pub struct Components {
    components: Vec<Arc<dyn ComponentDescriptor>>,
}

impl Components {
    pub fn new(components: Vec<Arc<dyn ComponentDescriptor>>) -> Self {
        Self { components }
    }

    pub fn push(&mut self, component: Arc<dyn ComponentDescriptor>) {
        self.components.push(component);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ComponentDescriptor>> {
        self.components.iter()
    }

    /// 서비스 컴포넌트만
    pub fn services(&self) -> impl Iterator<Item = &Arc<dyn ComponentDescriptor>> {
        self.of_kind(ComponentKind::Service)
    }

    /// aggregate 컴포넌트만
    pub fn aggregates(&self) -> impl Iterator<Item = &Arc<dyn ComponentDescriptor>> {
        self.of_kind(ComponentKind::Aggregate)
    }

    /// 컴포넌트 이름들 (입력 순서)
    pub fn names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Arc<dyn ComponentDescriptor>> {
        self.components.iter().filter(move |c| c.kind() == kind)
    }
}

impl From<Vec<Arc<dyn ComponentDescriptor>>> for Components {
    fn from(components: Vec<Arc<dyn ComponentDescriptor>>) -> Self {
        Self::new(components)
    }
}

impl From<Arc<dyn ComponentDescriptor>> for Components {
    fn from(component: Arc<dyn ComponentDescriptor>) -> Self {
        Self::new(vec![component])
    }
}
