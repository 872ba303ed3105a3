//! keystone-core: 익스텐션 레지스트리와 시작 오케스트레이터
//!
//! Layer2 - 서비스 부트스트랩 레이어
//!
//! # 주요 모듈
//!
//! - `component`: 컴포넌트/리소스 디스크립터, 리소스 그래프 순회와 초기화
//! - `model`: 리소스 타입 → 핸들러 (ResourceModel)
//! - `option`: 익스텐션 옵션과 미사용 옵션 추적
//! - `extension`: Extension / ExtensionProvider, 초기화 스택
//! - `api`: provider에 제공되는 프레임워크 API (ServiceApi)
//! - `context`: 시작 프로토콜 (ContextBuilder)과 결과 (ServiceContext)
//!
//! # 사용 예시
//!
//! ```ignore
//! use keystone_core::{context, ContextBuilder};
//!
//! // 기본 설정으로 빌드
//! let ctx = context(components, vec![Arc::new(KafkaProvider)])?;
//!
//! // 옵션과 시계를 지정하여 빌드
//! let ctx = ContextBuilder::new(components, providers)
//!     .with_option(KafkaOptions::default())
//!     .with_clock(Arc::new(FixedClock::new(start)))
//!     .build()?;
//! ```

pub mod api;
pub mod component;
pub mod context;
pub mod extension;
pub mod model;
pub mod option;

// Re-exports: API
pub use api::ServiceApi;

// Re-exports: Component
pub use component::{
    resources_of, walk, ComponentDescriptor, ComponentKind, Components, ResourceDescriptor,
    ResourceId, ResourceInitializer, WalkedResource,
};

// Re-exports: Context
pub use context::{ContextBuilder, ServiceContext};

// Re-exports: Extension
pub use extension::{
    downcast, provenance_of, Extension, ExtensionProvider, ExtensionRegistry, InstalledExtensions,
};

// Re-exports: Model / Option
pub use model::{ResourceHandler, ResourceModel};
pub use option::{ExtensionOptions, OptionsRegistry};

// Re-exports: Foundation
pub use keystone_foundation::{declare_type, Error, Result, TypeKey, Typed};

use std::sync::Arc;

/// 기본 설정으로 서비스 컨텍스트 빌드
pub fn context(
    components: impl Into<Components>,
    providers: Vec<Arc<dyn ExtensionProvider>>,
) -> Result<ServiceContext> {
    ContextBuilder::new(components, providers).build()
}
