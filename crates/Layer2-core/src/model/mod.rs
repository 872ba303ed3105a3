//! Resource Model - 리소스 타입 → 핸들러
//!
//! 익스텐션 provider의 `initialize` 호출 중에만 등록할 수 있고,
//! 각 등록은 그 시점에 초기화 중인 provider에게 귀속됩니다.

mod handler;

pub use handler::ResourceHandler;

use keystone_foundation::{Error, Provenance, Result, TypeKey, TypeRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 리소스 핸들러 레지스트리
pub struct ResourceModel {
    handlers: TypeRegistry<Arc<dyn ResourceHandler>>,

    /// 현재 초기화 중인 provider (오케스트레이션만 설정)
    initializing: Option<Provenance>,
}

impl ResourceModel {
    pub fn new() -> Self {
        Self {
            handlers: TypeRegistry::new(),
            initializing: None,
        }
    }

    pub(crate) fn set_initializing(&mut self, provider: Option<Provenance>) {
        self.initializing = provider;
    }

    /// 리소스 타입에 대한 핸들러 등록
    pub fn add_resource(
        &mut self,
        resource_type: TypeKey,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<&mut Self> {
        let provenance = self.initializing.clone().ok_or(Error::NotInitializing)?;

        if let Some(existing) = self.handlers.get_exact(resource_type) {
            let registrant = existing
                .provenance
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            return Err(Error::duplicate(
                "Resource handler",
                resource_type.name(),
                registrant,
            ));
        }

        debug!(
            "Registered resource handler for {} (provider: {})",
            resource_type, provenance
        );
        self.handlers.put(resource_type, handler, Some(provenance));
        Ok(self)
    }

    /// 타입 자신 또는 조상에 핸들러가 있는지
    ///
    /// 후보가 여럿이면 모호성 에러를 그대로 반환합니다.
    pub fn has_type(&self, resource_type: TypeKey) -> Result<bool> {
        Ok(self.handlers.get_or_ancestor(resource_type)?.is_some())
    }

    /// 타입을 담당하는 핸들러
    pub fn resource_handler(&self, resource_type: TypeKey) -> Result<Arc<dyn ResourceHandler>> {
        match self.handlers.get_or_ancestor(resource_type)? {
            Some(entry) => Ok(Arc::clone(&entry.value)),
            None => Err(Error::UnknownResourceType {
                type_name: resource_type.name().to_string(),
                known: self
                    .registered_types()
                    .iter()
                    .map(|t| t.name().to_string())
                    .collect(),
            }),
        }
    }

    /// 핸들러가 등록된 타입들 (이름순)
    pub fn registered_types(&self) -> Vec<TypeKey> {
        self.handlers.keys()
    }

    /// 타입을 등록한 provider
    pub fn registrant(&self, resource_type: TypeKey) -> Option<&Provenance> {
        self.handlers
            .get_exact(resource_type)
            .and_then(|entry| entry.provenance.as_ref())
    }
}

impl Default for ResourceModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResourceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceModel")
            .field("types", &self.registered_types())
            .field("initializing", &self.initializing)
            .finish()
    }
}
