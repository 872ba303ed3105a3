//! Extension Registry - provider → 익스텐션 기록과 초기화 스택

use super::installed::InstalledExtensions;
use super::traits::{provenance_of, Extension, ExtensionProvider};
use keystone_foundation::{Error, Provenance, Result, TypeKey, Typed};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 익스텐션 레지스트리
///
/// - provider 타입당 익스텐션은 최대 하나 (캐시)
/// - 구체 익스텐션 타입당 provider는 하나
/// - 현재 `initialize` 중인 provider 스택 (중첩 허용)
pub struct ExtensionRegistry {
    /// provider 타입 → 익스텐션
    applied: HashMap<TypeKey, Arc<dyn Extension>>,

    /// 구체 익스텐션 타입 → 생성한 provider
    owners: HashMap<TypeKey, Provenance>,

    installed: InstalledExtensions,

    stack: Vec<Arc<dyn ExtensionProvider>>,

    _single_owner: PhantomData<*const ()>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            applied: HashMap::new(),
            owners: HashMap::new(),
            installed: InstalledExtensions::default(),
            stack: Vec::new(),
            _single_owner: PhantomData,
        }
    }

    // ========================================================================
    // 초기화 스택
    // ========================================================================

    /// provider가 이미 만든 익스텐션
    pub fn cached(&self, provider_type: TypeKey) -> Option<Arc<dyn Extension>> {
        self.applied.get(&provider_type).cloned()
    }

    /// 초기화 시작 - 같은 provider가 이미 스택에 있으면 순환 의존
    pub(crate) fn push(&mut self, provider: Arc<dyn ExtensionProvider>) -> Result<()> {
        let provider_type = provider.provider_type();
        if self
            .stack
            .iter()
            .any(|active| active.provider_type() == provider_type)
        {
            let chain: Vec<&str> = self
                .stack
                .iter()
                .map(|p| p.provider_type().name())
                .chain(std::iter::once(provider_type.name()))
                .collect();
            return Err(Error::ProviderInstantiation {
                provider: provider_type.name().to_string(),
                reason: format!("Circular extension dependency: {}", chain.join(" -> ")),
            });
        }

        self.stack.push(provider);
        Ok(())
    }

    pub(crate) fn pop(&mut self) {
        self.stack.pop();
    }

    /// 현재 `initialize` 중인 가장 안쪽 provider
    pub fn currently_initializing(&self) -> Option<&Arc<dyn ExtensionProvider>> {
        self.stack.last()
    }

    pub(crate) fn current_provenance(&self) -> Option<Provenance> {
        self.currently_initializing()
            .map(|provider| provenance_of(provider.as_ref()))
    }

    /// 초기화 결과 기록
    pub(crate) fn record(
        &mut self,
        provider: &dyn ExtensionProvider,
        extension: Arc<dyn Extension>,
    ) -> Result<()> {
        let extension_type = extension.extension_type();
        let current = provenance_of(provider);

        if let Some(existing) = self.owners.get(&extension_type) {
            return Err(Error::ExtensionClash {
                extension_type: extension_type.name().to_string(),
                current_provider: current.to_string(),
                existing_provider: existing.to_string(),
            });
        }

        self.owners.insert(extension_type, current);
        self.applied
            .insert(provider.provider_type(), Arc::clone(&extension));
        self.installed.push(extension);
        Ok(())
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 요청 타입에 할당 가능한 첫 익스텐션 (설치 순서)
    pub fn get(&self, extension_type: TypeKey) -> Result<Arc<dyn Extension>> {
        self.installed.get(extension_type).cloned()
    }

    /// 구체 타입으로 조회
    pub fn get_as<E: Extension + Typed>(&self) -> Result<&E> {
        self.installed.get_as::<E>()
    }

    /// 익스텐션 이름들 (설치 순서)
    pub fn names(&self) -> Vec<String> {
        self.installed.names()
    }

    pub fn installed(&self) -> &InstalledExtensions {
        &self.installed
    }

    pub fn len(&self) -> usize {
        self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    pub(crate) fn into_installed(self) -> InstalledExtensions {
        self.installed
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack: Vec<_> = self
            .stack
            .iter()
            .map(|p| p.provider_type().name())
            .collect();
        f.debug_struct("ExtensionRegistry")
            .field("installed", &self.installed)
            .field("stack", &stack)
            .finish()
    }
}
