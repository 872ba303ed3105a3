//! Installed Extensions - 설치 순서를 유지하는 익스텐션 목록

use super::traits::{downcast, Extension};
use keystone_foundation::{Error, Result, TypeKey, Typed};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// 초기화된 익스텐션들 (설치 순서)
#[derive(Clone, Default)]
pub struct InstalledExtensions {
    extensions: Vec<Arc<dyn Extension>>,
}

impl InstalledExtensions {
    pub(crate) fn push(&mut self, extension: Arc<dyn Extension>) {
        self.extensions.push(extension);
    }

    /// 요청 타입에 할당 가능한 첫 익스텐션
    pub fn get(&self, extension_type: TypeKey) -> Result<&Arc<dyn Extension>> {
        self.extensions
            .iter()
            .find(|ext| extension_type.is_assignable_from(ext.extension_type()))
            .ok_or_else(|| Error::UnknownExtension {
                type_name: extension_type.name().to_string(),
                installed: self.names(),
            })
    }

    /// 구체 타입으로 조회
    pub fn get_as<E: Extension + Typed>(&self) -> Result<&E> {
        downcast::<E>(self.get(E::type_key())?)
    }

    /// 익스텐션 이름들 (설치 순서)
    pub fn names(&self) -> Vec<String> {
        self.extensions.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Extension>> {
        self.extensions.iter()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// 설치 역순으로 모두 닫음
    ///
    /// 실패해도 나머지는 계속 닫고, 첫 번째 에러를 반환합니다.
    pub fn close(&self) -> Result<()> {
        let mut first_error = None;

        for extension in self.extensions.iter().rev() {
            if let Err(e) = extension.close() {
                warn!("Failed to close extension {}: {}", extension.name(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for InstalledExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
