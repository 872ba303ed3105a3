//! Type Registry - 타입 계층 인식 레지스트리

use super::type_key::TypeKey;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

// ============================================================================
// Provenance - 등록 출처
// ============================================================================

/// 항목을 등록한 provider 정보 (진단용)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// provider 타입 이름
    pub provider: String,

    /// 코드 위치 (모듈 경로 등)
    pub location: Option<String>,
}

impl Provenance {
    /// 새 출처 생성
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            location: None,
        }
    }

    /// 코드 위치 설정
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.provider, location),
            None => write!(f, "{}", self.provider),
        }
    }
}

// ============================================================================
// RegistryEntry - 레지스트리 항목
// ============================================================================

/// 레지스트리 항목 - 타입, 값, 출처를 함께 보관
#[derive(Debug, Clone)]
pub struct RegistryEntry<V> {
    /// 등록된 정확한 타입
    pub type_key: TypeKey,

    /// 실제 값
    pub value: V,

    /// 등록 시점에 활성화되어 있던 provider
    pub provenance: Option<Provenance>,
}

impl<V> RegistryEntry<V> {
    /// 진단 메시지용 설명
    pub fn describe(&self) -> String {
        match &self.provenance {
            Some(provenance) => format!("{} (registered by {})", self.type_key, provenance),
            None => self.type_key.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    /// 질의 타입의 조상 중 가장 구체적인 항목
    Ancestor,
    /// 질의 타입의 자손 중 가장 일반적인 항목
    Descendant,
}

// ============================================================================
// TypeRegistry<V>
// ============================================================================

/// 타입 계층 인식 레지스트리
///
/// - 정확한 타입 일치가 항상 우선합니다.
/// - 조상/자손 검색은 유일한 후보를 반환하거나 모호성 에러로 실패합니다.
///
/// 단일 소유 구조입니다. `!Send + !Sync`이므로 생성한 스레드 밖으로 나갈 수 없습니다.
pub struct TypeRegistry<V> {
    entries: HashMap<TypeKey, RegistryEntry<V>>,
    _single_owner: PhantomData<*const ()>,
}

impl<V> TypeRegistry<V> {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            _single_owner: PhantomData,
        }
    }

    /// 항목 삽입, 기존 정확 일치 항목이 있으면 반환
    ///
    /// 덮어쓰기 금지는 상위 레지스트리가 강제합니다.
    pub fn put(
        &mut self,
        type_key: TypeKey,
        value: V,
        provenance: Option<Provenance>,
    ) -> Option<RegistryEntry<V>> {
        debug!("Registry put: {} ({:?})", type_key, provenance);
        self.entries.insert(
            type_key,
            RegistryEntry {
                type_key,
                value,
                provenance,
            },
        )
    }

    /// 정확한 타입 조회
    pub fn get_exact(&self, type_key: TypeKey) -> Option<&RegistryEntry<V>> {
        self.entries.get(&type_key)
    }

    /// 정확한 타입, 없으면 가장 구체적인 등록된 조상 타입
    pub fn get_or_ancestor(&self, type_key: TypeKey) -> Result<Option<&RegistryEntry<V>>> {
        self.resolve(type_key, Direction::Ancestor)
    }

    /// 정확한 타입, 없으면 가장 일반적인 등록된 자손 타입
    pub fn get_or_descendant(&self, type_key: TypeKey) -> Result<Option<&RegistryEntry<V>>> {
        self.resolve(type_key, Direction::Descendant)
    }

    /// 등록된 타입 존재 여부 (정확 일치)
    pub fn contains(&self, type_key: TypeKey) -> bool {
        self.entries.contains_key(&type_key)
    }

    /// 등록된 타입들 (이름순)
    pub fn keys(&self) -> Vec<TypeKey> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort();
        keys
    }

    /// 모든 항목 (순서 없음)
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry<V>> {
        self.entries.values()
    }

    /// 항목 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve(
        &self,
        type_key: TypeKey,
        direction: Direction,
    ) -> Result<Option<&RegistryEntry<V>>> {
        if let Some(exact) = self.entries.get(&type_key) {
            return Ok(Some(exact));
        }

        let found: Vec<&RegistryEntry<V>> = self
            .entries
            .values()
            .filter(|entry| match direction {
                Direction::Ancestor => entry.type_key.is_ancestor_of(type_key),
                Direction::Descendant => entry.type_key.is_descendant_of(type_key),
            })
            .collect();

        // 다른 후보보다 덜 구체적인(Ancestor) / 더 구체적인(Descendant) 후보 제거
        let reduced: Vec<&RegistryEntry<V>> = found
            .iter()
            .filter(|entry| {
                !found.iter().any(|other| {
                    other.type_key != entry.type_key
                        && match direction {
                            Direction::Ancestor => entry.type_key.is_ancestor_of(other.type_key),
                            Direction::Descendant => {
                                entry.type_key.is_descendant_of(other.type_key)
                            }
                        }
                })
            })
            .copied()
            .collect();

        match reduced.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            many => {
                let mut candidates: Vec<String> =
                    many.iter().map(|entry| entry.describe()).collect();
                candidates.sort();
                Err(Error::AmbiguousTypeResolution {
                    requested: type_key.name().to_string(),
                    candidates,
                })
            }
        }
    }
}

impl<V> Default for TypeRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for TypeRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.keys())
            .finish()
    }
}
