//! Registry - 타입 계층 인식 레지스트리
//!
//! - `type_key` - 타입 선언(`declare_type!`)과 비교 가능한 `TypeKey`
//! - `type_registry` - 조상/자손 검색을 지원하는 `TypeRegistry<V>`

mod type_key;
mod type_registry;

pub use type_key::{TypeDescriptor, TypeKey, Typed};
pub use type_registry::{Provenance, RegistryEntry, TypeRegistry};
