//! Extension - 익스텐션 수명 주기
//!
//! - `traits.rs` - Extension, ExtensionProvider
//! - `registry.rs` - provider별 캐시, 타입 충돌 검사, 초기화 스택
//! - `installed.rs` - 설치 순서를 유지하는 익스텐션 목록

mod installed;
mod registry;
mod traits;

pub use installed::InstalledExtensions;
pub use registry::ExtensionRegistry;
pub use traits::{downcast, provenance_of, Extension, ExtensionProvider};
