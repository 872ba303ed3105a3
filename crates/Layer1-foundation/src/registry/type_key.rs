//! Type Key - 런타임 타입 식별자
//!
//! 리소스/옵션/익스텐션 타입은 `declare_type!`로 선언한 정적 `TypeDescriptor`로
//! 식별합니다. 조상 관계는 선언된 부모 목록에서 (전이적으로) 계산합니다.
//!
//! ```ignore
//! declare_type!(pub SHAPE = "Shape");
//! declare_type!(pub COLORED = "Colored");
//! declare_type!(pub COLORED_CIRCLE = "ColoredCircle": SHAPE, COLORED);
//!
//! let key = TypeKey::of(&COLORED_CIRCLE);
//! assert!(TypeKey::of(&SHAPE).is_ancestor_of(key));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// TypeDescriptor - 선언된 타입
// ============================================================================

/// 정적으로 선언된 타입 정보
///
/// 항상 `static`으로 선언해야 합니다. 동일성은 주소로 판단합니다.
#[derive(Debug)]
pub struct TypeDescriptor {
    /// 표시 이름 (진단 메시지용)
    pub name: &'static str,

    /// 직접 부모 타입들
    pub parents: &'static [&'static TypeDescriptor],
}

/// 타입 선언 매크로
///
/// `declare_type!(pub CIRCLE = "Circle": SHAPE);` 는 `SHAPE`를 부모로 갖는
/// `static CIRCLE: TypeDescriptor`를 만듭니다.
#[macro_export]
macro_rules! declare_type {
    ($(#[$meta:meta])* $vis:vis $ident:ident = $name:literal $(: $($parent:path),+ $(,)?)?) => {
        $(#[$meta])*
        $vis static $ident: $crate::registry::TypeDescriptor = $crate::registry::TypeDescriptor {
            name: $name,
            parents: &[$($(&$parent),+)?],
        };
    };
}

// ============================================================================
// TypeKey - 비교 가능한 타입 핸들
// ============================================================================

/// 등록된 타입에 대한 안정적인 핸들
#[derive(Clone, Copy)]
pub struct TypeKey(&'static TypeDescriptor);

impl TypeKey {
    /// 선언으로부터 키 생성
    pub const fn of(descriptor: &'static TypeDescriptor) -> Self {
        Self(descriptor)
    }

    /// 타입 이름
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// 직접 부모 타입들
    pub fn parents(&self) -> impl Iterator<Item = TypeKey> {
        self.0.parents.iter().map(|parent| TypeKey(parent))
    }

    /// `self`가 `other`의 (엄격한) 조상인지 확인
    pub fn is_ancestor_of(&self, other: TypeKey) -> bool {
        let mut pending: Vec<TypeKey> = other.parents().collect();
        let mut seen: Vec<TypeKey> = Vec::new();

        while let Some(next) = pending.pop() {
            if next == *self {
                return true;
            }
            if seen.contains(&next) {
                continue;
            }
            seen.push(next);
            pending.extend(next.parents());
        }

        false
    }

    /// `self`가 `other`의 (엄격한) 자손인지 확인
    pub fn is_descendant_of(&self, other: TypeKey) -> bool {
        other.is_ancestor_of(*self)
    }

    /// 같은 타입이거나 조상이면 true
    pub fn is_assignable_from(&self, other: TypeKey) -> bool {
        *self == other || self.is_ancestor_of(other)
    }

    fn addr(&self) -> usize {
        self.0 as *const TypeDescriptor as usize
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.addr().cmp(&other.addr()))
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name())
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Typed - Rust 타입과 TypeKey 연결
// ============================================================================

/// 구체 Rust 타입이 자신의 `TypeKey`를 노출할 때 구현
///
/// 다운캐스팅 헬퍼(`get_as` 등)가 사용합니다.
pub trait Typed {
    fn type_key() -> TypeKey;
}

#[cfg(test)]
mod tests {
    use super::*;

    declare_type!(SHAPE = "Shape");
    declare_type!(COLORED = "Colored");
    declare_type!(CIRCLE = "Circle": SHAPE);
    declare_type!(UNIT_CIRCLE = "UnitCircle": CIRCLE);
    declare_type!(COLORED_CIRCLE = "ColoredCircle": CIRCLE, COLORED);
    // 같은 이름이라도 다른 선언이면 다른 타입
    declare_type!(OTHER_SHAPE = "Shape");

    #[test]
    fn test_identity_equality() {
        assert_eq!(TypeKey::of(&SHAPE), TypeKey::of(&SHAPE));
        assert_ne!(TypeKey::of(&SHAPE), TypeKey::of(&OTHER_SHAPE));
    }

    #[test]
    fn test_transitive_ancestry() {
        let shape = TypeKey::of(&SHAPE);
        let unit = TypeKey::of(&UNIT_CIRCLE);

        assert!(shape.is_ancestor_of(unit));
        assert!(unit.is_descendant_of(shape));
        assert!(!unit.is_ancestor_of(shape));
        assert!(!shape.is_ancestor_of(shape));
        assert!(shape.is_assignable_from(shape));
    }

    #[test]
    fn test_multiple_parents() {
        let colored_circle = TypeKey::of(&COLORED_CIRCLE);

        assert!(TypeKey::of(&COLORED).is_ancestor_of(colored_circle));
        assert!(TypeKey::of(&SHAPE).is_ancestor_of(colored_circle));
        assert!(!TypeKey::of(&UNIT_CIRCLE).is_ancestor_of(colored_circle));
    }

    #[test]
    fn test_ordering_is_by_name() {
        let mut keys = vec![TypeKey::of(&SHAPE), TypeKey::of(&CIRCLE), TypeKey::of(&COLORED)];
        keys.sort();
        let names: Vec<_> = keys.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["Circle", "Colored", "Shape"]);
    }
}
