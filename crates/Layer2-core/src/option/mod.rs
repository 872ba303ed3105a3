//! Options - 익스텐션 옵션 레지스트리
//!
//! 사용자가 제공한 옵션을 보관하고, 어떤 익스텐션도 조회하지 않은 옵션을 추적합니다.

use keystone_foundation::{Error, Result, TypeKey, TypeRegistry, Typed};
use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 익스텐션에 전달되는 옵션
pub trait ExtensionOptions: fmt::Debug + Any + Send + Sync {
    /// 구체 옵션 타입
    fn option_type(&self) -> TypeKey;

    fn as_any(&self) -> &dyn Any;
}

/// 옵션 레지스트리
pub struct OptionsRegistry {
    options: TypeRegistry<Arc<dyn ExtensionOptions>>,
    unused: RefCell<BTreeSet<TypeKey>>,
}

impl OptionsRegistry {
    pub fn new() -> Self {
        Self {
            options: TypeRegistry::new(),
            unused: RefCell::new(BTreeSet::new()),
        }
    }

    /// 옵션 추가 (같은 구체 타입은 한 번만)
    pub fn add(&mut self, option: Arc<dyn ExtensionOptions>) -> Result<&mut Self> {
        let option_type = option.option_type();
        if let Some(existing) = self.options.get_exact(option_type) {
            return Err(Error::duplicate(
                "Option",
                option_type.name(),
                format!("{:?}", existing.value),
            ));
        }

        debug!("Added option: {}", option_type);
        self.options.put(option_type, option, None);
        self.unused.get_mut().insert(option_type);
        Ok(self)
    }

    /// 타입 자신 또는 가장 일반적인 자손 타입의 옵션 조회
    ///
    /// 찾은 옵션은 사용된 것으로 표시됩니다.
    pub fn get(&self, option_type: TypeKey) -> Result<Option<Arc<dyn ExtensionOptions>>> {
        let found = self.options.get_or_descendant(option_type)?;
        Ok(found.map(|entry| {
            self.unused.borrow_mut().remove(&entry.type_key);
            Arc::clone(&entry.value)
        }))
    }

    /// 구체 Rust 타입으로 조회
    pub fn get_as<O>(&self) -> Result<Option<O>>
    where
        O: ExtensionOptions + Typed + Clone,
    {
        match self.get(O::type_key())? {
            Some(option) => option
                .as_any()
                .downcast_ref::<O>()
                .cloned()
                .map(Some)
                .ok_or_else(|| {
                    Error::UnsupportedOperation(format!(
                        "Option resolved for {} is of another concrete type: {:?}",
                        O::type_key(),
                        option
                    ))
                }),
            None => Ok(None),
        }
    }

    /// 한 번도 조회되지 않은 옵션들 (타입 이름순)
    pub fn unused(&self) -> Vec<Arc<dyn ExtensionOptions>> {
        self.unused
            .borrow()
            .iter()
            .filter_map(|t| self.options.get_exact(*t))
            .map(|entry| Arc::clone(&entry.value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl Default for OptionsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OptionsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsRegistry")
            .field("types", &self.options.keys())
            .field("unused", &self.unused.borrow())
            .finish()
    }
}
