//! Service API - provider에 제공되는 프레임워크 API
//!
//! 옵션, 리소스 모델, 컴포넌트, 익스텐션 레지스트리를 묶어 하나의 소유자로 관리합니다.
//! provider의 `initialize`는 `&mut ServiceApi`를 받아 중첩으로 다른 익스텐션을 초기화할 수 있습니다.

use crate::component::Components;
use crate::extension::{provenance_of, Extension, ExtensionProvider, ExtensionRegistry};
use crate::model::ResourceModel;
use crate::option::OptionsRegistry;
use keystone_foundation::{Error, Provenance, Result, TypeKey};
use std::sync::Arc;
use tracing::{debug, info};

/// 빌드 중 provider가 사용하는 API
pub struct ServiceApi {
    options: OptionsRegistry,
    model: ResourceModel,
    extensions: ExtensionRegistry,
    components: Components,
    providers: Vec<Arc<dyn ExtensionProvider>>,
}

impl ServiceApi {
    pub fn new(components: Components, providers: Vec<Arc<dyn ExtensionProvider>>) -> Self {
        Self {
            options: OptionsRegistry::new(),
            model: ResourceModel::new(),
            extensions: ExtensionRegistry::new(),
            components,
            providers,
        }
    }

    // ========================================================================
    // 접근자
    // ========================================================================

    pub fn options(&self) -> &OptionsRegistry {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionsRegistry {
        &mut self.options
    }

    pub fn model(&self) -> &ResourceModel {
        &self.model
    }

    /// 리소스 핸들러 등록용 (`initialize` 중에만 유효)
    pub fn model_mut(&mut self) -> &mut ResourceModel {
        &mut self.model
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// 빌드에 제공된 provider 목록
    pub fn providers(&self) -> &[Arc<dyn ExtensionProvider>] {
        &self.providers
    }

    /// 현재 `initialize` 중인 가장 안쪽 provider
    pub fn currently_initializing(&self) -> Option<Provenance> {
        self.extensions.current_provenance()
    }

    // ========================================================================
    // 익스텐션 초기화
    // ========================================================================

    /// provider의 익스텐션을 (필요하면 초기화하여) 반환
    ///
    /// 같은 provider 타입은 한 번만 `initialize`됩니다.
    pub fn ensure_extension(
        &mut self,
        provider: Arc<dyn ExtensionProvider>,
    ) -> Result<Arc<dyn Extension>> {
        let provider_type = provider.provider_type();
        if let Some(existing) = self.extensions.cached(provider_type) {
            debug!("Extension for {} already initialized", provider_type);
            return Ok(existing);
        }

        self.extensions.push(Arc::clone(&provider))?;
        self.model.set_initializing(self.extensions.current_provenance());

        let result = provider.initialize(self);

        self.extensions.pop();
        self.model.set_initializing(self.extensions.current_provenance());

        let provenance = provenance_of(provider.as_ref());
        let extension = result?.ok_or_else(|| Error::NullExtension {
            provider: provenance.to_string(),
        })?;

        self.extensions
            .record(provider.as_ref(), Arc::clone(&extension))?;
        info!("Loaded extension: {} (provider: {})", extension.name(), provenance);
        Ok(extension)
    }

    /// 제공된 provider 중 해당 타입의 익스텐션을 반환
    pub fn ensure_extension_of(&mut self, provider_type: TypeKey) -> Result<Arc<dyn Extension>> {
        if let Some(existing) = self.extensions.cached(provider_type) {
            return Ok(existing);
        }

        let provider = self
            .providers
            .iter()
            .find(|p| p.provider_type() == provider_type)
            .cloned()
            .ok_or_else(|| Error::ProviderInstantiation {
                provider: provider_type.name().to_string(),
                reason: "No such provider was supplied to the context builder".to_string(),
            })?;

        self.ensure_extension(provider)
    }

    pub(crate) fn into_extensions(self) -> ExtensionRegistry {
        self.extensions
    }
}

impl std::fmt::Debug for ServiceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceApi")
            .field("options", &self.options)
            .field("model", &self.model)
            .field("extensions", &self.extensions)
            .field("components", &self.components.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ResourceDescriptor;
    use crate::model::ResourceHandler;
    use keystone_foundation::declare_type;
    use parking_lot::Mutex;
    use std::any::Any;

    declare_type!(ALPHA_PROVIDER = "AlphaProvider");
    declare_type!(BETA_PROVIDER = "BetaProvider");
    declare_type!(GAMMA_PROVIDER = "GammaProvider");
    declare_type!(ALPHA = "AlphaExtension");
    declare_type!(BETA = "BetaExtension");
    declare_type!(WIDGET = "Widget");

    struct Ext(TypeKey);

    impl Extension for Ext {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn extension_type(&self) -> TypeKey {
            self.0
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// 기록: 초기화 시점의 `currently_initializing()` 및 하위 provider 결과
    type Log = Arc<Mutex<Vec<String>>>;

    struct TestProvider {
        kind: TypeKey,
        produces: Option<TypeKey>,
        depends_on: Option<TypeKey>,
        fail: bool,
        log: Log,
    }

    impl TestProvider {
        fn new(kind: TypeKey, produces: Option<TypeKey>, log: &Log) -> Self {
            Self {
                kind,
                produces,
                depends_on: None,
                fail: false,
                log: Arc::clone(log),
            }
        }

        fn note(&self, api: &ServiceApi, when: &str) {
            let current = api
                .currently_initializing()
                .map(|p| p.provider)
                .unwrap_or_else(|| "-".to_string());
            self.log
                .lock()
                .push(format!("{}:{}:{}", self.kind, when, current));
        }
    }

    impl ExtensionProvider for TestProvider {
        fn provider_type(&self) -> TypeKey {
            self.kind
        }

        fn location(&self) -> Option<&'static str> {
            Some(module_path!())
        }

        fn initialize(&self, api: &mut ServiceApi) -> Result<Option<Arc<dyn Extension>>> {
            self.note(api, "before");
            if let Some(dependency) = self.depends_on {
                let outcome = api.ensure_extension_of(dependency);
                self.note(api, if outcome.is_ok() { "dep-ok" } else { "dep-err" });
                outcome?;
            }
            if self.fail {
                return Err(Error::extension("initialize failed"));
            }
            Ok(self
                .produces
                .map(|t| Arc::new(Ext(t)) as Arc<dyn Extension>))
        }
    }

    fn api_with(providers: Vec<Arc<dyn ExtensionProvider>>) -> ServiceApi {
        ServiceApi::new(Components::default(), providers)
    }

    #[test]
    fn test_cached_extension_single_callback() {
        let log: Log = Arc::default();
        let provider: Arc<dyn ExtensionProvider> = Arc::new(TestProvider::new(
            TypeKey::of(&ALPHA_PROVIDER),
            Some(TypeKey::of(&ALPHA)),
            &log,
        ));
        let mut api = api_with(vec![Arc::clone(&provider)]);

        let first = api.ensure_extension(Arc::clone(&provider)).unwrap();
        let second = api.ensure_extension(provider).unwrap();
        let third = api.ensure_extension_of(TypeKey::of(&ALPHA_PROVIDER)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(log.lock().len(), 1);
        assert_eq!(api.extensions().names(), vec!["AlphaExtension"]);
    }

    #[test]
    fn test_same_extension_type_from_two_providers_clashes() {
        let log: Log = Arc::default();
        let mut api = api_with(vec![]);

        api.ensure_extension(Arc::new(TestProvider::new(
            TypeKey::of(&ALPHA_PROVIDER),
            Some(TypeKey::of(&ALPHA)),
            &log,
        )))
        .unwrap();
        let err = api
            .ensure_extension(Arc::new(TestProvider::new(
                TypeKey::of(&BETA_PROVIDER),
                Some(TypeKey::of(&ALPHA)),
                &log,
            )))
            .err()
            .unwrap();

        match err {
            Error::ExtensionClash {
                extension_type,
                current_provider,
                existing_provider,
            } => {
                assert_eq!(extension_type, "AlphaExtension");
                assert!(current_provider.starts_with("BetaProvider ("));
                assert!(existing_provider.starts_with("AlphaProvider ("));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_initialization_stack() {
        let log: Log = Arc::default();
        let beta: Arc<dyn ExtensionProvider> = Arc::new(TestProvider::new(
            TypeKey::of(&BETA_PROVIDER),
            Some(TypeKey::of(&BETA)),
            &log,
        ));
        let alpha: Arc<dyn ExtensionProvider> = Arc::new(TestProvider {
            depends_on: Some(TypeKey::of(&BETA_PROVIDER)),
            ..TestProvider::new(TypeKey::of(&ALPHA_PROVIDER), Some(TypeKey::of(&ALPHA)), &log)
        });
        let mut api = api_with(vec![Arc::clone(&alpha), beta]);

        api.ensure_extension(alpha).unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "AlphaProvider:before:AlphaProvider",
                "BetaProvider:before:BetaProvider",
                "AlphaProvider:dep-ok:AlphaProvider",
            ]
        );
        assert!(api.currently_initializing().is_none());
        // 의존 대상이 먼저 설치됨
        assert_eq!(api.extensions().names(), vec!["BetaExtension", "AlphaExtension"]);
    }

    #[test]
    fn test_stack_reverts_when_nested_initialize_fails() {
        let log: Log = Arc::default();
        let beta: Arc<dyn ExtensionProvider> = Arc::new(TestProvider {
            fail: true,
            ..TestProvider::new(TypeKey::of(&BETA_PROVIDER), Some(TypeKey::of(&BETA)), &log)
        });
        let alpha: Arc<dyn ExtensionProvider> = Arc::new(TestProvider {
            depends_on: Some(TypeKey::of(&BETA_PROVIDER)),
            ..TestProvider::new(TypeKey::of(&ALPHA_PROVIDER), Some(TypeKey::of(&ALPHA)), &log)
        });
        let mut api = api_with(vec![Arc::clone(&alpha), beta]);

        let err = api.ensure_extension(alpha).err().unwrap();

        assert!(matches!(err, Error::Extension(ref m) if m == "initialize failed"));
        assert_eq!(
            log.lock().last().map(String::as_str),
            Some("AlphaProvider:dep-err:AlphaProvider")
        );
        assert!(api.currently_initializing().is_none());
        assert!(api.extensions().is_empty());
    }

    #[test]
    fn test_null_extension_rejected() {
        let log: Log = Arc::default();
        let mut api = api_with(vec![]);

        let err = api
            .ensure_extension(Arc::new(TestProvider::new(TypeKey::of(&GAMMA_PROVIDER), None, &log)))
            .err()
            .unwrap();
        assert!(matches!(err, Error::NullExtension { ref provider } if provider.starts_with("GammaProvider")));
        assert!(api.currently_initializing().is_none());
    }

    #[test]
    fn test_unknown_provider_type() {
        let mut api = api_with(vec![]);
        let err = api
            .ensure_extension_of(TypeKey::of(&GAMMA_PROVIDER))
            .err()
            .unwrap();
        assert!(matches!(err, Error::ProviderInstantiation { ref provider, .. } if provider == "GammaProvider"));
    }

    #[test]
    fn test_circular_dependency_detected() {
        let log: Log = Arc::default();
        let alpha: Arc<dyn ExtensionProvider> = Arc::new(TestProvider {
            depends_on: Some(TypeKey::of(&BETA_PROVIDER)),
            ..TestProvider::new(TypeKey::of(&ALPHA_PROVIDER), Some(TypeKey::of(&ALPHA)), &log)
        });
        let beta: Arc<dyn ExtensionProvider> = Arc::new(TestProvider {
            depends_on: Some(TypeKey::of(&ALPHA_PROVIDER)),
            ..TestProvider::new(TypeKey::of(&BETA_PROVIDER), Some(TypeKey::of(&BETA)), &log)
        });
        let mut api = api_with(vec![Arc::clone(&alpha), beta]);

        let err = api.ensure_extension(alpha).err().unwrap();
        assert!(err
            .to_string()
            .contains("AlphaProvider -> BetaProvider -> AlphaProvider"));
        assert!(api.currently_initializing().is_none());
    }

    struct Noop;

    impl ResourceHandler for Noop {
        fn validate(&self, _: &[Arc<dyn ResourceDescriptor>]) -> Result<()> {
            Ok(())
        }
        fn prepare(&self, _: &[Arc<dyn ResourceDescriptor>]) -> Result<()> {
            Ok(())
        }
    }

    struct Registering;

    impl ExtensionProvider for Registering {
        fn provider_type(&self) -> TypeKey {
            TypeKey::of(&GAMMA_PROVIDER)
        }

        fn initialize(&self, api: &mut ServiceApi) -> Result<Option<Arc<dyn Extension>>> {
            api.model_mut()
                .add_resource(TypeKey::of(&WIDGET), Arc::new(Noop))?;
            Ok(Some(Arc::new(Ext(TypeKey::of(&BETA)))))
        }
    }

    #[test]
    fn test_registrations_attributed_to_initializing_provider() {
        let mut api = api_with(vec![]);
        api.ensure_extension(Arc::new(Registering)).unwrap();

        assert_eq!(
            api.model().registrant(TypeKey::of(&WIDGET)).map(|p| p.provider.as_str()),
            Some("GammaProvider")
        );
        // 초기화 창이 닫힌 뒤에는 등록 불가
        let err = api
            .model_mut()
            .add_resource(TypeKey::of(&WIDGET), Arc::new(Noop))
            .err()
            .unwrap();
        assert!(matches!(err, Error::NotInitializing));
    }
}
