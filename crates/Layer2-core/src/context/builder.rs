//! Context Builder - 시작 프로토콜
//!
//! 1. fault 핸들러 설치
//! 2. 옵션 적용
//! 3. 익스텐션 초기화 (제공 순서, 중첩 허용)
//! 4. 리소스 그래프 순회 및 커버리지 검증
//! 5. 옵션 사용 검증
//! 6. 타입 그룹 단위로 자식 먼저 validate / ensure / prepare
//! 7. 시계 로드
//! 8. 컨텍스트 조립
//!
//! 모든 단계는 순차적이며 첫 실패에서 중단됩니다.

use super::service::ServiceContext;
use crate::api::ServiceApi;
use crate::component::{walk, Components, ResourceInitializer, WalkedResource};
use crate::extension::ExtensionProvider;
use crate::option::ExtensionOptions;
use keystone_foundation::{
    logging, Clock, ClockCatalog, Error, FaultHandlerInstaller, PanicHookInstaller, Result,
    StartupConfig, SystemEnvClockLoader, TypeKey,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// ServiceContext 빌더
pub struct ContextBuilder {
    components: Components,
    providers: Vec<Arc<dyn ExtensionProvider>>,
    options: Vec<Arc<dyn ExtensionOptions>>,
    clock: Option<Arc<dyn Clock>>,
    catalog: ClockCatalog,
    config: Option<StartupConfig>,
    fault_handler: Arc<dyn FaultHandlerInstaller>,
    init_logging: bool,
}

impl ContextBuilder {
    pub fn new(
        components: impl Into<Components>,
        providers: Vec<Arc<dyn ExtensionProvider>>,
    ) -> Self {
        Self {
            components: components.into(),
            providers,
            options: Vec::new(),
            clock: None,
            catalog: ClockCatalog::with_builtins(),
            config: None,
            fault_handler: Arc::new(PanicHookInstaller::new()),
            init_logging: false,
        }
    }

    /// 익스텐션 옵션 추가
    pub fn with_option<O: ExtensionOptions>(mut self, option: O) -> Self {
        self.options.push(Arc::new(option));
        self
    }

    /// 여러 옵션 추가
    pub fn with_options(
        mut self,
        options: impl IntoIterator<Item = Arc<dyn ExtensionOptions>>,
    ) -> Self {
        self.options.extend(options);
        self
    }

    /// 기본 시계 지정 (`KEYSTONE_CLOCK`이 설정되어 있으면 그것이 우선)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// 이름으로 선택 가능한 시계 구현 추가
    pub fn with_clock_impl<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Clock> + Send + Sync + 'static,
    {
        self.catalog.register(name, factory);
        self
    }

    /// 시작 설정 지정 (없으면 환경 변수에서 로드)
    pub fn with_config(mut self, config: StartupConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// fault 핸들러 설치자 교체
    pub fn with_fault_handler_installer(mut self, installer: Arc<dyn FaultHandlerInstaller>) -> Self {
        self.fault_handler = installer;
        self
    }

    /// 빌드 시작 시 tracing 구독자 설치
    pub fn with_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// 시작 프로토콜 실행
    pub fn build(self) -> Result<ServiceContext> {
        let config = self.config.unwrap_or_else(StartupConfig::from_env);
        if self.init_logging {
            logging::init_tracing(config.effective_log_level());
        }

        // 1. fault 핸들러
        if config.install_fault_handler {
            self.fault_handler.install();
        }

        info!(
            "Building service context: components=[{}], providers={}",
            self.components.names().join(", "),
            self.providers.len()
        );
        let mut api = ServiceApi::new(self.components, self.providers.clone());

        // 2. 옵션
        for option in self.options {
            api.options_mut().add(option)?;
        }

        // 3. 익스텐션
        for provider in &self.providers {
            api.ensure_extension(Arc::clone(provider))?;
        }
        info!("Installed extensions: [{}]", api.extensions().names().join(", "));

        // 4. 리소스 커버리지
        let walked = walk(api.components());
        verify_resource_coverage(&api, &walked)?;

        // 5. 옵션 사용
        verify_options_used(&api)?;

        // 6-7. 순회 결과를 의존 순서대로 준비
        debug!("Preparing {} resource(s)", walked.len());
        ResourceInitializer::new(api.model()).prepare_all(&walked)?;

        // 8. 컨텍스트 조립
        let clock = SystemEnvClockLoader::new(self.catalog)
            .load_named(config.clock.as_deref(), self.clock)?;
        let extensions = api.into_extensions().into_installed();

        info!("Service context ready (clock: {})", clock.name());
        Ok(ServiceContext::new(clock, extensions))
    }
}

/// 핸들러가 없는 리소스 타입을 모두 모아 한 번에 보고
///
/// 모호한 타입만 있으면 그 모호성 에러를 그대로, 지원되지 않는 타입과 함께 있으면
/// 집계 에러에 포함해 반환합니다.
fn verify_resource_coverage(api: &ServiceApi, walked: &[WalkedResource]) -> Result<()> {
    let mut unsupported = BTreeSet::new();
    let mut ambiguous: BTreeMap<TypeKey, Error> = BTreeMap::new();

    for resource in walked {
        let resource_type = resource.descriptor.resource_type();
        if unsupported.contains(&resource_type) || ambiguous.contains_key(&resource_type) {
            continue;
        }
        match api.model().has_type(resource_type) {
            Ok(true) => {}
            Ok(false) => {
                unsupported.insert(resource_type);
            }
            Err(err @ Error::AmbiguousTypeResolution { .. }) => {
                ambiguous.insert(resource_type, err);
            }
            Err(err) => return Err(err),
        }
    }

    if unsupported.is_empty() {
        return match ambiguous.into_values().next() {
            Some(err) => Err(err),
            None => Ok(()),
        };
    }

    Err(Error::UnsupportedResourceTypes {
        components: api.components().names(),
        unsupported: unsupported.iter().map(|t| t.name().to_string()).collect(),
        ambiguous: ambiguous.values().map(|err| err.to_string()).collect(),
        installed: api.extensions().names(),
    })
}

/// 어떤 익스텐션도 조회하지 않은 옵션을 모두 모아 한 번에 보고
fn verify_options_used(api: &ServiceApi) -> Result<()> {
    let unused = api.options().unused();
    if unused.is_empty() {
        return Ok(());
    }

    Err(Error::UnusedOptions {
        options: unused.iter().map(|o| format!("{:?}", o)).collect(),
        installed: api.extensions().names(),
    })
}
