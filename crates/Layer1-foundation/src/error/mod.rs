//! Error types for Keystone
//!
//! 부트스트랩 과정의 모든 실패를 중앙에서 관리
//!
//! 모든 에러는 fail-fast 입니다. 이 레이어에는 재시도가 없습니다.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Keystone 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 레지스트리 관련
    // ========================================================================
    #[error("{kind} already registered for type: {type_name}, registered by: {existing}")]
    DuplicateRegistration {
        /// 무엇이 중복되었는지 (`resource handler`, `option` 등)
        kind: &'static str,
        type_name: String,
        /// 기존 등록자 (provider 이름과 위치)
        existing: String,
    },

    #[error(
        "Ambiguous entry. Multiple entries match supplied key: {}. Could be any of [{}]",
        .requested,
        .candidates.join(", ")
    )]
    AmbiguousTypeResolution {
        requested: String,
        /// 남은 후보들 (타입 이름과 등록자)
        candidates: Vec<String>,
    },

    #[error("The model can only be changed during an extension provider's initialize call")]
    NotInitializing,

    #[error(
        "Unknown resource descriptor type: {}. Are you missing an extension? Known resource types: [{}]",
        .type_name,
        .known.join(", ")
    )]
    UnknownResourceType { type_name: String, known: Vec<String> },

    // ========================================================================
    // Extension 관련
    // ========================================================================
    #[error(
        "No extension of requested type is registered: {}, installed_extensions: [{}]",
        .type_name,
        .installed.join(", ")
    )]
    UnknownExtension {
        type_name: String,
        installed: Vec<String>,
    },

    #[error(
        "Multiple extension providers returned the same extension type. This is not supported. \
         extension_type: {extension_type}, current_provider: {current_provider}, existing_provider: {existing_provider}"
    )]
    ExtensionClash {
        extension_type: String,
        current_provider: String,
        existing_provider: String,
    },

    #[error("Failed to instantiate the extension provider. type: {provider}, reason: {reason}")]
    ProviderInstantiation { provider: String, reason: String },

    #[error("Provider returned no extension: {provider}")]
    NullExtension { provider: String },

    #[error("Extension error: {0}")]
    Extension(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    // ========================================================================
    // 시작 검증 (집계 에러)
    // ========================================================================
    #[error(
        "Component descriptors define resources for which no extension is installed. \
         Are you missing an extension? components: [{}], unsupported_resources: [{}], \
         ambiguous_resources: [{}], installed_extensions: [{}]",
        .components.join(", "),
        .unsupported.join(", "),
        .ambiguous.join("; "),
        .installed.join(", ")
    )]
    UnsupportedResourceTypes {
        components: Vec<String>,
        unsupported: Vec<String>,
        /// 같은 검사에서 발견된 모호한 타입 (에러 메시지)
        ambiguous: Vec<String>,
        installed: Vec<String>,
    },

    #[error(
        "No registered extensions were interested in the following options: [{}], installed_extensions: [{}]",
        .options.join(", "),
        .installed.join(", ")
    )]
    UnusedOptions {
        options: Vec<String>,
        installed: Vec<String>,
    },

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 시작 시 커버리지 검증(리소스/옵션)에서 나온 집계 에러인지 확인
    pub fn is_coverage_failure(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedResourceTypes { .. } | Error::UnusedOptions { .. }
        )
    }

    /// 중복 등록 에러 생성 헬퍼
    pub fn duplicate(
        kind: &'static str,
        type_name: impl Into<String>,
        existing: impl Into<String>,
    ) -> Self {
        Error::DuplicateRegistration {
            kind,
            type_name: type_name.into(),
            existing: existing.into(),
        }
    }

    /// Extension 콜백 실패 생성 헬퍼
    pub fn extension(message: impl Into<String>) -> Self {
        Error::Extension(message.into())
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Extension(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Extension(s.to_string())
    }
}
