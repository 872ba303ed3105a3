//! # keystone-foundation
//!
//! Foundation layer for Keystone:
//! - Error: 부트스트랩 에러 분류 (fail-fast)
//! - Registry: 타입 선언(`declare_type!`), `TypeKey`, 계층 인식 `TypeRegistry`
//! - Temporal: 시계 구현과 환경 변수 기반 로더
//! - Config: StartupConfig (환경 변수 / JSON)
//! - Logging / Fault: tracing 초기화, panic 핸들러
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  keystone-core (ContextBuilder, ServiceApi)  │
//! │                     │                        │
//! │                     ▼                        │
//! │   TypeRegistry<V>  ── TypeKey (declared)     │
//! │   Clock / Loader   ── StartupConfig          │
//! └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod fault;
pub mod logging;
pub mod registry;
pub mod temporal;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Registry
// ============================================================================
pub use registry::{Provenance, RegistryEntry, TypeDescriptor, TypeKey, TypeRegistry, Typed};

// ============================================================================
// Temporal
// ============================================================================
pub use temporal::{
    AccurateClock, Clock, ClockCatalog, ClockFactory, FixedClock, SystemClock,
    SystemEnvClockLoader, CLOCK_ENV,
};

// ============================================================================
// Config / Fault
// ============================================================================
pub use config::{StartupConfig, LOG_ENV};
pub use fault::{FaultHandlerInstaller, PanicHookInstaller, FAULT_EXIT_CODE};
