//! Context - 서비스 컨텍스트 빌드
//!
//! ## 사용 예시
//! ```ignore
//! let ctx = ContextBuilder::new(components, vec![Arc::new(KafkaProvider)])
//!     .with_option(KafkaOptions::default())
//!     .with_clock(Arc::new(AccurateClock))
//!     .build()?;
//!
//! let kafka = ctx.extension::<KafkaExtension>()?;
//! ctx.close()?;
//! ```

mod builder;
mod service;

pub use builder::ContextBuilder;
pub use service::ServiceContext;
