//! Config - 시작 설정
//!
//! - `startup.rs` - StartupConfig (환경 변수 / JSON 파일)

mod startup;

pub use startup::{StartupConfig, LOG_ENV};
