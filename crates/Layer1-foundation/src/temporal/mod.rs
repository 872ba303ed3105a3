//! Temporal - 시계 구현과 환경 기반 로더

mod clock;
mod loader;

pub use clock::{AccurateClock, Clock, FixedClock, SystemClock};
pub use loader::{ClockCatalog, ClockFactory, SystemEnvClockLoader, CLOCK_ENV};
