//! Clock - 현재 시각 공급자

use chrono::{DateTime, Duration, SubsecRound, Utc};
use parking_lot::Mutex;

/// 서비스 컨텍스트가 사용하는 시계
pub trait Clock: Send + Sync {
    /// 현재 시각
    fn now(&self) -> DateTime<Utc>;

    /// 구현 이름 (진단용)
    fn name(&self) -> &str;
}

/// 시스템이 제공하는 최고 정밀도 시계 (기본값)
#[derive(Debug, Default, Clone, Copy)]
pub struct AccurateClock;

impl Clock for AccurateClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn name(&self) -> &str {
        "accurate"
    }
}

/// 밀리초 정밀도 시계
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// 테스트용 고정 시계
///
/// `set`/`advance`로만 시간이 흐릅니다.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(at),
        }
    }

    /// 시각 변경
    pub fn set(&self, at: DateTime<Utc>) {
        *self.current.lock() = at;
    }

    /// 시각 전진
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
