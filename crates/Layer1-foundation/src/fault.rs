//! Fault Handler - 처리되지 않은 panic 처리
//!
//! 컨텍스트 빌드 이후 어떤 스레드에서든 발생한 panic을 로그로 남기고 프로세스를 종료합니다.

use std::any::Any;

/// panic 핸들러가 사용하는 종료 코드
pub const FAULT_EXIT_CODE: i32 = 255;

/// 프로세스 전역 fault 핸들러 설치자
pub trait FaultHandlerInstaller: Send + Sync {
    fn install(&self);
}

/// `std::panic` 훅을 설치하는 기본 구현
#[derive(Debug, Clone, Copy)]
pub struct PanicHookInstaller {
    exit_code: i32,
}

impl PanicHookInstaller {
    pub fn new() -> Self {
        Self {
            exit_code: FAULT_EXIT_CODE,
        }
    }

    pub fn with_exit_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

impl Default for PanicHookInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultHandlerInstaller for PanicHookInstaller {
    fn install(&self) {
        let exit_code = self.exit_code;
        std::panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let location = info
                .location()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());

            tracing::error!(
                thread = thread.name().unwrap_or("<unnamed>"),
                location = %location,
                "Unhandled panic, terminating: {}",
                panic_message(info.payload())
            );
            std::process::exit(exit_code);
        }));
        tracing::debug!("Fault handler installed");
    }
}

/// panic payload에서 메시지 추출
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
