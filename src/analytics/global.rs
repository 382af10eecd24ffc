use std::sync::{Arc, OnceLock};
use tracing::trace;

use super::recorder::ClickRecorder;

pub static GLOBAL_CLICK_RECORDER: OnceLock<Arc<ClickRecorder>> = OnceLock::new();

/// 初始化全局点击记录器（只允许初始化一次）
pub fn set_global_click_recorder(recorder: Arc<ClickRecorder>) {
    if GLOBAL_CLICK_RECORDER.set(recorder).is_err() {
        panic!("GLOBAL_CLICK_RECORDER has already been set");
    }
}

/// 获取全局点击记录器
pub fn get_click_recorder() -> Option<&'static Arc<ClickRecorder>> {
    match GLOBAL_CLICK_RECORDER.get() {
        Some(recorder) => Some(recorder),
        None => {
            trace!("GLOBAL_CLICK_RECORDER has not been initialized yet");
            None
        }
    }
}
