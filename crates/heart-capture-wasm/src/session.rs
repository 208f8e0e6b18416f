//! 心率捕获流程控制器
//!
//! 有限状态机：`idle → capturing → analyzing → age_input → recommendation`，
//! `error` 可从 capturing/analyzing/age_input 进入，任意状态可经 `close`
//! 复位。控制器持有会话状态与取消标记，JS 宿主持有真实的
//! MediaStream、canvas 与定时器句柄，按标记创建/取消它们。
//!
//! 并发约束：采样定时器与叠加层回调在 capturing 期间并行运行；
//! 分析请求最多一个在途；`close` 协作式取消且幂等。

use wasm_bindgen::prelude::*;

use crate::classify::{heart_rate_concerning, parse_age};
use crate::sampler::FrameSampler;

const ERR_TOOLS_NOT_READY: &str =
    "Face detection tools are not ready. Please wait or try refreshing.";
const ERR_NO_CAMERA: &str = "No camera found. Please ensure a camera is connected and enabled.";
const ERR_CAMERA_DENIED: &str =
    "Camera access denied. Please allow camera access in your browser settings.";
const ERR_CAMERA_GENERIC: &str =
    "Could not access camera or start analysis. Please check browser permissions.";
const ERR_ANALYSIS_DEFAULT: &str = "Failed to get heart rate from analysis.";

/// 控制器状态，与 UI 的 modal step 一一对应
#[wasm_bindgen]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CaptureState {
    Idle = 0,
    Capturing = 1,
    Analyzing = 2,
    AgeInput = 3,
    Recommendation = 4,
    Error = 5,
}

/// 捕获流程控制器
///
/// 一次心率检测的唯一属主：摄像头流的生命周期标记、帧采样器、
/// 分析结果与用户年龄都挂在这里，`close` 统一回收。
#[wasm_bindgen]
pub struct CaptureController {
    fps: u32,
    duration_ms: u32,
    state: CaptureState,
    sampler: Option<FrameSampler>,
    stream_active: bool,
    stream_ready: bool,
    sampling_timer_armed: bool,
    duration_timer_armed: bool,
    overlay_frame_armed: bool,
    analysis_in_flight: bool,
    avg_heart_rate: Option<f64>,
    age: Option<u8>,
    error: Option<String>,
}

#[wasm_bindgen]
impl CaptureController {
    #[wasm_bindgen(constructor)]
    pub fn new(fps: u32, duration_ms: u32) -> Self {
        Self {
            fps,
            duration_ms,
            state: CaptureState::Idle,
            sampler: None,
            stream_active: false,
            stream_ready: false,
            sampling_timer_armed: false,
            duration_timer_armed: false,
            overlay_frame_armed: false,
            analysis_in_flight: false,
            avg_heart_rate: None,
            age: None,
            error: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// `idle → capturing`。检测模型未就绪时直接进入 error。
    /// 会话已在进行中时忽略（同一时刻至多一个会话）。
    pub fn start(&mut self, models_loaded: bool) -> bool {
        if self.state != CaptureState::Idle {
            return false;
        }

        self.avg_heart_rate = None;
        self.age = None;
        self.error = None;

        if !models_loaded {
            self.state = CaptureState::Error;
            self.error = Some(ERR_TOOLS_NOT_READY.to_string());
            return false;
        }

        self.state = CaptureState::Capturing;
        self.sampler = Some(FrameSampler::new(self.fps, self.duration_ms));
        self.sampling_timer_armed = true;
        self.duration_timer_armed = true;
        self.overlay_frame_armed = true;
        true
    }

    /// 摄像头流获取成功。同一条流供可见预览与隐藏处理元素共用。
    #[wasm_bindgen(js_name = "streamAcquired")]
    pub fn stream_acquired(&mut self) {
        if self.state == CaptureState::Capturing {
            self.stream_active = true;
        }
    }

    /// 预览元素开始播放，流就绪，叠加层循环允许运行。
    #[wasm_bindgen(js_name = "streamReady")]
    pub fn mark_stream_ready(&mut self) {
        if self.state == CaptureState::Capturing && self.stream_active {
            self.stream_ready = true;
        }
    }

    /// 摄像头获取失败，按 DOMException 名称选择提示语并进入 error。
    #[wasm_bindgen(js_name = "cameraError")]
    pub fn camera_error(&mut self, name: &str) {
        let message = match name {
            "NotFoundError" | "DevicesNotFoundError" => ERR_NO_CAMERA,
            "NotAllowedError" | "PermissionDeniedError" => ERR_CAMERA_DENIED,
            _ => ERR_CAMERA_GENERIC,
        };
        self.fail(message);
    }

    /// 非摄像头来源的运行期失败（视频元素错误、canvas 初始化失败等）。
    pub fn fail(&mut self, message: &str) {
        if matches!(
            self.state,
            CaptureState::Capturing | CaptureState::Analyzing | CaptureState::AgeInput
        ) {
            self.release_resources();
            self.state = CaptureState::Error;
            self.error = Some(message.to_string());
        }
    }

    /// 采样定时器每个 tick 调用。仅在 capturing 且流就绪时入缓冲，
    /// 其余情况静默跳过。
    #[wasm_bindgen(js_name = "pushFrame")]
    pub fn push_frame(
        &mut self,
        frame: String,
        has_data: bool,
        video_width: u32,
        video_height: u32,
    ) -> bool {
        if self.state != CaptureState::Capturing || !self.stream_ready {
            return false;
        }
        match self.sampler.as_mut() {
            Some(sampler) => sampler.push_frame(frame, has_data, video_width, video_height),
            None => false,
        }
    }

    /// 一次性时长超时触发：`capturing → analyzing`，停掉采样定时器，
    /// 暂停隐藏处理流。
    #[wasm_bindgen(js_name = "captureElapsed")]
    pub fn capture_elapsed(&mut self) {
        if self.state != CaptureState::Capturing {
            return;
        }
        self.sampling_timer_armed = false;
        self.duration_timer_armed = false;
        self.overlay_frame_armed = false;
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.stop();
        }
        self.state = CaptureState::Analyzing;
    }

    /// 取走帧批次用于唯一一次在途分析请求。
    ///
    /// 帧数不足最小可用量时进入 error 并返回空批次；已有请求在途
    /// 时同样返回空批次（at-most-one-outstanding）。
    #[wasm_bindgen(js_name = "beginAnalysis")]
    pub fn begin_analysis(&mut self) -> Vec<String> {
        if self.state != CaptureState::Analyzing || self.analysis_in_flight {
            return Vec::new();
        }

        let sufficient = self
            .sampler
            .as_ref()
            .map(|s| s.has_minimum_frames())
            .unwrap_or(false);
        if !sufficient {
            let count = self.sampler.as_ref().map(|s| s.frame_count()).unwrap_or(0);
            self.release_resources();
            self.state = CaptureState::Error;
            self.error = Some(format!(
                "Not enough video frames captured ({count}). Ensure camera is unobstructed."
            ));
            return Vec::new();
        }

        self.analysis_in_flight = true;
        self.sampler
            .as_mut()
            .map(|s| s.take_frames())
            .unwrap_or_default()
    }

    /// 分析返回有效数值：`analyzing → age_input`，释放摄像头流。
    #[wasm_bindgen(js_name = "analysisSucceeded")]
    pub fn analysis_succeeded(&mut self, avg_heart_rate: f64) {
        if self.state != CaptureState::Analyzing || !self.analysis_in_flight {
            return;
        }
        if !avg_heart_rate.is_finite() {
            self.analysis_failed(None);
            return;
        }
        self.analysis_in_flight = false;
        self.release_resources();
        self.avg_heart_rate = Some(avg_heart_rate);
        self.state = CaptureState::AgeInput;
    }

    /// 分析失败（传输错误、上游 error 字段、响应畸形）。不重试。
    #[wasm_bindgen(js_name = "analysisFailed")]
    pub fn analysis_failed(&mut self, message: Option<String>) {
        if self.state != CaptureState::Analyzing {
            return;
        }
        self.analysis_in_flight = false;
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| ERR_ANALYSIS_DEFAULT.to_string());
        self.release_resources();
        self.state = CaptureState::Error;
        self.error = Some(message);
    }

    /// 用户提交年龄。合法则进入 recommendation；非法保持 age_input，
    /// 只挂行内错误，不重置其余字段。
    #[wasm_bindgen(js_name = "submitAge")]
    pub fn submit_age(&mut self, input: &str) -> bool {
        if self.state != CaptureState::AgeInput {
            return false;
        }
        match parse_age(input) {
            Ok(age) => {
                self.error = None;
                self.age = Some(age);
                self.state = CaptureState::Recommendation;
                true
            }
            Err(message) => {
                self.error = Some(message.to_string());
                false
            }
        }
    }

    /// recommendation 状态下的分级结论：true 表示超出年龄段正常区间，
    /// UI 只提供退出操作。
    #[wasm_bindgen(js_name = "isConcerning")]
    pub fn is_concerning(&self) -> bool {
        if self.state != CaptureState::Recommendation {
            return false;
        }
        match (self.avg_heart_rate, self.age) {
            (Some(bpm), Some(age)) => heart_rate_concerning(bpm, age),
            _ => false,
        }
    }

    /// 显式取消/关闭。任意状态可进入，幂等：重复调用不报错，
    /// 定时器标记、叠加层帧请求、流标记全部清空，结果与年龄复位。
    pub fn close(&mut self) {
        self.release_resources();
        self.avg_heart_rate = None;
        self.age = None;
        self.error = None;
        self.state = CaptureState::Idle;
    }

    // --- JS 宿主轮询的取消标记与会话视图 ---

    #[wasm_bindgen(js_name = "samplingTimerArmed")]
    pub fn sampling_timer_armed(&self) -> bool {
        self.sampling_timer_armed
    }

    #[wasm_bindgen(js_name = "durationTimerArmed")]
    pub fn duration_timer_armed(&self) -> bool {
        self.duration_timer_armed
    }

    #[wasm_bindgen(js_name = "overlayFrameArmed")]
    pub fn overlay_frame_armed(&self) -> bool {
        self.overlay_frame_armed
    }

    #[wasm_bindgen(js_name = "streamActive")]
    pub fn is_stream_active(&self) -> bool {
        self.stream_active
    }

    #[wasm_bindgen(js_name = "isStreamReady")]
    pub fn is_stream_ready(&self) -> bool {
        self.stream_ready
    }

    /// 叠加层循环的运行前提：capturing 且流就绪。
    #[wasm_bindgen(js_name = "overlayShouldRun")]
    pub fn overlay_should_run(&self) -> bool {
        self.state == CaptureState::Capturing && self.stream_ready
    }

    #[wasm_bindgen(js_name = "frameCount")]
    pub fn frame_count(&self) -> usize {
        self.sampler.as_ref().map(|s| s.frame_count()).unwrap_or(0)
    }

    #[wasm_bindgen(js_name = "avgHeartRate")]
    pub fn avg_heart_rate(&self) -> Option<f64> {
        self.avg_heart_rate
    }

    pub fn age(&self) -> Option<u8> {
        self.age
    }

    /// 当前错误消息：error 状态的主消息，或 age_input 的行内校验提示。
    #[wasm_bindgen(js_name = "errorMessage")]
    pub fn error_message(&self) -> Option<String> {
        self.error.clone()
    }
}

impl CaptureController {
    /// 统一清理路径：两个视频 sink 共用的流一并释放，所有定时器
    /// 标记与在途请求标记归零。可从任何状态重复调用。
    fn release_resources(&mut self) {
        self.sampling_timer_armed = false;
        self.duration_timer_armed = false;
        self.overlay_frame_armed = false;
        self.stream_active = false;
        self.stream_ready = false;
        self.analysis_in_flight = false;
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.stop();
        }
        self.sampler = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FPS: u32 = 10;
    const DURATION_MS: u32 = 10_000;

    fn frame() -> String {
        "data:image/jpeg;base64,abcd".to_string()
    }

    fn controller_in_capturing() -> CaptureController {
        let mut c = CaptureController::new(FPS, DURATION_MS);
        assert!(c.start(true));
        c.stream_acquired();
        c.mark_stream_ready();
        c
    }

    fn capture_n_frames(c: &mut CaptureController, n: usize) {
        for _ in 0..n {
            assert!(c.push_frame(frame(), true, 320, 240));
        }
    }

    #[test]
    fn start_requires_loaded_models() {
        let mut c = CaptureController::new(FPS, DURATION_MS);
        assert!(!c.start(false));
        assert_eq!(c.state(), CaptureState::Error);
        assert!(c.error_message().unwrap().contains("not ready"));
    }

    #[test]
    fn start_is_ignored_while_session_active() {
        let mut c = controller_in_capturing();
        assert!(!c.start(true));
        assert_eq!(c.state(), CaptureState::Capturing);
    }

    #[test]
    fn full_flow_reaches_recommendation() {
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 60);

        c.capture_elapsed();
        assert_eq!(c.state(), CaptureState::Analyzing);
        assert!(!c.sampling_timer_armed());
        assert!(!c.duration_timer_armed());

        let frames = c.begin_analysis();
        assert_eq!(frames.len(), 60);

        c.analysis_succeeded(82.5);
        assert_eq!(c.state(), CaptureState::AgeInput);
        assert_eq!(c.avg_heart_rate(), Some(82.5));
        // 分析结束后摄像头流应已释放
        assert!(!c.is_stream_active());

        assert!(c.submit_age("30"));
        assert_eq!(c.state(), CaptureState::Recommendation);
        assert!(!c.is_concerning()); // 82.5 bpm 在 18-100 岁区间内
    }

    #[test]
    fn concerning_result_for_out_of_band_rate() {
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 60);
        c.capture_elapsed();
        let _ = c.begin_analysis();
        c.analysis_succeeded(130.0);
        assert!(c.submit_age("25"));
        assert!(c.is_concerning());
    }

    #[test]
    fn insufficient_frames_go_to_error_not_age_input() {
        // fps=10、时长 10s：少于 50 帧必须进入 error
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 49);
        c.capture_elapsed();

        let frames = c.begin_analysis();
        assert!(frames.is_empty());
        assert_eq!(c.state(), CaptureState::Error);
        assert!(c.error_message().unwrap().contains("49"));
        assert!(!c.is_stream_active());
    }

    #[test]
    fn analysis_is_at_most_one_outstanding() {
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 60);
        c.capture_elapsed();

        let first = c.begin_analysis();
        assert_eq!(first.len(), 60);
        let second = c.begin_analysis();
        assert!(second.is_empty());
        assert_eq!(c.state(), CaptureState::Analyzing);
    }

    #[test]
    fn non_finite_result_is_a_failure() {
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 60);
        c.capture_elapsed();
        let _ = c.begin_analysis();
        c.analysis_succeeded(f64::NAN);
        assert_eq!(c.state(), CaptureState::Error);
        assert_eq!(c.error_message().unwrap(), ERR_ANALYSIS_DEFAULT);
    }

    #[test]
    fn analysis_failure_message_defaults_when_blank() {
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 60);
        c.capture_elapsed();
        let _ = c.begin_analysis();
        c.analysis_failed(Some("  ".to_string()));
        assert_eq!(c.error_message().unwrap(), ERR_ANALYSIS_DEFAULT);
    }

    #[test]
    fn age_validation_keeps_state_and_fields() {
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 60);
        c.capture_elapsed();
        let _ = c.begin_analysis();
        c.analysis_succeeded(90.0);

        for bad in ["0", "-1", "121", "abc", ""] {
            assert!(!c.submit_age(bad), "accepted {bad:?}");
            assert_eq!(c.state(), CaptureState::AgeInput);
            assert!(c.error_message().is_some());
            // 行内错误不得清掉已有结果
            assert_eq!(c.avg_heart_rate(), Some(90.0));
        }

        assert!(c.submit_age("120"));
        assert_eq!(c.age(), Some(120));
        assert!(c.error_message().is_none());
    }

    #[test]
    fn camera_error_messages_by_reason() {
        for (name, needle) in [
            ("NotFoundError", "No camera found"),
            ("DevicesNotFoundError", "No camera found"),
            ("NotAllowedError", "access denied"),
            ("PermissionDeniedError", "access denied"),
            ("AbortError", "check browser permissions"),
        ] {
            let mut c = controller_in_capturing();
            c.camera_error(name);
            assert_eq!(c.state(), CaptureState::Error);
            assert!(c.error_message().unwrap().contains(needle), "{name}");
            assert!(!c.is_stream_active());
            assert!(!c.sampling_timer_armed());
        }
    }

    #[test]
    fn push_frame_requires_ready_stream() {
        let mut c = CaptureController::new(FPS, DURATION_MS);
        c.start(true);
        c.stream_acquired();
        // 流未就绪前的 tick 静默跳过
        assert!(!c.push_frame(frame(), true, 320, 240));
        c.mark_stream_ready();
        assert!(c.push_frame(frame(), true, 320, 240));
    }

    #[test]
    fn overlay_runs_only_while_capturing_and_ready() {
        let mut c = CaptureController::new(FPS, DURATION_MS);
        assert!(!c.overlay_should_run());
        c.start(true);
        assert!(!c.overlay_should_run());
        c.stream_acquired();
        c.mark_stream_ready();
        assert!(c.overlay_should_run());
        c.capture_elapsed();
        assert!(!c.overlay_should_run());
    }

    #[test]
    fn close_is_idempotent_from_any_state() {
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 10);

        c.close();
        c.close(); // 重复关闭必须无副作用

        assert_eq!(c.state(), CaptureState::Idle);
        assert!(!c.sampling_timer_armed());
        assert!(!c.duration_timer_armed());
        assert!(!c.overlay_frame_armed());
        assert!(!c.is_stream_active());
        assert!(!c.is_stream_ready());
        assert_eq!(c.frame_count(), 0);
        assert!(c.avg_heart_rate().is_none());
        assert!(c.age().is_none());
        assert!(c.error_message().is_none());
    }

    #[test]
    fn close_resets_after_recommendation() {
        let mut c = controller_in_capturing();
        capture_n_frames(&mut c, 60);
        c.capture_elapsed();
        let _ = c.begin_analysis();
        c.analysis_succeeded(88.0);
        c.submit_age("40");

        c.close();
        assert_eq!(c.state(), CaptureState::Idle);
        // 复位后可以开启下一次会话
        assert!(c.start(true));
    }

    #[test]
    fn fail_does_nothing_when_idle_or_terminal() {
        let mut c = CaptureController::new(FPS, DURATION_MS);
        c.fail("boom");
        assert_eq!(c.state(), CaptureState::Idle);
    }
}
