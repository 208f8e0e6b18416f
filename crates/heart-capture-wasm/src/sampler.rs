//! 帧采样模块
//!
//! 把实时摄像头流按固定频率采样为有界的静态帧序列。JS 宿主按
//! `tick_interval_ms` 周期驱动 `push_frame`，到达 `duration_ms` 后由
//! 控制器停止采样并取走缓冲。帧数不足理论上限一半时判定数据不足。

use wasm_bindgen::prelude::*;

/// 送往分析后端的帧统一缩放到此分辨率
pub const TARGET_FRAME_WIDTH: u32 = 320;
pub const TARGET_FRAME_HEIGHT: u32 = 240;

/// JPEG 编码质量，JS 侧 `canvas.toDataURL` 使用
pub const FRAME_JPEG_QUALITY: f64 = 0.7;

/// 帧采样器
///
/// 缓冲长度受 `fps × duration_ms / 1000` 约束，另有显式 `max_frames`
/// 上限防止宿主计时器异常时无限增长。
#[wasm_bindgen]
pub struct FrameSampler {
    fps: u32,
    duration_ms: u32,
    max_frames: usize,
    frames: Vec<String>,
    stopped: bool,
}

#[wasm_bindgen]
impl FrameSampler {
    /// 创建采样器。`fps` 为 0 时按 1 处理。
    #[wasm_bindgen(constructor)]
    pub fn new(fps: u32, duration_ms: u32) -> Self {
        let fps = fps.max(1);
        let capacity = Self::theoretical_capacity(fps, duration_ms);
        Self {
            fps,
            duration_ms,
            max_frames: capacity,
            frames: Vec::with_capacity(capacity),
            stopped: false,
        }
    }

    /// 采样定时器周期（毫秒）
    #[wasm_bindgen(js_name = "tickIntervalMs")]
    pub fn tick_interval_ms(&self) -> f64 {
        1000.0 / self.fps as f64
    }

    /// 理论最大帧数：`fps × duration / 1000`
    pub fn capacity(&self) -> usize {
        Self::theoretical_capacity(self.fps, self.duration_ms)
    }

    /// 覆盖默认帧数上限（0 视为不修改）
    #[wasm_bindgen(js_name = "setMaxFrames")]
    pub fn set_max_frames(&mut self, max_frames: usize) {
        if max_frames > 0 {
            self.max_frames = max_frames;
        }
    }

    /// 采样一帧。视频无数据、尺寸为零、采样器已停止或缓冲已满时
    /// 静默跳过（返回 false），不算错误。
    #[wasm_bindgen(js_name = "pushFrame")]
    pub fn push_frame(
        &mut self,
        frame: String,
        has_data: bool,
        video_width: u32,
        video_height: u32,
    ) -> bool {
        if self.stopped
            || !has_data
            || video_width == 0
            || video_height == 0
            || self.frames.len() >= self.max_frames
        {
            return false;
        }
        self.frames.push(frame);
        true
    }

    /// 停止采样，之后的 `push_frame` 一律跳过。可重复调用。
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    #[wasm_bindgen(js_name = "isStopped")]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[wasm_bindgen(js_name = "frameCount")]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// 最小可用数据判定：采到的帧数不得少于理论上限的一半。
    #[wasm_bindgen(js_name = "hasMinimumFrames")]
    pub fn has_minimum_frames(&self) -> bool {
        (self.frames.len() as f64) >= self.capacity() as f64 / 2.0
    }

    /// 取走全部已采帧，缓冲清空。
    #[wasm_bindgen(js_name = "takeFrames")]
    pub fn take_frames(&mut self) -> Vec<String> {
        std::mem::take(&mut self.frames)
    }
}

impl FrameSampler {
    fn theoretical_capacity(fps: u32, duration_ms: u32) -> usize {
        (fps as u64 * duration_ms as u64 / 1000) as usize
    }
}
