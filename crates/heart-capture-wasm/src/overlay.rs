//! 前额 ROI 叠加层模块
//!
//! 捕获期间按显示帧频率在预览画布上描出前额区域，仅用于用户反馈，
//! 不参与后端分析。几何计算：下边取眉毛最高点减去 5% 脸高的余量，
//! 上边取人脸框顶部加 5% 脸高，宽度取脸宽的 65% 水平居中。

use serde::Serialize;
use wasm_bindgen::prelude::*;

/// 前额宽度占人脸框宽度的比例
pub const FOREHEAD_WIDTH_FACTOR: f64 = 0.65;
/// 上下边余量占人脸框高度的比例
pub const FACE_MARGIN_FACTOR: f64 = 0.05;
/// 小于此边长（像素）的 ROI 视为该帧检测不可靠，不绘制
pub const MIN_ROI_SIDE_PX: f64 = 10.0;

/// 叠加层描边样式，JS 侧直接取用
pub const ROI_STROKE_STYLE: &str = "rgba(192, 132, 252, 0.9)";
pub const ROI_LINE_WIDTH: f64 = 3.0;

/// 一次叠加帧的决策
#[wasm_bindgen]
#[derive(Clone, Copy)]
pub struct OverlayPlan {
    /// 0=停止循环，1=本帧跳过但继续重排，2=检测并绘制
    pub action: u8,
    /// 绘制前是否需要把画布调整到显示尺寸
    pub resize: bool,
}

pub const OVERLAY_STOP: u8 = 0;
pub const OVERLAY_RETRY: u8 = 1;
pub const OVERLAY_DRAW: u8 = 2;

/// 前额矩形，画布坐标系
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeheadRoi {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// 叠加层渲染器
///
/// 记录上一次的画布尺寸，只有显示尺寸变化时才要求重设画布，
/// 避免每帧 resize 清空画布内容。
#[wasm_bindgen]
pub struct OverlayRenderer {
    canvas_width: f64,
    canvas_height: f64,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl OverlayRenderer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            canvas_width: 0.0,
            canvas_height: 0.0,
        }
    }

    /// 每个显示帧调用一次，决定本帧做什么。
    ///
    /// 前置条件（模型已加载、流就绪、仍处于 capturing）任一不满足
    /// 时返回停止；显示尺寸为零时本帧跳过但保持循环。
    pub fn plan(
        &mut self,
        model_loaded: bool,
        stream_ready: bool,
        capturing: bool,
        display_width: f64,
        display_height: f64,
    ) -> OverlayPlan {
        if !model_loaded || !stream_ready || !capturing {
            return OverlayPlan {
                action: OVERLAY_STOP,
                resize: false,
            };
        }
        if display_width <= 0.0 || display_height <= 0.0 {
            return OverlayPlan {
                action: OVERLAY_RETRY,
                resize: false,
            };
        }

        let resize = display_width != self.canvas_width || display_height != self.canvas_height;
        if resize {
            self.canvas_width = display_width;
            self.canvas_height = display_height;
        }
        OverlayPlan {
            action: OVERLAY_DRAW,
            resize,
        }
    }

    /// 计算前额矩形，序列化为 JsValue；该帧检测不可靠时返回 null。
    ///
    /// `eyebrow_ys` 为左右眉毛全部关键点的 y 坐标（已缩放到显示尺寸）。
    #[wasm_bindgen(js_name = "foreheadRoi")]
    pub fn forehead_roi_js(
        &self,
        face_x: f64,
        face_y: f64,
        face_width: f64,
        face_height: f64,
        eyebrow_ys: &[f64],
    ) -> JsValue {
        match forehead_roi(face_x, face_y, face_width, face_height, eyebrow_ys) {
            Some(roi) => serde_wasm_bindgen::to_value(&roi).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// 循环是否重排下一帧：仍在 capturing 时继续，否则干净退出。
    #[wasm_bindgen(js_name = "shouldRearm")]
    pub fn should_rearm(&self, capturing: bool) -> bool {
        capturing
    }
}

/// 前额矩形几何计算。
///
/// 无眉毛关键点、人脸框尺寸非法、或算出的宽高不超过
/// `MIN_ROI_SIDE_PX` 时返回 None。
pub fn forehead_roi(
    face_x: f64,
    face_y: f64,
    face_width: f64,
    face_height: f64,
    eyebrow_ys: &[f64],
) -> Option<ForeheadRoi> {
    if eyebrow_ys.is_empty() || face_width <= 0.0 || face_height <= 0.0 {
        return None;
    }

    let eyebrow_top_y = eyebrow_ys.iter().copied().fold(f64::INFINITY, f64::min);
    let forehead_bottom = eyebrow_top_y - face_height * FACE_MARGIN_FACTOR;
    let forehead_top = face_y + face_height * FACE_MARGIN_FACTOR;
    let height = forehead_bottom - forehead_top;

    let width = face_width * FOREHEAD_WIDTH_FACTOR;
    let x = face_x + (face_width - width) / 2.0;

    if height <= MIN_ROI_SIDE_PX || width <= MIN_ROI_SIDE_PX {
        return None;
    }

    Some(ForeheadRoi {
        x,
        y: forehead_top,
        width,
        height,
    })
}
