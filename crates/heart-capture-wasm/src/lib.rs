//! 心率捕获 WASM 库
//!
//! 浏览器端心率检测流程的全部状态与几何逻辑，编译为 WebAssembly。
//! MediaStream、canvas、setInterval/requestAnimationFrame 等浏览器
//! 句柄由 JS 宿主持有，本库只做可测试的纯逻辑。
//!
//! ## 模块
//! - `session`: 捕获流程有限状态机（会话属主）
//! - `sampler`: 摄像头帧定频采样与最小可用数据判定
//! - `overlay`: 前额 ROI 叠加层几何与循环决策
//! - `classify`: 年龄段心率分级表

pub mod classify;
pub mod overlay;
pub mod sampler;
pub mod session;

// 重新导出核心类型，方便外部使用
pub use classify::{heart_rate_concerning, parse_age};
pub use overlay::OverlayRenderer;
pub use sampler::FrameSampler;
pub use session::{CaptureController, CaptureState};
