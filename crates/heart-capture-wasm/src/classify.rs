//! 心率分级模块
//!
//! 按年龄段查表判断平均心率是否处于正常区间。区间为闭区间，
//! 超出区间的结果视为 concerning，由 UI 决定是否仅提供退出操作。

use wasm_bindgen::prelude::*;

/// 单个年龄段的正常心率区间（均为闭区间）
#[derive(Clone, Copy, Debug)]
pub struct AgeBand {
    pub min_age: u8,
    pub max_age: u8,
    pub min_bpm: f64,
    pub max_bpm: f64,
}

/// 年龄段表。1-120 全覆盖，无缝隙无重叠。
pub const AGE_BANDS: [AgeBand; 5] = [
    AgeBand { min_age: 1, max_age: 5, min_bpm: 80.0, max_bpm: 150.0 },
    AgeBand { min_age: 6, max_age: 12, min_bpm: 70.0, max_bpm: 120.0 },
    AgeBand { min_age: 13, max_age: 17, min_bpm: 60.0, max_bpm: 100.0 },
    AgeBand { min_age: 18, max_age: 100, min_bpm: 70.0, max_bpm: 100.0 },
    AgeBand { min_age: 101, max_age: 120, min_bpm: 70.0, max_bpm: 100.0 },
];

pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 120;

/// 查找年龄所属区间。年龄在进入本函数前已通过 `parse_age` 校验，
/// 1-120 之外的值返回 None。
pub fn band_for_age(age: u8) -> Option<&'static AgeBand> {
    AGE_BANDS
        .iter()
        .find(|band| age >= band.min_age && age <= band.max_age)
}

/// 判断心率是否超出该年龄段的正常区间。
///
/// 仅在 recommendation 状态调用，是 `(heart_rate, age)` 的纯函数。
pub fn heart_rate_concerning(bpm: f64, age: u8) -> bool {
    match band_for_age(age) {
        Some(band) => bpm < band.min_bpm || bpm > band.max_bpm,
        None => false,
    }
}

/// 解析用户输入的年龄字符串，范围 1-120（含端点）。
///
/// 非数字、0、负数、超过 120 均返回错误，错误消息直接用于行内提示。
pub fn parse_age(input: &str) -> Result<u8, &'static str> {
    const INVALID: &str = "Please enter a valid age (1-120).";
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(INVALID);
    }
    match trimmed.parse::<i64>() {
        Ok(age) if (MIN_AGE as i64..=MAX_AGE as i64).contains(&age) => Ok(age as u8),
        _ => Err(INVALID),
    }
}

/// JS 侧直接查表用的导出。`age` 接收 f64 以兼容 JS number，
/// 非整数或越界年龄返回 false（与 UI 前置校验一致）。
#[wasm_bindgen(js_name = "isHeartRateConcerning")]
pub fn is_heart_rate_concerning(bpm: f64, age: f64) -> bool {
    if age.fract() != 0.0 || !(MIN_AGE as f64..=MAX_AGE as f64).contains(&age) {
        return false;
    }
    heart_rate_concerning(bpm, age as u8)
}

/// JS 侧的年龄校验导出。合法时返回解析后的年龄，否则返回 None。
#[wasm_bindgen(js_name = "validateAge")]
pub fn validate_age(input: &str) -> Option<u8> {
    parse_age(input).ok()
}
