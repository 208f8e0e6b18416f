//! StudyPulse 后端库
//!
//! 浏览器前端与各上游（压力分析、课程生成、字幕、百科、聊天补全）
//! 之间的薄 relay 层：参数校验、限流、错误归一化，不做业务计算。

pub mod config;
pub mod constants;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
