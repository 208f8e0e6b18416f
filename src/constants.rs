/// 心率采样帧率（帧/秒），与前端捕获流程保持一致
pub const CAPTURE_FPS: u32 = 10;

/// 分析请求允许的 fps 上限
pub const MAX_CAPTURE_FPS: u32 = 60;

/// 话题字符串最大长度（字符）
pub const MAX_TOPIC_CHARS: usize = 200;

/// 聊天消息最大长度（字符）
pub const MAX_MESSAGE_CHARS: usize = 2_000;

/// YouTube videoId 最大长度
pub const MAX_VIDEO_ID_CHARS: usize = 32;

/// 百科摘要注入 prompt 前的截断长度（字符）
pub const WIKI_SUMMARY_MAX_CHARS: usize = 4_000;

/// 字幕文本注入 prompt 前的截断长度（字符）
pub const TRANSCRIPT_MAX_CHARS: usize = 12_000;
