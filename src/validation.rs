/// 公共验证函数模块
/// 提供话题、聊天消息、videoId 与帧批次验证，供各 relay 路由共用。

use crate::constants::{MAX_MESSAGE_CHARS, MAX_TOPIC_CHARS, MAX_VIDEO_ID_CHARS};

/// 验证课程话题：去除首尾空白后非空，长度不超过 200 字符
pub fn validate_topic(topic: &str) -> Result<&str, &'static str> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err("Missing topic parameter");
    }
    if trimmed.chars().count() > MAX_TOPIC_CHARS {
        return Err("Topic is too long");
    }
    Ok(trimmed)
}

/// 验证聊天消息：非空、长度不超过 2000 字符
pub fn validate_message(message: &str) -> Result<&str, &'static str> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err("Message must not be empty");
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err("Message is too long");
    }
    Ok(trimmed)
}

/// 验证 YouTube videoId：仅允许字母、数字、下划线和连字符
pub fn validate_video_id(video_id: &str) -> Result<&str, &'static str> {
    if video_id.is_empty() || video_id.len() > MAX_VIDEO_ID_CHARS {
        return Err("Invalid videoId");
    }
    if !video_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err("Invalid videoId");
    }
    Ok(video_id)
}

/// 验证帧批次：非空、不超过配置上限、每帧须是 data URI 图像
pub fn validate_frames(frames: &[String], max_frames: usize) -> Result<(), String> {
    if frames.is_empty() {
        return Err("No frames provided for analysis".to_string());
    }
    if frames.len() > max_frames {
        return Err(format!(
            "Too many frames: {} exceeds the limit of {max_frames}",
            frames.len()
        ));
    }
    for (i, frame) in frames.iter().enumerate() {
        if !is_image_data_uri(frame) {
            return Err(format!("Frame {} is not an image data URI", i + 1));
        }
    }
    Ok(())
}

/// data URI 图像的基本形状检查：`data:image/...;base64,<payload>`
fn is_image_data_uri(frame: &str) -> bool {
    let Some(rest) = frame.strip_prefix("data:image/") else {
        return false;
    };
    match rest.split_once(',') {
        Some((header, payload)) => !header.is_empty() && !payload.is_empty(),
        None => false,
    }
}
