pub mod analysis;
pub mod chat_provider;
pub mod transcript;
pub mod wikipedia;

/// 按字符数截断（不是字节数），避免把多字节字符切半。
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
