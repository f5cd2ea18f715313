//! 通用编码工具 (Encoding Helpers)
//!
//! 宽松 Base64 解码、Base64 启发式判断以及 URL 内容摘要。

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::prelude::*;

/// 宽松的标准字母表引擎：容忍非规范尾部比特
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

const STANDARD_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// 解码分享链接中常见的非规范 Base64
///
/// 去除首尾空白与换行，URL-safe 字符映射回标准字母表，并补齐缺失的填充。
pub fn decode_base64_bytes(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let mut clean: String = input
        .trim()
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let rem = clean.len() % 4;
    if rem != 0 {
        clean.push_str(&"=".repeat(4 - rem));
    }
    LENIENT_STANDARD.decode(clean.as_bytes())
}

/// 解码为字符串，非法 UTF-8 字节按替换字符处理
pub fn decode_base64(input: &str) -> Result<String, base64::DecodeError> {
    decode_base64_bytes(input).map(|b| String::from_utf8_lossy(&b).into_owned())
}

/// 不严格地判断字符串是否为 Base64
///
/// 许多分享链接并不符合规范，因此只在字母表合法、可解码且解码结果为合法 UTF-8 时判真。
pub fn is_likely_base64(s: &str) -> bool {
    if s.trim().is_empty() {
        return false;
    }

    let mut candidate = s;
    let without_one_pad = s.strip_suffix('=').unwrap_or(s);
    if !without_one_pad.contains('=') {
        candidate = without_one_pad;
        if !candidate.chars().all(|c| STANDARD_ALPHABET.contains(c)) {
            return false;
        }
    }

    match decode_base64_bytes(candidate) {
        Ok(bytes) => std::str::from_utf8(&bytes).is_ok(),
        Err(_) => false,
    }
}

/// 分享链接编码统一使用 URL-safe 无填充格式
pub fn encode_base64(input: &str) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(input.as_bytes())
}

/// 内容寻址摘要 (BLAKE3 hex, 64 chars)
pub fn digest_hex(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}
