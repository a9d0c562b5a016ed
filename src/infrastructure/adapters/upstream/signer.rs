//! Request Signer - 上游请求签名
//!
//! bot.n.cn 要求每个请求携带一组由浏览器指纹、时间和随机数派生的头部。
//! 这不是密码学认证，只是一道混淆校验，但必须逐位一致，否则上游拒绝请求。
//!
//! 头部:
//! - device-platform: 固定 "Web"
//! - timestamp: 本地时间 + 固定的 "+08:00" 后缀
//! - access-token: 指纹哈希 + 随机哈希 + 毫秒时间，截断为 32 字符
//! - zm-ver: 固定 "1.2"
//! - zm-ua: md5(User-Agent)
//! - zm-token: md5(device-platform + timestamp + zm-ver + access-token + zm-ua)

use chrono::{DateTime, Local, TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use std::fmt::Display;
use std::sync::OnceLock;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// 参与 access-token 计算的固定来源，与实际请求的 base_url 无关
pub const ORIGIN: &str = "https://bot.n.cn";

pub const DEVICE_PLATFORM: &str = "Web";
pub const PROTOCOL_VERSION: &str = "1.2";

const REFERRER: &str = "https://bot.n.cn/chat";

const HASH_MASK_1: u64 = 268_435_455;
const HASH_MASK_2: u64 = 266_338_304;
const INT32_MAX: u64 = 2_147_483_647;
const ACCESS_TOKEN_LEN: usize = 32;

/// 指纹滚动哈希，从最后一个字符向前处理
pub fn fingerprint_hash(seed: &str) -> u64 {
    seed.chars().rev().fold(0u64, |acc, ch| {
        let code = u64::from(ch);
        let mut acc = ((acc << 6) & HASH_MASK_1) + code + (code << 14);
        let high = acc & HASH_MASK_2;
        if high != 0 {
            acc ^= high >> 21;
        }
        acc
    })
}

/// 固定的浏览器指纹串
///
/// 常量属性拼接后，`it` 从串长递减到 1、`at` 从串长递增，依次追加 `it ^ at`
pub fn fingerprint_seed() -> String {
    let mut seed = format!(
        "{}{}{}{}{}{}x{}{}{}",
        "chrome", "1.0", "zh-CN", "Win32", USER_AGENT, 1920, 1080, 24, REFERRER
    );

    let len = seed.chars().count() as u64;
    let mut at = len;
    for it in (1..=len).rev() {
        seed.push_str(&(it ^ at).to_string());
        at += 1;
    }
    seed
}

/// 指纹哈希只依赖常量，进程内只算一次
fn seed_hash() -> u64 {
    static SEED_HASH: OnceLock<u64> = OnceLock::new();
    *SEED_HASH.get_or_init(|| fingerprint_hash(&fingerprint_seed()))
}

/// `(round(random * 2147483647) ^ seed_hash) * 2147483647`
///
/// `random` 取值 [0, 1)，四舍六入五成双
pub fn unique_hash_from(random: f64) -> u128 {
    let scaled = (random * INT32_MAX as f64).round_ties_even() as u64;
    u128::from(scaled ^ seed_hash()) * u128::from(INT32_MAX)
}

/// 由给定时间和随机数生成 access-token
pub fn access_token_from(unix_millis: i64, r1: f64, r2: f64, r3: f64) -> String {
    let time_part = float_repr(unix_millis as f64 + r2 + r3);
    let raw = format!(
        "{}{}{}",
        fingerprint_hash(ORIGIN),
        unique_hash_from(r1),
        time_part
    );
    raw.replace('.', "e").chars().take(ACCESS_TOKEN_LEN).collect()
}

pub fn generate_access_token() -> String {
    access_token_from(
        Utc::now().timestamp_millis(),
        rand::random::<f64>(),
        rand::random::<f64>(),
        rand::random::<f64>(),
    )
}

/// 浮点数按十进制输出，整数值也保留 ".0"
pub(crate) fn float_repr<F: Display>(value: F) -> String {
    let repr = value.to_string();
    if repr.contains('.') || repr.contains(|c: char| c.is_ascii_alphabetic()) {
        repr
    } else {
        format!("{}.0", repr)
    }
}

/// 上游只认 "+08:00"，不随实际时区变化
pub fn iso8601_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format("%Y-%m-%dT%H:%M:%S+08:00").to_string()
}

pub fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// 单次请求的签名上下文
#[derive(Debug, Clone)]
pub struct SigningContext {
    pub timestamp: String,
    pub access_token: String,
    pub zm_ua: String,
    pub zm_token: String,
}

impl SigningContext {
    /// 使用当前时间和随机数生成
    pub fn generate() -> Self {
        Self::new(iso8601_timestamp(&Local::now()), generate_access_token())
    }

    pub fn new(timestamp: String, access_token: String) -> Self {
        let zm_ua = md5_hex(USER_AGENT);
        let zm_token = md5_hex(&format!(
            "{}{}{}{}{}",
            DEVICE_PLATFORM, timestamp, PROTOCOL_VERSION, access_token, zm_ua
        ));

        Self {
            timestamp,
            access_token,
            zm_ua,
            zm_token,
        }
    }

    pub fn header_pairs(&self) -> [(&'static str, &str); 7] {
        [
            ("device-platform", DEVICE_PLATFORM),
            ("timestamp", &self.timestamp),
            ("access-token", &self.access_token),
            ("zm-token", &self.zm_token),
            ("zm-ver", PROTOCOL_VERSION),
            ("zm-ua", &self.zm_ua),
            ("user-agent", USER_AGENT),
        ]
    }

    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::with_capacity(8);
        for (name, value) in self.header_pairs() {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_str(value)?);
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_fingerprint_hash_golden_values() {
        assert_eq!(fingerprint_hash(""), 0);
        assert_eq!(fingerprint_hash("a"), 1_589_345);
        assert_eq!(fingerprint_hash("DeepSeek"), 248_947_506);
        assert_eq!(fingerprint_hash("你好"), 465_478_525);
        assert_eq!(fingerprint_hash(ORIGIN), 124_812_755);
    }

    #[test]
    fn test_fingerprint_hash_is_deterministic() {
        let seed = fingerprint_seed();
        assert_eq!(fingerprint_hash(&seed), fingerprint_hash(&seed));
        assert_eq!(fingerprint_hash(&seed), 212_496_838);
    }

    #[test]
    fn test_fingerprint_seed_suffix() {
        let seed = fingerprint_seed();
        assert!(seed.starts_with("chrome1.0zh-CNWin32Mozilla/5.0"));
        assert!(seed.contains("1920x108024https://bot.n.cn/chat"));
        assert_eq!(seed.len(), 610);
        assert!(seed.ends_with("304306308314312314324322320322"));
    }

    #[test]
    fn test_seed_hash_uses_full_suffix_loop() {
        // 后缀循环跑满整个串长，哈希值随之固定
        assert_eq!(fingerprint_hash(&fingerprint_seed()), 212_496_838);
        assert_eq!(seed_hash(), 212_496_838);
    }

    #[test]
    fn test_unique_hash_rounds_half_to_even() {
        // 0.5 * 2147483647 = 1073741823.5 -> 1073741824
        assert_eq!(unique_hash_from(0.5), 2_762_176_492_784_160_314);
        assert_eq!(unique_hash_from(0.0), 456_333_484_644_208_186);
    }

    #[test]
    fn test_access_token_golden() {
        let token = access_token_from(1_700_000_000_000, 0.0, 0.25, 0.125);
        assert_eq!(token, "12481275545633348464420818617000");
        assert_eq!(token.len(), 32);
    }

    #[test]
    fn test_access_token_replaces_dots() {
        // 让随机哈希为 0，时间部分的小数点进入前 32 字符
        let r1 = 212_496_838.0 / 2_147_483_647.0;
        let token = access_token_from(1_700_000_000_000, r1, 0.25, 0.125);
        assert_eq!(token, "12481275501700000000000e375");
    }

    #[test]
    fn test_generated_access_token_shape() {
        let token = generate_access_token();
        assert_eq!(token.chars().count(), 32);
        assert!(!token.contains('.'));
        assert!(token.starts_with("124812755"));
    }

    #[test]
    fn test_float_repr() {
        assert_eq!(float_repr(1_700_000_000_000.0), "1700000000000.0");
        assert_eq!(float_repr(1_700_000_000_000.375), "1700000000000.375");
        assert_eq!(float_repr(1.0f32), "1.0");
        assert_eq!(float_repr(1.1f32), "1.1");
    }

    #[test]
    fn test_timestamp_has_fixed_offset() {
        let utc_minus_5 = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = utc_minus_5.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(iso8601_timestamp(&now), "2024-01-02T03:04:05+08:00");
    }

    #[test]
    fn test_signing_context_golden() {
        let context = SigningContext::new(
            "2024-01-02T03:04:05+08:00".to_string(),
            "12481275527621764927841603141700".to_string(),
        );
        assert_eq!(context.zm_ua, "22210ca73bf1af2ec2eace74a96ee356");
        assert_eq!(context.zm_token, "0d2be1e10b7e4efcfdcabf7ee861f709");
    }

    #[test]
    fn test_zm_token_recomputed_from_headers() {
        let headers = SigningContext::generate().headers().unwrap();
        let get = |name: &str| headers.get(name).unwrap().to_str().unwrap().to_string();

        let expected = md5_hex(&format!(
            "{}{}{}{}{}",
            get("device-platform"),
            get("timestamp"),
            get("zm-ver"),
            get("access-token"),
            get("zm-ua")
        ));
        assert_eq!(get("zm-token"), expected);
        assert_eq!(get("device-platform"), "Web");
        assert_eq!(get("zm-ver"), "1.2");
        assert_eq!(get("zm-ua"), md5_hex(USER_AGENT));
        assert_eq!(get("user-agent"), USER_AGENT);
        assert!(get("timestamp").ends_with("+08:00"));
    }
}
