//! Flag-targeting user context
//!
//! Built from the player's name (or anonymously) plus facts sniffed from
//! the user agent. Serialized as a single-kind `user` context.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::consts::GAME_VERSION;
use crate::platform::Environment;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserContext {
    pub kind: &'static str,
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    pub anonymous: bool,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl UserContext {
    /// Context for a player who has not entered a name
    pub fn anonymous<R: Rng>(rng: &mut R, env: &Environment, now_ms: f64) -> Self {
        Self {
            kind: "user",
            key: format!("anonymous-{}", base36(rng, 13)),
            name: "Anonymous Player".to_string(),
            email: String::new(),
            anonymous: true,
            attributes: attributes(env, now_ms, true, rng),
        }
    }

    /// Context for a named player. Runs of whitespace in the name collapse
    /// to one space.
    pub fn named<R: Rng>(
        rng: &mut R,
        name: &str,
        env: &Environment,
        now_ms: f64,
        first_session: bool,
    ) -> Self {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            kind: "user",
            key: format!("{}-{}", slug(&name, "-"), now_ms as u64),
            email: format!("{}@dino-run.game", slug(&name, ".")),
            name,
            anonymous: false,
            attributes: attributes(env, now_ms, first_session, rng),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!(r#"{{"kind":"user","key":"{}"}}"#, self.key))
    }

    /// URL-safe base64 of the JSON form, used in service paths
    pub fn encoded(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_json())
    }
}

/// Lowercase and join whitespace-separated words with `sep`
fn slug(name: &str, sep: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(sep)
}

fn base36<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from_digit(rng.random_range(0..36u32), 36).unwrap_or('0'))
        .collect()
}

/// Rough country guess for a handful of common zones
pub fn country_from_timezone(timezone: &str) -> &'static str {
    match timezone {
        "America/New_York" | "America/Los_Angeles" | "America/Chicago" | "America/Denver" => "US",
        "America/Toronto" | "America/Vancouver" => "CA",
        "Europe/London" => "GB",
        "Europe/Paris" => "FR",
        "Europe/Berlin" => "DE",
        "Europe/Madrid" => "ES",
        "Europe/Rome" => "IT",
        "Europe/Amsterdam" => "NL",
        "Asia/Tokyo" => "JP",
        "Asia/Shanghai" => "CN",
        "Asia/Seoul" => "KR",
        "Asia/Hong_Kong" => "HK",
        "Asia/Singapore" => "SG",
        "Australia/Sydney" | "Australia/Melbourne" => "AU",
        _ => "Unknown",
    }
}

fn attributes<R: Rng>(
    env: &Environment,
    now_ms: f64,
    first_session: bool,
    rng: &mut R,
) -> BTreeMap<String, Value> {
    let (browser_name, browser_version) = browser(&env.user_agent);
    let timezone = if env.timezone.is_empty() {
        "Unknown"
    } else {
        env.timezone.as_str()
    };
    let session_id = format!("session-{}-{}", now_ms as u64, base36(rng, 7));
    let timestamp = DateTime::<Utc>::from_timestamp_millis(now_ms as i64)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default();
    BTreeMap::from([
        ("deviceType".to_string(), Value::from(device_type(&env.user_agent))),
        ("operatingSystem".to_string(), Value::from(operating_system(&env.user_agent))),
        ("browserName".to_string(), Value::from(browser_name)),
        ("browserVersion".to_string(), Value::from(browser_version)),
        ("screenWidth".to_string(), Value::from(env.screen_width)),
        ("screenHeight".to_string(), Value::from(env.screen_height)),
        ("screenRatio".to_string(), Value::from(env.pixel_ratio)),
        ("country".to_string(), Value::from(country_from_timezone(timezone))),
        ("timezone".to_string(), Value::from(timezone)),
        ("language".to_string(), Value::from(env.language.clone())),
        ("gameVersion".to_string(), Value::from(GAME_VERSION)),
        ("firstSession".to_string(), Value::from(first_session)),
        ("sessionId".to_string(), Value::from(session_id)),
        ("userAgent".to_string(), Value::from(env.user_agent.clone())),
        ("platform".to_string(), Value::from(env.platform.clone())),
        ("timestamp".to_string(), Value::from(timestamp)),
    ])
}

pub fn device_type(ua: &str) -> &'static str {
    let ua = ua.to_lowercase();
    const TABLET: [&str; 4] = ["tablet", "ipad", "playbook", "silk"];
    const MOBILE: [&str; 14] = [
        "mobile", "iphone", "ipod", "android", "blackberry", "opera mini", "opera mobi",
        "skyfire", "maemo", "windows phone", "palm", "iemobile", "symbian", "fennec",
    ];
    if TABLET.iter().any(|m| ua.contains(m)) {
        "tablet"
    } else if MOBILE.iter().any(|m| ua.contains(m)) {
        "mobile"
    } else {
        "desktop"
    }
}

/// `<major>.<minor>` immediately after `marker`, accepting `_` as separator
fn version_after(ua: &str, marker: &str) -> Option<String> {
    let start = ua.find(marker)? + marker.len();
    let rest = &ua[start..];
    let major: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let sep = rest[major.len()..].chars().next()?;
    if major.is_empty() || !(sep == '.' || sep == '_') {
        return None;
    }
    let minor: String = rest[major.len() + 1..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if minor.is_empty() {
        return None;
    }
    Some(format!("{}.{}", major, minor))
}

pub fn operating_system(ua: &str) -> String {
    if ua.contains("Windows NT") {
        return if ua.contains("Windows NT 10") {
            "Windows 10+".to_string()
        } else if ua.contains("Windows NT 6") {
            "Windows 7/8".to_string()
        } else {
            "Windows".to_string()
        };
    }
    if ua.contains("Mac OS X") {
        return match version_after(ua, "Mac OS X ") {
            Some(v) => format!("macOS {}", v),
            None => "macOS".to_string(),
        };
    }
    if ua.contains("Android") {
        return match version_after(ua, "Android ") {
            Some(v) => format!("Android {}", v),
            None => "Android".to_string(),
        };
    }
    if ["iPhone", "iPad", "iPod"].iter().any(|m| ua.contains(m)) {
        return match version_after(ua, "OS ") {
            Some(v) => format!("iOS {}", v),
            None => "iOS".to_string(),
        };
    }
    if ua.contains("Linux") {
        return "Linux".to_string();
    }
    if ua.contains("CrOS") {
        return "Chrome OS".to_string();
    }
    "Unknown".to_string()
}

/// Browser name and version
pub fn browser(ua: &str) -> (&'static str, String) {
    let version = |marker: &str| version_after(ua, marker).unwrap_or_else(|| "Unknown".to_string());
    let is_edge = ua.contains("Edg");
    let is_opera = ua.contains("OPR");

    if ua.contains("Chrome") && !is_edge && !is_opera {
        ("Chrome", version("Chrome/"))
    } else if ua.contains("Firefox") {
        ("Firefox", version("Firefox/"))
    } else if ua.contains("Safari") && !ua.contains("Chrome") && !ua.contains("CriOS") {
        ("Safari", version("Version/"))
    } else if is_edge {
        ("Edge", version("Edg/"))
    } else if is_opera {
        ("Opera", version("OPR/"))
    } else {
        ("Unknown", "Unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const MAC_CHROME: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const WIN_EDGE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";

    fn env(ua: &str) -> Environment {
        Environment {
            user_agent: ua.to_string(),
            language: "en-US".to_string(),
            screen_width: 1440,
            screen_height: 900,
            pixel_ratio: 2.0,
            timezone: "Europe/Paris".to_string(),
            platform: "MacIntel".to_string(),
        }
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(3)
    }

    #[test]
    fn test_named_key_and_email() {
        let ctx = UserContext::named(&mut rng(), "  Ada  Lovelace ", &env(MAC_CHROME), 1_700_000_000_000.0, true);
        assert_eq!(ctx.key, "ada-lovelace-1700000000000");
        assert_eq!(ctx.email, "ada.lovelace@dino-run.game");
        assert_eq!(ctx.name, "Ada Lovelace");
        assert!(!ctx.anonymous);
        assert_eq!(ctx.attribute("firstSession"), Some(&Value::from(true)));
        let tabbed = UserContext::named(&mut rng(), "Ada\tLovelace\n", &env(MAC_CHROME), 1.0, true);
        assert_eq!(tabbed.name, "Ada Lovelace");
    }

    #[test]
    fn test_anonymous_key() {
        let ctx = UserContext::anonymous(&mut rng(), &env(MAC_CHROME), 0.0);
        assert!(ctx.key.starts_with("anonymous-"));
        assert_eq!(ctx.key.len(), "anonymous-".len() + 13);
        assert!(ctx.anonymous);
        assert!(ctx.email.is_empty());
    }

    #[test]
    fn test_user_agent_sniffing() {
        assert_eq!(device_type(MAC_CHROME), "desktop");
        assert_eq!(device_type(IPHONE_SAFARI), "mobile");
        assert_eq!(operating_system(MAC_CHROME), "macOS 10.15");
        assert_eq!(operating_system(IPHONE_SAFARI), "macOS");
        assert_eq!(operating_system(WIN_EDGE), "Windows 10+");
        assert_eq!(browser(MAC_CHROME), ("Chrome", "120.0".to_string()));
        assert_eq!(browser(IPHONE_SAFARI), ("Safari", "17.1".to_string()));
        assert_eq!(browser(WIN_EDGE), ("Edge", "120.0".to_string()));
        assert_eq!(browser("curl/8.0").0, "Unknown");
    }

    #[test]
    fn test_json_shape() {
        let ctx = UserContext::named(&mut rng(), "Bo", &env(MAC_CHROME), 5.0, false);
        let json: Value = serde_json::from_str(&ctx.to_json()).unwrap();
        assert_eq!(json["kind"], "user");
        assert_eq!(json["key"], "bo-5");
        assert_eq!(json["browserName"], "Chrome");
        assert!(!ctx.encoded().contains('='));
    }

    #[test]
    fn test_location_and_session_attributes() {
        let ctx = UserContext::named(&mut rng(), "Bo", &env(MAC_CHROME), 1_700_000_000_000.0, false);
        assert_eq!(ctx.attribute("timezone"), Some(&Value::from("Europe/Paris")));
        assert_eq!(ctx.attribute("country"), Some(&Value::from("FR")));
        assert_eq!(ctx.attribute("screenRatio"), Some(&Value::from(2.0)));
        assert_eq!(ctx.attribute("platform"), Some(&Value::from("MacIntel")));
        assert_eq!(
            ctx.attribute("timestamp"),
            Some(&Value::from("2023-11-14T22:13:20.000Z"))
        );

        let session = ctx.attribute("sessionId").and_then(Value::as_str).unwrap();
        assert!(session.starts_with("session-1700000000000-"));
        assert_eq!(session.len(), "session-1700000000000-".len() + 7);

        let unknown = UserContext::anonymous(&mut rng(), &Environment::default(), 0.0);
        assert_eq!(unknown.attribute("timezone"), Some(&Value::from("Unknown")));
        assert_eq!(unknown.attribute("country"), Some(&Value::from("Unknown")));
    }

    #[test]
    fn test_country_table() {
        assert_eq!(country_from_timezone("America/Chicago"), "US");
        assert_eq!(country_from_timezone("America/Vancouver"), "CA");
        assert_eq!(country_from_timezone("Asia/Hong_Kong"), "HK");
        assert_eq!(country_from_timezone("Australia/Melbourne"), "AU");
        assert_eq!(country_from_timezone("Africa/Cairo"), "Unknown");
        assert_eq!(country_from_timezone(""), "Unknown");
    }
}
