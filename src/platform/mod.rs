//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall clock time
//! - Browser environment facts used for flag targeting
//! - Run seeds

/// Facts about the host environment that feed the user context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    pub user_agent: String,
    pub language: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub pixel_ratio: f64,
    /// IANA zone name, empty when unknown
    pub timezone: String,
    pub platform: String,
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for a new run
pub fn run_seed() -> u64 {
    now_ms() as u64
}

/// Read navigator and screen details (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn environment() -> Environment {
    let Some(window) = web_sys::window() else {
        return Environment::default();
    };
    let navigator = window.navigator();
    let (screen_width, screen_height) = window
        .screen()
        .ok()
        .map(|s| {
            (
                s.width().unwrap_or(0).max(0) as u32,
                s.height().unwrap_or(0).max(0) as u32,
            )
        })
        .unwrap_or((0, 0));

    let ratio = window.device_pixel_ratio();

    Environment {
        user_agent: navigator.user_agent().unwrap_or_default(),
        language: navigator.language().unwrap_or_default(),
        screen_width,
        screen_height,
        pixel_ratio: if ratio > 0.0 { ratio } else { 1.0 },
        timezone: browser_timezone(),
        platform: navigator.platform().unwrap_or_default(),
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_timezone() -> String {
    let format = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new());
    js_sys::Reflect::get(&format.resolved_options(), &"timeZone".into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
pub fn environment() -> Environment {
    Environment {
        user_agent: format!("dino-run/{} ({})", crate::consts::GAME_VERSION, std::env::consts::OS),
        language: std::env::var("LANG").unwrap_or_default(),
        screen_width: 0,
        screen_height: 0,
        pixel_ratio: 1.0,
        timezone: std::env::var("TZ").unwrap_or_default(),
        platform: std::env::consts::OS.to_string(),
    }
}
