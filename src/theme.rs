//! Static theme table: six activity-intensity presets plus the `rest`
//! default. The table is data, not configuration; it matches the CSS custom
//! properties the page shell consumes.

/// Visual parameter set for one activity level.
#[derive(Debug)]
pub struct Theme {
    pub name: &'static str,
    pub display: &'static str,
    pub gradient: &'static str,
    /// Accent colors, most prominent first.
    pub colors: [&'static str; 3],
    pub animation_speed: &'static str,
    pub glow_color: &'static str,
    pub glow_size: &'static str,
    pub pulse_speed: &'static str,
    pub emoji: &'static str,
}

pub const REST: Theme = Theme {
    name: "rest",
    display: "休息日",
    gradient: "linear-gradient(135deg, #1a1a2e 0%, #16213e 100%)",
    colors: ["#1a1a2e", "#16213e", "#0f3460"],
    animation_speed: "30s",
    glow_color: "rgba(100, 100, 150, 0.3)",
    glow_size: "10px",
    pulse_speed: "4s",
    emoji: "🛌",
};

pub const RELAXED: Theme = Theme {
    name: "relaxed",
    display: "轻松日",
    gradient: "linear-gradient(135deg, #134e5e 0%, #71b280 100%)",
    colors: ["#134e5e", "#71b280", "#a8e6cf"],
    animation_speed: "20s",
    glow_color: "rgba(113, 178, 128, 0.5)",
    glow_size: "20px",
    pulse_speed: "3s",
    emoji: "🌱",
};

pub const PRODUCTIVE: Theme = Theme {
    name: "productive",
    display: "充实日",
    gradient: "linear-gradient(135deg, #f5af19 0%, #f12711 100%)",
    colors: ["#f12711", "#f5af19", "#ff9a9e"],
    animation_speed: "15s",
    glow_color: "rgba(245, 175, 25, 0.6)",
    glow_size: "25px",
    pulse_speed: "2s",
    emoji: "⚡",
};

pub const FOCUSED: Theme = Theme {
    name: "focused",
    display: "专注日",
    gradient: "linear-gradient(135deg, #ff416c 0%, #ff4b2b 100%)",
    colors: ["#ff416c", "#ff4b2b", "#ff9a9e"],
    animation_speed: "10s",
    glow_color: "rgba(255, 75, 43, 0.7)",
    glow_size: "30px",
    pulse_speed: "1s",
    emoji: "🔥",
};

pub const INTENSE: Theme = Theme {
    name: "intense",
    display: "极限日",
    gradient: "linear-gradient(135deg, #8e2de2 0%, #4a00e0 100%)",
    colors: ["#8e2de2", "#4a00e0", "#00c6ff"],
    animation_speed: "8s",
    glow_color: "rgba(142, 45, 226, 0.8)",
    glow_size: "35px",
    pulse_speed: "0.8s",
    emoji: "🌟",
};

pub const LEGENDARY: Theme = Theme {
    name: "legendary",
    display: "超神日",
    gradient: "linear-gradient(135deg, #00c6ff 0%, #0072ff 100%)",
    colors: ["#00c6ff", "#0072ff", "#ffffff"],
    animation_speed: "5s",
    glow_color: "rgba(0, 198, 255, 1)",
    glow_size: "50px",
    pulse_speed: "0.5s",
    emoji: "💥",
};

/// All variants, ordered by increasing activity intensity.
pub const ALL: [&Theme; 6] = [
    &REST,
    &RELAXED,
    &PRODUCTIVE,
    &FOCUSED,
    &INTENSE,
    &LEGENDARY,
];

/// Total lookup; unknown or missing names fall back to `rest`.
pub fn resolve(name: &str) -> &'static Theme {
    ALL.iter().find(|theme| theme.name == name).copied().unwrap_or(&REST)
}

/// Strict `#RRGGBB` check, used for every externally-sourced color.
pub fn is_hex_color(value: &str) -> bool {
    let trimmed = value.trim();
    let Some(rest) = trimmed.strip_prefix('#') else {
        return false;
    };
    rest.len() == 6 && rest.chars().all(|c| c.is_ascii_hexdigit())
}

/// First 6-digit hex color inside a gradient spec, used as the page accent.
/// Not necessarily `colors[0]`; the gradient's leading stop wins.
pub fn first_gradient_color(gradient: &str) -> &str {
    let mut search = gradient;
    while let Some(pos) = search.find('#') {
        let candidate = &search[pos..];
        if candidate.len() >= 7 && candidate[1..7].chars().all(|c| c.is_ascii_hexdigit()) {
            return &candidate[..7];
        }
        search = &search[pos + 1..];
    }
    "#ffffff"
}
