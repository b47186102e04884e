use rand::seq::SliceRandom;
use rand::Rng;
use scout_core::Platform;

use crate::controller::Viewport;

const CHROME_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Linux; Android 11; SM-G991B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
];

const FIREFOX_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/120.0",
];

const OTHER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1",
];

const DESKTOP_VIEWPORTS: &[(u32, u32)] = &[(1920, 1080), (1366, 768), (1536, 864), (1440, 900)];

/// Fingerprint applied to a new page session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport: Viewport,
}

impl FingerprintConfig {
    /// Desktop fingerprint with any known user agent.
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();
        let all: Vec<&str> = CHROME_AGENTS
            .iter()
            .chain(FIREFOX_AGENTS)
            .chain(OTHER_AGENTS)
            .copied()
            .collect();
        Self {
            user_agent: pick(&mut rng, &all).to_string(),
            viewport: desktop_viewport(&mut rng),
        }
    }

    /// Desktop fingerprint with a user agent family the platform serves well:
    /// Chrome for Instagram, Firefox for LinkedIn.
    pub fn for_platform(platform: Platform) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            user_agent: user_agent_for(platform, &mut rng).to_string(),
            viewport: desktop_viewport(&mut rng),
        }
    }
}

/// Pick a user agent for a platform.
pub fn user_agent_for<R: Rng + ?Sized>(platform: Platform, rng: &mut R) -> &'static str {
    match platform {
        Platform::Instagram => pick(rng, CHROME_AGENTS),
        Platform::LinkedIn => pick(rng, FIREFOX_AGENTS),
    }
}

fn desktop_viewport<R: Rng + ?Sized>(rng: &mut R) -> Viewport {
    let (width, height) = DESKTOP_VIEWPORTS
        .choose(rng)
        .copied()
        .unwrap_or((1920, 1080));
    Viewport {
        width,
        height,
        mobile: false,
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, agents: &[&'a str]) -> &'a str {
    agents.choose(rng).copied().unwrap_or(CHROME_AGENTS[0])
}
