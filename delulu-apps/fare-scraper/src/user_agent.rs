//!  Delulu Fare Scraper
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Client identification strings presented by the browser session.

use rand::seq::SliceRandom;

/// Desktop browser user agents rotated between sessions
const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:131.0) Gecko/20100101 Firefox/131.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.6; rv:130.0) Gecko/20100101 Firefox/130.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:129.0) Gecko/20100101 Firefox/129.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36 Edg/129.0.0.0",
];

/// Supplies the user agent for each new browser session
pub trait UserAgentSource {
    fn user_agent(&self) -> String;
}

/// Always the same string. Useful for tests and reproducible runs.
#[derive(Debug, Clone)]
pub struct FixedUserAgent(pub String);

impl UserAgentSource for FixedUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}

/// Uniform pick from the built-in pool on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUserAgent;

impl RandomUserAgent {
    pub fn pool() -> &'static [&'static str] {
        USER_AGENT_POOL
    }
}

impl UserAgentSource for RandomUserAgent {
    fn user_agent(&self) -> String {
        USER_AGENT_POOL
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENT_POOL[0])
            .to_string()
    }
}

impl<T: UserAgentSource + ?Sized> UserAgentSource for &T {
    fn user_agent(&self) -> String {
        (**self).user_agent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_is_fixed() {
        let ua = FixedUserAgent("test-agent/1.0".to_string());
        assert_eq!(ua.user_agent(), "test-agent/1.0");
        assert_eq!(ua.user_agent(), ua.user_agent());
    }

    #[test]
    fn random_draws_from_pool() {
        let ua = RandomUserAgent;
        for _ in 0..50 {
            let picked = ua.user_agent();
            assert!(RandomUserAgent::pool().contains(&picked.as_str()));
        }
    }
}
