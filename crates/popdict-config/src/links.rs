use std::env;

use popdict_types::EntryId;
use serde::{Deserialize, Serialize};

/// External pages the popover links to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Links {
    /// Base of the full detail page, the entry id is appended
    pub detail_url_base: String,
    pub login_url: String,
}

impl Default for Links {
    fn default() -> Self {
        Self {
            detail_url_base: "https://web.shanbay.com/wordsweb/#/detail/".to_string(),
            login_url: "https://web.shanbay.com/web/account/login/".to_string(),
        }
    }
}

impl Links {
    pub fn new() -> Self {
        let defaults = Self::default();

        let detail_url_base =
            env::var("POPDICT_DETAIL_URL").unwrap_or(defaults.detail_url_base);
        let login_url = env::var("POPDICT_LOGIN_URL").unwrap_or(defaults.login_url);

        Self {
            detail_url_base,
            login_url,
        }
    }

    pub fn detail_url(&self, id: &EntryId) -> String {
        format!("{}{}", self.detail_url_base, id)
    }
}
