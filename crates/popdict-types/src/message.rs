use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entry::EntryId;

/// Messages the popover sends to the privileged provider process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    Lookup {
        word: String,
    },
    GetWordExample {
        id: EntryId,
    },
    AddOrForget {
        word: String,
        #[serde(rename = "wordId")]
        word_id: EntryId,
    },
    ForwardAudio {
        url: String,
    },
}

impl Request {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Lookup { .. } => "lookup",
            Request::GetWordExample { .. } => "get-examples",
            Request::AddOrForget { .. } => "toggle-favorite",
            Request::ForwardAudio { .. } => "forward-audio",
        }
    }
}

pub const STATUS_OK: u16 = 200;

/// `{status, data}` reply returned for every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: u16,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn new(status: u16, data: serde_json::Value) -> Self {
        Self { status, data }
    }

    pub fn ok(data: serde_json::Value) -> Self {
        Self::new(STATUS_OK, data)
    }

    pub fn status(status: u16) -> Self {
        Self::new(status, serde_json::Value::Null)
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data)
    }
}
