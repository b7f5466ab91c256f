//! Relaxed JSON
//!
//! Manifests may carry `//` and `/* */` comments and trailing commas.
//! `json_comments` blanks both out in place before the text reaches
//! `serde_json`, so positions in parse errors still point at the source.

use json_comments::{strip_comments_in_place, CommentSettings};
use serde::de::{DeserializeOwned, Error as _};

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, serde_json::Error> {
    let mut text = input.to_owned();
    strip_comments_in_place(&mut text, CommentSettings::c_style(), true)
        .map_err(serde_json::Error::custom)?;
    serde_json::from_str(&text)
}
