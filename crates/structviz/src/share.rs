//! Shareable state tokens.
//!
//! A token carries the chosen structure type (or `auto`) and the raw input
//! text in query-string form, `type=<tag|auto>&data=<urlencoded text>`, so
//! it can be appended to a location string and replayed later.

use log::debug;
use url::form_urlencoded;

use structviz_core::kind::{StructureKind, parse_forced_kind};

use crate::error::ShareTokenError;

const AUTO: &str = "auto";

/// The replayable part of a run: the raw text and the forced type, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareState {
    kind: Option<StructureKind>,
    data: String,
}

impl ShareState {
    pub fn new(kind: Option<StructureKind>, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// The forced type, `None` for automatic classification.
    pub fn kind(&self) -> Option<StructureKind> {
        self.kind
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn into_parts(self) -> (Option<StructureKind>, String) {
        (self.kind, self.data)
    }

    /// Encodes the state as a query-string token.
    ///
    /// # Examples
    ///
    /// ```
    /// use structviz::share::ShareState;
    /// use structviz_core::kind::StructureKind;
    ///
    /// let token = ShareState::new(Some(StructureKind::Heap), "[3, 1, 2]").encode();
    /// assert_eq!(token, "type=heap&data=%5B3%2C+1%2C+2%5D");
    /// assert_eq!(ShareState::decode(&token).unwrap().data(), "[3, 1, 2]");
    /// ```
    pub fn encode(&self) -> String {
        let tag = self.kind.map_or(AUTO, StructureKind::as_str);
        form_urlencoded::Serializer::new(String::new())
            .append_pair("type", tag)
            .append_pair("data", &self.data)
            .finish()
    }

    /// Decodes a token produced by [`ShareState::encode`].
    ///
    /// A leading `?` or `#` is ignored, as is any parameter other than
    /// `type` and `data`. A missing `type` means `auto`.
    ///
    /// # Errors
    ///
    /// Returns [`ShareTokenError::MissingData`] when there is no `data`
    /// parameter and [`ShareTokenError::UnknownType`] when `type` names no
    /// structure kind.
    pub fn decode(token: &str) -> Result<Self, ShareTokenError> {
        let query = token.trim().trim_start_matches(['?', '#']);

        let mut kind = None;
        let mut data = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "type" => {
                    kind = parse_forced_kind(&value)
                        .map_err(|_| ShareTokenError::UnknownType(value.into_owned()))?;
                }
                "data" => data = Some(value.into_owned()),
                _ => {}
            }
        }

        let data = data.ok_or(ShareTokenError::MissingData)?;
        debug!(kind:? = kind, length = data.len(); "Decoded share token");
        Ok(Self { kind, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_type() {
        let token = ShareState::new(None, "1, 2, 3").encode();

        assert!(token.starts_with("type=auto&"));
        let state = ShareState::decode(&token).unwrap();
        assert_eq!(state.kind(), None);
        assert_eq!(state.data(), "1, 2, 3");
    }

    #[test]
    fn test_multiline_text_survives() {
        let text = "{\n  \"a\": \"x&y=z\",\n  \"b\": \"100%\"\n}";
        let state = ShareState::new(Some(StructureKind::HashTable), text);

        assert_eq!(ShareState::decode(&state.encode()).unwrap(), state);
    }

    #[test]
    fn test_leading_marker_and_extra_parameters() {
        let state = ShareState::decode("#data=%5B1%5D&theme=dark&type=grid").unwrap();

        assert_eq!(state.kind(), Some(StructureKind::Grid));
        assert_eq!(state.data(), "[1]");

        let state = ShareState::decode("?data=5").unwrap();
        assert_eq!(state.kind(), None);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            ShareState::decode("type=array").unwrap_err(),
            ShareTokenError::MissingData
        );
        assert_eq!(
            ShareState::decode("type=pie&data=1").unwrap_err(),
            ShareTokenError::UnknownType("pie".to_string())
        );
    }
}
