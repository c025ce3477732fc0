use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Text", inline)]
#[serde(default)]
/// Text effect defaults (counter, typewriter, scramble).
pub struct TextOptions {
    /// Counter run time in milliseconds.
    pub counter_ms: u64,
    /// Milliseconds per typed character.
    pub typewriter_char_ms: u64,
    /// Whether the typewriter shows a trailing cursor.
    pub typewriter_cursor: bool,
    /// Cursor glyph.
    pub cursor_char: char,
    /// Milliseconds per resolved scramble character.
    pub scramble_char_ms: u64,
    /// Glyphs drawn for unresolved scramble characters.
    pub scramble_charset: String,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            counter_ms: 2000,
            typewriter_char_ms: 50,
            typewriter_cursor: true,
            cursor_char: '|',
            scramble_char_ms: 50,
            scramble_charset: "!<>-_\\/[]{}=+*^?#".to_owned(),
        }
    }
}
