//! Outbound script construction: turning a scan payload into a JavaScript
//! statement that is safe to submit to the hosted page.
//!
//! # The guarded callback invocation
//!
//! The hosted page is expected to define a global callback:
//!
//! ```js
//! window.onBarcodeScanned = (payload) => { /* react to the scan */ };
//! ```
//!
//! For every scan the bridge submits one statement of the form:
//!
//! ```js
//! if (window.onBarcodeScanned) window.onBarcodeScanned('012345678905');
//! ```
//!
//! The `if (...)` guard is a *runtime capability check inside the page's
//! script environment*: when the page has not (yet) defined the callback —
//! e.g., before its load completes — the property lookup yields `undefined`,
//! the guard is falsy, and the statement is a harmless no-op. The guard must
//! use a `window.`-qualified name: a bare identifier lookup of an undefined
//! global would throw a ReferenceError instead of evaluating to `undefined`.
//!
//! # Escaping
//!
//! The payload is an opaque string from external hardware. It is embedded
//! as a single-quoted JS string literal, so any character that could break
//! out of the literal must be escaped: backslash, single quote, ASCII
//! control characters, and the two JavaScript line terminators U+2028/U+2029
//! (legal in JSON strings but not in JS string literals).

/// The well-known global callback invoked with each scan payload.
///
/// The `window.` qualifier is part of the name on purpose — see the module
/// docs for why the guard needs it.
pub const DEFAULT_CALLBACK: &str = "window.onBarcodeScanned";

/// Escapes `raw` so it can be embedded inside a single-quoted JavaScript
/// string literal without terminating or corrupting the literal.
///
/// | Input            | Output    |
/// |------------------|-----------|
/// | `\`              | `\\`      |
/// | `'`              | `\'`      |
/// | newline          | `\n`      |
/// | carriage return  | `\r`      |
/// | tab              | `\t`      |
/// | other control    | `\u00XX`  |
/// | U+2028 / U+2029  | `\u2028` / `\u2029` |
///
/// Double quotes pass through unescaped: they are inert inside a
/// single-quoted literal.
///
/// # Examples
///
/// ```rust
/// use scan_core::escape_single_quoted;
///
/// assert_eq!(escape_single_quoted("it's"), r"it\'s");
/// assert_eq!(escape_single_quoted("a\\b"), r"a\\b");
/// ```
pub fn escape_single_quoted(raw: &str) -> String {
    // Worst case every char doubles; reserve a little headroom up front.
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Remaining ASCII control characters and the JS line terminators
            // get the \uXXXX form, which is valid in any JS string literal.
            c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Builds the guarded callback invocation for one scan payload.
///
/// `callback` is the global function name to invoke (normally
/// [`DEFAULT_CALLBACK`]); `payload` is the raw scan content, escaped here
/// before embedding.
///
/// The result is always exactly one syntactically valid JS statement,
/// whatever the payload contains.
///
/// # Examples
///
/// ```rust
/// use scan_core::{callback_invocation, DEFAULT_CALLBACK};
///
/// let script = callback_invocation(DEFAULT_CALLBACK, "012345678905");
/// assert_eq!(
///     script,
///     "if (window.onBarcodeScanned) window.onBarcodeScanned('012345678905');"
/// );
/// ```
pub fn callback_invocation(callback: &str, payload: &str) -> String {
    format!(
        "if ({callback}) {callback}('{}');",
        escape_single_quoted(payload)
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
