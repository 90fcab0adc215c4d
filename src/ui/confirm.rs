//! Two-step form confirmation.
//!
//! Contact forms show the entered values on a confirmation screen before
//! submitting. The machine has two steps (input ↔ confirm); advancing is
//! gated on every required field being non-empty. Field values are mirrored
//! into the confirmation placeholders with per-kind formatting rules.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStep {
    #[default]
    Input,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    ConfirmClicked,
    BackClicked,
}

impl FormStep {
    /// `required_filled` is whether every required field currently has a
    /// non-empty value; without it the confirm click is ignored and native
    /// validation messages take over.
    pub fn update(self, event: FormEvent, required_filled: bool) -> Self {
        match (self, event) {
            (FormStep::Input, FormEvent::ConfirmClicked) if required_filled => FormStep::Confirm,
            (FormStep::Confirm, FormEvent::BackClicked) => FormStep::Input,
            _ => self,
        }
    }
}

/// A form field value as read from the DOM, with whatever context its
/// mirroring rule needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Mirrored as HTML: escaped, newlines become `<br>`.
    Textarea(String),
    /// Checked labels of one checkbox group.
    Checkboxes(Vec<String>),
    /// Raw input value; browsers report `C:\fakepath\<name>`.
    File(String),
    /// ISO date value plus the display format (e.g. `YYYY/MM/DD`), whose
    /// separator carries over.
    Date { value: String, format: String },
}

/// The checkbox-group join separator.
pub const CHECKBOX_SEPARATOR: &str = " / ";

/// Escape the HTML special characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Strip the `C:\fakepath\` prefix (or any path) down to the basename.
pub fn file_basename(raw: &str) -> &str {
    raw.rsplit(['\\', '/']).next().unwrap_or(raw)
}

/// The separator a date display format uses: its first non-alphanumeric
/// character, `/` when the format has none.
pub fn date_separator(format: &str) -> char {
    format.chars().find(|c| !c.is_alphanumeric()).unwrap_or('/')
}

/// Reformat an ISO `YYYY-MM-DD` value with the format's separator.
/// Non-ISO values pass through untouched.
pub fn format_date(value: &str, format: &str) -> String {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return value.to_string();
    }
    let sep = date_separator(format);
    format!("{}{sep}{}{sep}{}", parts[0], parts[1], parts[2])
}

/// Mirror one field value into its confirmation placeholder.
pub fn mirror(field: &FieldValue) -> String {
    match field {
        FieldValue::Text(v) => v.clone(),
        FieldValue::Textarea(v) => escape_html(v).replace('\n', "<br>"),
        FieldValue::Checkboxes(labels) => labels.join(CHECKBOX_SEPARATOR),
        FieldValue::File(v) => file_basename(v).to_string(),
        FieldValue::Date { value, format } => format_date(value, format),
    }
}
