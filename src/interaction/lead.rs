//! Lead registration form: field rules, incremental error clearing and the
//! simulated submit.
//!
//! Errors are not shown while the visitor first fills the form. Once a
//! submit has been attempted, every edit re-checks the edited field, so an
//! error disappears as soon as that field is corrected and reappears if it
//! is broken again.
//!
//! ```text
//! Editing ──submit (valid)──▶ Submitting ──submit delay──▶ Succeeded ──display──▶ Editing
//!    ▲                                                         │
//!    └─────────────── draft cleared, payload emitted ──────────┘
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

/// `local@domain.tld`, no whitespace, exactly one `@`.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
/// Malaysian mobile or landline after separators are stripped: optional
/// `+6`/`6`, optional trunk `0`, then 8 to 10 digits.
pub const PHONE_PATTERN: &str = r"^(?:\+?6)?0?\d{8,10}$";
/// Characters visitors type between digit groups.
pub const PHONE_SEPARATORS: &str = r"[\s\-().]";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"));
static PHONE_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_SEPARATORS).expect("separator pattern compiles"));

/// Fields with a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    UnitType,
    Consent,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::UnitType,
        Field::Consent,
    ];

    /// Inline message shown under the field.
    pub fn message(self) -> &'static str {
        match self {
            Field::Name => "Name is required",
            Field::Email => "Valid email is required",
            Field::Phone => "Valid phone number is required",
            Field::UnitType => "Please select a unit type",
            Field::Consent => "Consent is required",
        }
    }

    /// Form control name in the rendered page.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::UnitType => "unit_type",
            Field::Consent => "consent",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub type ValidationErrors = BTreeMap<Field, &'static str>;

/// What the visitor has typed so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub unit_type: Option<String>,
    pub budget: Option<String>,
    pub message: String,
    pub consent: bool,
}

/// Phone number with separators removed.
pub fn normalize_phone(raw: &str) -> String {
    PHONE_SEP_RE.replace_all(raw.trim(), "").into_owned()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(&normalize_phone(phone))
}

/// Check a single field. `unit_types` is the enumerated list of accepted
/// values; an empty list accepts any selection.
pub fn check_field(field: Field, draft: &LeadDraft, unit_types: &[String]) -> bool {
    match field {
        Field::Name => !draft.name.trim().is_empty(),
        Field::Email => is_valid_email(&draft.email),
        Field::Phone => is_valid_phone(&draft.phone),
        Field::UnitType => match draft.unit_type.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) => unit_types.is_empty() || unit_types.iter().any(|u| u == v),
        },
        Field::Consent => draft.consent,
    }
}

/// Every failing field with its message. Empty means the draft may be
/// submitted.
pub fn validate(draft: &LeadDraft, unit_types: &[String]) -> ValidationErrors {
    Field::ALL
        .into_iter()
        .filter(|f| !check_field(*f, draft, unit_types))
        .map(|f| (f, f.message()))
        .collect()
}

/// Payload produced by a successful submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub unit_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LeadSubmission {
    fn from_draft(draft: &LeadDraft) -> Self {
        let non_empty = |s: &str| -> Option<String> {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: normalize_phone(&draft.phone),
            unit_type: draft.unit_type.as_deref().unwrap_or_default().trim().to_string(),
            budget: draft.budget.as_deref().and_then(non_empty),
            message: non_empty(&draft.message),
        }
    }
}

/// Submit timing, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeadOptions {
    /// Artificial delay standing in for the network call.
    pub submit_delay_ms: u64,
    /// How long the thank-you message stays up.
    pub success_display_ms: u64,
}

impl Default for LeadOptions {
    fn default() -> Self {
        Self {
            submit_delay_ms: 1500,
            success_display_ms: 4000,
        }
    }
}

/// One keystroke or selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Name(String),
    Email(String),
    Phone(String),
    UnitType(Option<String>),
    Budget(Option<String>),
    Message(String),
    Consent(bool),
}

impl Edit {
    /// Field whose rule this edit affects, if any.
    fn field(&self) -> Option<Field> {
        match self {
            Edit::Name(_) => Some(Field::Name),
            Edit::Email(_) => Some(Field::Email),
            Edit::Phone(_) => Some(Field::Phone),
            Edit::UnitType(_) => Some(Field::UnitType),
            Edit::Consent(_) => Some(Field::Consent),
            Edit::Budget(_) | Edit::Message(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Editing,
    Submitting { ready_at: Duration },
    Succeeded { until: Duration },
}

/// Result of pressing the submit button.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the errors are now displayed.
    Blocked(ValidationErrors),
    /// Accepted; the payload is delivered by a later [`LeadForm::tick`].
    Pending { ready_at: Duration },
    /// A submit is already in flight.
    Busy,
}

/// The contact form component's state.
pub struct LeadForm {
    draft: LeadDraft,
    errors: ValidationErrors,
    unit_types: Vec<String>,
    options: LeadOptions,
    state: SubmitState,
    attempted: bool,
}

impl LeadForm {
    pub fn new(unit_types: Vec<String>, options: LeadOptions) -> Self {
        Self {
            draft: LeadDraft::default(),
            errors: ValidationErrors::new(),
            unit_types,
            options,
            state: SubmitState::Editing,
            attempted: false,
        }
    }

    pub fn draft(&self) -> &LeadDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn edit(&mut self, edit: Edit) {
        let field = edit.field();
        match edit {
            Edit::Name(v) => self.draft.name = v,
            Edit::Email(v) => self.draft.email = v,
            Edit::Phone(v) => self.draft.phone = v,
            Edit::UnitType(v) => self.draft.unit_type = v,
            Edit::Budget(v) => self.draft.budget = v,
            Edit::Message(v) => self.draft.message = v,
            Edit::Consent(v) => self.draft.consent = v,
        }
        if let Some(field) = field
            && self.attempted
        {
            if check_field(field, &self.draft, &self.unit_types) {
                self.errors.remove(&field);
            } else {
                self.errors.insert(field, field.message());
            }
        }
    }

    pub fn submit(&mut self, now: Duration) -> SubmitOutcome {
        if matches!(self.state, SubmitState::Submitting { .. }) {
            return SubmitOutcome::Busy;
        }
        self.attempted = true;
        self.errors = validate(&self.draft, &self.unit_types);
        if !self.errors.is_empty() {
            return SubmitOutcome::Blocked(self.errors.clone());
        }
        let ready_at = now + Duration::from_millis(self.options.submit_delay_ms);
        self.state = SubmitState::Submitting { ready_at };
        SubmitOutcome::Pending { ready_at }
    }

    /// Advance timers. Returns the payload when a pending submit completes;
    /// the draft is cleared at that moment.
    pub fn tick(&mut self, now: Duration) -> Option<LeadSubmission> {
        let mut delivered = None;
        if let SubmitState::Submitting { ready_at } = self.state
            && now >= ready_at
        {
            delivered = Some(LeadSubmission::from_draft(&self.draft));
            self.draft = LeadDraft::default();
            self.errors.clear();
            self.attempted = false;
            self.state = SubmitState::Succeeded {
                until: ready_at + Duration::from_millis(self.options.success_display_ms),
            };
        }
        if let SubmitState::Succeeded { until } = self.state
            && now >= until
        {
            self.state = SubmitState::Editing;
        }
        delivered
    }
}
