//! Enumerations shared across record families.

wire_enum! {
    /// Severity of audit events, security incidents and rules.
    #[derive(PartialOrd, Ord)]
    pub enum Severity {
        Info => ("info", "Info"),
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
        Critical => ("critical", "Critical"),
    }
}

impl Severity {
    /// Whether the severity warrants an administrator's attention.
    pub fn is_alerting(&self) -> bool {
        *self >= Severity::High
    }
}
