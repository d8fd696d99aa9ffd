//! Enumerations and field types for task creation.
//!
//! The service models priority as a small integer where `1` is the most
//! urgent and an absent value means "no priority".

/// Task priority offered by the creation wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
    #[default]
    None,
}

impl Priority {
    /// Fixed order in which the wizard lists priorities.
    pub const ALL: [Priority; 5] = [
        Priority::Urgent,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::None,
    ];

    /// Numeric value understood by the service (`0` for none).
    pub fn value(self) -> u8 {
        match self {
            Priority::Urgent => 1,
            Priority::High => 2,
            Priority::Normal => 3,
            Priority::Low => 4,
            Priority::None => 0,
        }
    }

    /// Value to send in a create payload; `None` omits the field.
    pub fn payload_value(self) -> Option<u8> {
        match self.value() {
            0 => None,
            v => Some(v),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Normal => "Normal",
            Priority::Low => "Low",
            Priority::None => "None",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_values() {
        let values: Vec<u8> = Priority::ALL.iter().map(|p| p.value()).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_none_priority_has_no_payload_value() {
        assert_eq!(Priority::None.payload_value(), None);
        assert_eq!(Priority::Urgent.payload_value(), Some(1));
        assert_eq!(Priority::Low.payload_value(), Some(4));
    }
}
