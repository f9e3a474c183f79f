use crossterm::event::KeyCode;

/// Which characters a field accepts while editing.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InputKind {
    Text,
    /// Digits only
    Integer,
    /// Digits and a single decimal point
    Decimal,
    /// `0x` followed by hex digits
    Address,
}

#[derive(Clone, Debug)]
pub struct TextInputState {
    pub label: &'static str,
    pub value: String,
    pub kind: InputKind,
}

impl TextInputState {
    pub fn new(label: &'static str, kind: InputKind) -> Self {
        Self {
            label,
            value: String::new(),
            kind,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn accepts(&self, c: char) -> bool {
        match self.kind {
            InputKind::Text => !c.is_control(),
            InputKind::Integer => c.is_ascii_digit(),
            InputKind::Decimal => c.is_ascii_digit() || (c == '.' && !self.value.contains('.')),
            InputKind::Address => {
                c.is_ascii_hexdigit() || ((c == 'x' || c == 'X') && self.value == "0")
            }
        }
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) if self.accepts(c) => self.value.push(c),
            KeyCode::Backspace => {
                self.value.pop();
            }
            _ => {}
        }
    }

    pub fn get_display_string(&self, editing: bool) -> String {
        if editing {
            format!("{}|", self.value)
        } else {
            self.value.clone()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(input: &mut TextInputState, text: &str) {
        for c in text.chars() {
            input.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn integer_field_drops_non_digits() {
        let mut input = TextInputState::new("Hours", InputKind::Integer);
        type_into(&mut input, "1a2-");
        assert_eq!(input.value, "12");
    }

    #[test]
    fn decimal_field_takes_one_point() {
        let mut input = TextInputState::new("Rate", InputKind::Decimal);
        type_into(&mut input, "0.0.5");
        assert_eq!(input.value, "0.05");
    }

    #[test]
    fn address_field_takes_prefix_and_hex() {
        let mut input = TextInputState::new("Address", InputKind::Address);
        type_into(&mut input, "0xAbZ1");
        assert_eq!(input.value, "0xAb1");
    }

    #[test]
    fn backspace_and_cursor() {
        let mut input = TextInputState::new("Name", InputKind::Text).with_value("abc");
        input.handle_input(KeyCode::Backspace);
        assert_eq!(input.get_display_string(true), "ab|");
        assert_eq!(input.get_display_string(false), "ab");
        assert!(!input.is_blank());
    }
}
