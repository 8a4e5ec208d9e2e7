use std::fmt;

/// One keyword entry of a header: name, typed value and comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Option<KeywordValue>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

impl Keyword {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            value: None,
            comment: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<KeywordValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn logical<S: Into<String>>(name: S, value: bool) -> Self {
        Self::new(name).with_value(value)
    }

    pub fn integer<S: Into<String>>(name: S, value: i64) -> Self {
        Self::new(name).with_value(value)
    }

    pub fn real<S: Into<String>>(name: S, value: f64) -> Self {
        Self::new(name).with_value(value)
    }

    pub fn string<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        Self::new(name).with_value(KeywordValue::String(value.into()))
    }
}

impl KeywordValue {
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for KeywordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for KeywordValue {
    fn from(value: bool) -> Self {
        Self::Logical(value)
    }
}

impl From<i64> for KeywordValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for KeywordValue {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for KeywordValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for KeywordValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for KeywordValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_typed_values() {
        assert_eq!(
            Keyword::logical("SIMPLE", true).value,
            Some(KeywordValue::Logical(true))
        );
        assert_eq!(
            Keyword::integer("NAXIS", 2).value,
            Some(KeywordValue::Integer(2))
        );
        assert_eq!(
            Keyword::real("EQUINOX", 2000.0).value,
            Some(KeywordValue::Real(2000.0))
        );
        assert_eq!(
            Keyword::string("XTENSION", "BINTABLE").value,
            Some(KeywordValue::String("BINTABLE".to_string()))
        );
    }

    #[test]
    fn as_real_widens_integers() {
        assert_eq!(KeywordValue::Integer(3).as_real(), Some(3.0));
        assert_eq!(KeywordValue::String("3".to_string()).as_real(), None);
    }

    #[test]
    fn display_matches_card_conventions() {
        assert_eq!(KeywordValue::Logical(false).to_string(), "F");
        assert_eq!(KeywordValue::String("M31".to_string()).to_string(), "'M31'");
        assert_eq!(KeywordValue::Integer(-32).to_string(), "-32");
    }
}
