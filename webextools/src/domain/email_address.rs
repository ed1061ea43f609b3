use unicode_segmentation::UnicodeSegmentation;

/// An email address read from the input CSV, checked well enough to be worth a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(s: String) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() {
            return Err("missing email".to_owned());
        }
        if s.graphemes(true).count() > 320 {
            return Err(format!("Email {} is too long.", s));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(format!("Email {} contains whitespace.", s));
        }
        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(format!("{} is not a valid email address.", s)),
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
