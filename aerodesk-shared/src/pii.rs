use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Passenger data that must not leak through `Debug`/`Display`, e.g. when a
/// whole reservation is logged with `tracing::info!("{:?}", request)`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Back-office responses carry the real value; only log output is masked.
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Masked(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_is_masked() {
        let id = Masked("079123456789".to_string());
        assert_eq!(format!("{:?}", id), "********");
        assert_eq!(id.to_string(), "********");
        assert_eq!(id.expose(), "079123456789");
    }

    #[test]
    fn test_serializes_real_value() {
        let phone = Masked("+84 912 345 678".to_string());
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+84 912 345 678\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, phone);
    }
}
