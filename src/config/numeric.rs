//! Strict numeric parsing for stored string values.

use std::str::FromStr;

mod sealed {
    pub trait Sealed {}
}

/// Primitive arithmetic types that a stored value can be read as.
///
/// Implemented for every built-in integer and float type.
pub trait Numeric: FromStr + sealed::Sealed {}

macro_rules! impl_numeric {
    ($($t:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}
            impl Numeric for $t {}
        )*
    };
}

impl_numeric!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Parse the whole string as `T`, or return `None`.
///
/// No prefix parsing: surrounding whitespace, trailing garbage and an explicit
/// `+` sign are all rejected.
pub fn parse_numeric<T: Numeric>(value: &str) -> Option<T> {
    if value.starts_with('+') {
        return None;
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_integers() {
        assert_eq!(parse_numeric::<i32>("12"), Some(12));
        assert_eq!(parse_numeric::<i64>("-42"), Some(-42));
        assert_eq!(parse_numeric::<u8>("255"), Some(255));
    }

    #[test]
    fn rejects_partial_numerals() {
        assert_eq!(parse_numeric::<i32>("12abc"), None);
        assert_eq!(parse_numeric::<i32>("  12"), None);
        assert_eq!(parse_numeric::<i32>("12 "), None);
        assert_eq!(parse_numeric::<i32>(""), None);
        assert_eq!(parse_numeric::<i32>(" "), None);
    }

    #[test]
    fn rejects_plus_sign() {
        assert_eq!(parse_numeric::<i32>("+12"), None);
        assert_eq!(parse_numeric::<f64>("+1.5"), None);
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(parse_numeric::<u8>("256"), None);
        assert_eq!(parse_numeric::<u32>("-1"), None);
    }

    #[test]
    fn parses_floats() {
        assert_eq!(parse_numeric::<f64>("0.25"), Some(0.25));
        assert_eq!(parse_numeric::<f32>("-3.5"), Some(-3.5));
        assert_eq!(parse_numeric::<f64>("1e3"), Some(1000.0));
        assert_eq!(parse_numeric::<f64>("1.5x"), None);
    }

    #[test]
    fn integer_rejects_float_text() {
        assert_eq!(parse_numeric::<i32>("1.0"), None);
    }
}
