//! Numeric terminal: scanning, options and value conversion.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;
use crate::matches::Value;
use crate::scanner::Cursor;

/// The value type a matched number converts to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NumberType {
    #[default]
    Decimal,
    Int32,
    Int64,
    Double,
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumberType::Decimal => "decimal",
            NumberType::Int32 => "32-bit integer",
            NumberType::Int64 => "64-bit integer",
            NumberType::Double => "double",
        })
    }
}

/// What the numeric terminal accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberOptions {
    /// Leading `+` or `-`.
    pub allow_sign: bool,
    /// A fractional part after `decimal_separator`.
    pub allow_decimal: bool,
    /// An `e`/`E` exponent with optional sign.
    pub allow_exponent: bool,
    pub decimal_separator: char,
    pub value_type: NumberType,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            allow_sign: true,
            allow_decimal: false,
            allow_exponent: false,
            decimal_separator: '.',
            value_type: NumberType::Decimal,
        }
    }
}

/// Match the longest number at `cur`.
///
/// A separator without digits after it, or an exponent marker without digits,
/// is left unconsumed rather than failing the whole number.
pub(crate) fn scan<'a>(cur: Cursor<'a>, opts: &NumberOptions) -> Option<Cursor<'a>> {
    let is_digit = |c: char| c.is_ascii_digit();
    let mut at = cur;
    if opts.allow_sign {
        at = at.eat_if(|c| c == '+' || c == '-').unwrap_or(at);
    }
    let int_end = at.eat_while(is_digit);
    let mut digits = int_end.offset() - at.offset();
    at = int_end;

    if opts.allow_decimal {
        if let Some(after_sep) = at.eat_char(opts.decimal_separator) {
            let frac_end = after_sep.eat_while(is_digit);
            if frac_end.offset() > after_sep.offset() {
                digits += frac_end.offset() - after_sep.offset();
                at = frac_end;
            }
        }
    }
    if digits == 0 {
        return None;
    }

    if opts.allow_exponent {
        if let Some(after_e) = at.eat_if(|c| c == 'e' || c == 'E') {
            let after_sign = after_e.eat_if(|c| c == '+' || c == '-').unwrap_or(after_e);
            let exp_end = after_sign.eat_while(is_digit);
            if exp_end.offset() > after_sign.offset() {
                at = exp_end;
            }
        }
    }
    Some(at)
}

/// Convert matched number text according to `opts.value_type`.
pub(crate) fn convert(text: &str, opts: &NumberOptions) -> Result<Value<'static>, ConversionError> {
    let normalized = if opts.decimal_separator == '.' {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.replace(opts.decimal_separator, "."))
    };
    let target = opts.value_type;
    let overflow = || ConversionError::Overflow { text: text.to_string(), target };

    match target {
        NumberType::Decimal => normalized.parse().map(Value::Decimal),
        NumberType::Double => normalized
            .parse()
            .map(Value::Double)
            .map_err(|_| ConversionError::Malformed { text: text.to_string() }),
        NumberType::Int32 => {
            let whole = whole_number(text, &normalized, target)?;
            i32::try_from(whole).map(Value::Int32).map_err(|_| overflow())
        }
        NumberType::Int64 => {
            let whole = whole_number(text, &normalized, target)?;
            i64::try_from(whole).map(Value::Int64).map_err(|_| overflow())
        }
    }
}

fn whole_number(text: &str, normalized: &str, target: NumberType) -> Result<i128, ConversionError> {
    let decimal: Decimal = normalized.parse().map_err(|err| match err {
        ConversionError::Overflow { .. } => ConversionError::Overflow { text: text.to_string(), target },
        other => other,
    })?;
    if decimal.scale() > 0 {
        return Err(ConversionError::Fractional { text: text.to_string(), target });
    }
    Ok(decimal.mantissa())
}

/// Exact decimal number: `mantissa * 10^-scale`.
///
/// Values are kept normalized (no trailing zeros in the mantissa when the
/// scale is positive), so equal numbers compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Fractional digits kept; further digits are rounded half away from zero.
    pub const MAX_SCALE: u32 = 28;

    pub fn new(mantissa: i128, scale: u32) -> Self {
        let mut mantissa = mantissa;
        let mut scale = scale;
        if scale.saturating_sub(Self::MAX_SCALE) as i64 > MAX_DIGITS {
            return Self { mantissa: 0, scale: 0 };
        }
        while scale > Self::MAX_SCALE {
            mantissa = div10_rounded(mantissa);
            scale -= 1;
        }
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Self { mantissa, scale }
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }

    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

/// Decimal digits an `i128` can hold.
const MAX_DIGITS: i64 = 39;

fn div10_rounded(value: i128) -> i128 {
    let rounded = value / 10;
    match value % 10 {
        r if r >= 5 => rounded + 1,
        r if r <= -5 => rounded - 1,
        _ => rounded,
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::new(value as i128, 0)
    }
}

impl FromStr for Decimal {
    type Err = ConversionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || ConversionError::Malformed { text: text.to_string() };
        let overflow = || ConversionError::Overflow { text: text.to_string(), target: NumberType::Decimal };

        let mut chars = text.trim().chars().peekable();
        let negative = match chars.peek() {
            Some('-') => {
                chars.next();
                true
            }
            Some('+') => {
                chars.next();
                false
            }
            _ => false,
        };

        let mut mantissa: i128 = 0;
        let mut digits = 0;
        let mut frac_digits: i64 = 0;
        let mut seen_point = false;
        while let Some(&c) = chars.peek() {
            match c {
                '0'..='9' => {
                    let digit = c as i128 - '0' as i128;
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add(digit))
                        .ok_or_else(overflow)?;
                    digits += 1;
                    if seen_point {
                        frac_digits += 1;
                    }
                }
                '.' if !seen_point => seen_point = true,
                _ => break,
            }
            chars.next();
        }
        if digits == 0 {
            return Err(malformed());
        }

        let mut exponent: i64 = 0;
        if let Some('e' | 'E') = chars.peek() {
            chars.next();
            let exp_negative = match chars.peek() {
                Some('-') => {
                    chars.next();
                    true
                }
                Some('+') => {
                    chars.next();
                    false
                }
                _ => false,
            };
            let mut exp_digits = 0;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                exponent = exponent
                    .checked_mul(10)
                    .and_then(|e| e.checked_add(d as i64))
                    .ok_or_else(overflow)?;
                exp_digits += 1;
                chars.next();
            }
            if exp_digits == 0 {
                return Err(malformed());
            }
            if exp_negative {
                exponent = -exponent;
            }
        }
        if chars.next().is_some() {
            return Err(malformed());
        }

        if mantissa == 0 {
            return Ok(Self::new(0, 0));
        }
        let mut scale = frac_digits.checked_sub(exponent).ok_or_else(overflow)?;
        if scale - Self::MAX_SCALE as i64 > MAX_DIGITS {
            // Every significant digit would be rounded away.
            return Err(overflow());
        }
        if scale < 0 {
            let factor = u32::try_from(-scale)
                .ok()
                .and_then(|shift| 10i128.checked_pow(shift))
                .ok_or_else(overflow)?;
            mantissa = mantissa.checked_mul(factor).ok_or_else(overflow)?;
            scale = 0;
        }
        while scale > Self::MAX_SCALE as i64 {
            mantissa = div10_rounded(mantissa);
            scale -= 1;
        }
        let mantissa = if negative { -mantissa } else { mantissa };
        Ok(Self::new(mantissa, scale as u32))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int, frac) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, int, frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned<'a>(text: &'a str, opts: &NumberOptions) -> Option<&'a str> {
        let cur = Cursor::new(text);
        scan(cur, opts).map(|end| cur.slice_to(end))
    }

    fn all() -> NumberOptions {
        NumberOptions { allow_decimal: true, allow_exponent: true, ..Default::default() }
    }

    #[test]
    fn test_scan_integer_defaults() {
        let opts = NumberOptions::default();
        assert_eq!(scanned("123abc", &opts), Some("123"));
        assert_eq!(scanned("-42", &opts), Some("-42"));
        assert_eq!(scanned("1.5", &opts), Some("1"));
        assert_eq!(scanned("", &opts), None);
        assert_eq!(scanned("+", &opts), None);
    }

    #[test]
    fn test_scan_sign_disallowed() {
        let opts = NumberOptions { allow_sign: false, ..Default::default() };
        assert_eq!(scanned("-1", &opts), None);
    }

    #[test]
    fn test_scan_malformed_suffixes_fall_back() {
        assert_eq!(scanned("123.", &all()), Some("123"));
        assert_eq!(scanned("123.x", &all()), Some("123"));
        assert_eq!(scanned("12e", &all()), Some("12"));
        assert_eq!(scanned("12e+", &all()), Some("12"));
        assert_eq!(scanned("1.5E-3x", &all()), Some("1.5E-3"));
        assert_eq!(scanned(".5", &all()), Some(".5"));
    }

    #[test]
    fn test_scan_custom_separator() {
        let opts = NumberOptions { decimal_separator: ',', ..all() };
        assert_eq!(scanned("3,25;", &opts), Some("3,25"));
        assert_eq!(convert("3,25", &opts), Ok(Value::Decimal(Decimal::new(325, 2))));
    }

    #[test]
    fn test_decimal_parse() {
        assert_eq!("123.4567".parse::<Decimal>(), Ok(Decimal::new(1234567, 4)));
        assert_eq!("-0.50".parse::<Decimal>(), Ok(Decimal::new(-5, 1)));
        assert_eq!("123E-02".parse::<Decimal>(), Ok(Decimal::new(123, 2)));
        assert_eq!("123.4567E+5".parse::<Decimal>(), Ok(Decimal::new(12345670, 0)));
        assert_eq!("1234E2".parse::<Decimal>(), Ok(Decimal::from(123400)));
        assert_eq!("0E+500".parse::<Decimal>(), Ok(Decimal::from(0)));
    }

    #[test]
    fn test_decimal_parse_errors() {
        assert!(matches!("".parse::<Decimal>(), Err(ConversionError::Malformed { .. })));
        assert!(matches!("1e".parse::<Decimal>(), Err(ConversionError::Malformed { .. })));
        assert!(matches!("1x".parse::<Decimal>(), Err(ConversionError::Malformed { .. })));
        assert!(matches!("1E+60".parse::<Decimal>(), Err(ConversionError::Overflow { .. })));
        assert!(matches!("1e-99999999999".parse::<Decimal>(), Err(ConversionError::Overflow { .. })));
        assert!(matches!(
            "0.1e-9223372036854775807".parse::<Decimal>(),
            Err(ConversionError::Overflow { .. })
        ));
    }

    #[test]
    fn test_decimal_new_drops_unrepresentable_scale() {
        assert_eq!(Decimal::new(5, u32::MAX), Decimal::new(0, 0));
        assert_eq!(Decimal::new(5, 29), Decimal::new(1, 28));
    }

    #[test]
    fn test_decimal_rounds_excess_scale() {
        let d: Decimal = "0.00000000000000000000000000015".parse().unwrap();
        assert_eq!(d, Decimal::new(2, 28));
    }

    #[test]
    fn test_decimal_display() {
        assert_eq!(Decimal::new(1234567, 4).to_string(), "123.4567");
        assert_eq!(Decimal::new(-5, 3).to_string(), "-0.005");
        assert_eq!(Decimal::from(42).to_string(), "42");
        assert_eq!(Decimal::new(1500, 2).to_string(), "15");
        assert_eq!(Decimal::new(123, 2).to_f64(), 1.23);
    }

    #[test]
    fn test_convert_integers() {
        let int32 = NumberOptions { value_type: NumberType::Int32, ..all() };
        assert_eq!(convert("+123", &int32), Ok(Value::Int32(123)));
        assert_eq!(convert("1.0", &int32), Ok(Value::Int32(1)));
        assert!(matches!(convert("1.5", &int32), Err(ConversionError::Fractional { .. })));
        assert!(matches!(convert("3000000000", &int32), Err(ConversionError::Overflow { .. })));

        let int64 = NumberOptions { value_type: NumberType::Int64, ..all() };
        assert_eq!(convert("3000000000", &int64), Ok(Value::Int64(3_000_000_000)));
    }

    #[test]
    fn test_convert_double() {
        let opts = NumberOptions { value_type: NumberType::Double, ..all() };
        assert_eq!(convert("-2.5e2", &opts), Ok(Value::Double(-250.0)));
    }
}
