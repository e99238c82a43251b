use alloy::primitives::U256;

/// Decimal scale of cauldron collateral shares.
pub const SHARE_DECIMALS: u8 = 18;

/// Fixed-point to display string converter.
///
/// Works on the raw `U256` with integer division so amounts of any size keep
/// every digit; rounding is half-up on the first dropped digit.
#[derive(Clone, Copy, Debug)]
pub struct Converter {
    decimals: u8,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(SHARE_DECIMALS)
    }
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    /// Renders `value / 10^decimals` with exactly `places` fractional digits.
    pub fn to_fixed(&self, value: U256, places: u8) -> String {
        let scaled = if places >= self.decimals {
            value.saturating_mul(pow10(places - self.decimals))
        } else {
            let divisor = pow10(self.decimals - places);
            let (quotient, remainder) = value.div_rem(divisor);
            if remainder * U256::from(2) >= divisor {
                quotient + U256::from(1)
            } else {
                quotient
            }
        };

        if places == 0 {
            return scaled.to_string();
        }
        let (int_part, frac_part) = scaled.div_rem(pow10(places));
        format!(
            "{}.{:0>width$}",
            int_part,
            frac_part.to_string(),
            width = places as usize
        )
    }
}

fn pow10(exp: u8) -> U256 {
    U256::from(10).pow(U256::from(exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed2(raw: &str) -> String {
        Converter::default().to_fixed(raw.parse().unwrap(), 2)
    }

    #[test]
    fn test_whole_units() {
        assert_eq!(fixed2("0"), "0.00");
        assert_eq!(fixed2("1000000000000000000"), "1.00");
        assert_eq!(fixed2("2000000000000000000"), "2.00");
    }

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(fixed2("999999999999999999"), "1.00");
        assert_eq!(fixed2("1"), "0.00");
        assert_eq!(fixed2("5000000000000000"), "0.01");
        assert_eq!(fixed2("4999999999999999"), "0.00");
        assert_eq!(fixed2("1234999999999999999"), "1.23");
        assert_eq!(fixed2("1235000000000000000"), "1.24");
    }

    #[test]
    fn test_beyond_64_bit_range() {
        assert_eq!(
            fixed2("123456789012345678901234567890"),
            "123456789012.35"
        );
        let max = Converter::default().to_fixed(U256::MAX, 2);
        assert!(max.ends_with(".58"), "{max}");
    }

    #[test]
    fn test_other_scales() {
        let usdc = Converter::new(6);
        assert_eq!(usdc.to_fixed(U256::from(1_500_000u64), 2), "1.50");
        assert_eq!(usdc.to_fixed(U256::from(1_500_000u64), 0), "2");
        assert_eq!(Converter::new(0).to_fixed(U256::from(7u64), 2), "7.00");
    }
}
