//! # 有理数逼近
//!
//! 将浮点分数转换为分母受限的最佳有理逼近（连分数算法）。
//! 先把 `f64` 精确展开为 `m / 2^e`，再在该精确值上求逼近，
//! 所以 `0.125` 之类的二进制可表示值总能得到精确分数。
//!
//! ## 依赖关系
//! - 被 `sqs/supercell.rs` 使用
//! - 使用 `num-integer` 约分

use num_integer::Integer;
use std::fmt;

/// 分母上限；保证误差比较时 u128 不溢出
pub const MAX_DENOMINATOR: u64 = 1 << 16;

/// 非负有理数 `numer / denom`，始终为最简形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    numer: u64,
    denom: u64,
}

impl Rational {
    pub fn new(numer: u64, denom: u64) -> Self {
        assert!(denom != 0, "zero denominator");
        let g = numer.gcd(&denom);
        Rational {
            numer: numer / g,
            denom: denom / g,
        }
    }

    pub fn denom(&self) -> u64 {
        self.denom
    }

    /// `floor(n * self)`，精确整数运算
    pub fn floor_mul(&self, n: u64) -> u64 {
        ((n as u128 * self.numer as u128) / self.denom as u128) as u64
    }

    /// 分母不超过 `max_denom` 的最佳有理逼近
    ///
    /// `x` 须在 [0, 1] 内，`1 <= max_denom <= MAX_DENOMINATOR`。
    pub fn limit_denominator(x: f64, max_denom: u64) -> Self {
        debug_assert!((0.0..=1.0).contains(&x));
        debug_assert!((1..=MAX_DENOMINATOR).contains(&max_denom));

        let (n, d) = match exact_ratio(x) {
            Some(ratio) => ratio,
            // x < 2^-37，离 0 比离任何 1/max_denom 都近
            None => return Rational::new(0, 1),
        };

        if d <= max_denom as u128 {
            return Rational::new(n as u64, d as u64);
        }

        let max_d = max_denom as u128;
        let (mut p0, mut q0, mut p1, mut q1) = (0u128, 1u128, 1u128, 0u128);
        let (mut num, mut den) = (n, d);

        loop {
            let a = num / den;
            let q2 = q0 + a * q1;
            if q2 > max_d {
                break;
            }
            let p2 = p0 + a * p1;
            p0 = p1;
            q0 = q1;
            p1 = p2;
            q1 = q2;
            let rem = num - a * den;
            num = den;
            den = rem;
        }

        let k = (max_d - q0) / q1;
        let (bp, bq) = (p0 + k * p1, q0 + k * q1);

        // |p1/q1 - x| <= |bp/bq - x|  <=>  |p1*d - n*q1| * bq <= |bp*d - n*bq| * q1
        let err_convergent = abs_diff(p1 * d, n * q1) * bq;
        let err_bound = abs_diff(bp * d, n * bq) * q1;

        if err_convergent <= err_bound {
            Rational::new(p1 as u64, q1 as u64)
        } else {
            Rational::new(bp as u64, bq as u64)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}

fn abs_diff(a: u128, b: u128) -> u128 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// `x` 的精确有理表示 `(n, 2^e)`；分母超过 2^90 时返回 `None`
fn exact_ratio(x: f64) -> Option<(u128, u128)> {
    if x == 0.0 {
        return Some((0, 1));
    }

    let bits = x.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i64;
    let frac_bits = bits & ((1u64 << 52) - 1);

    let (mut mantissa, mut exp) = if exp_bits == 0 {
        (frac_bits, -1074i64)
    } else {
        (frac_bits | (1u64 << 52), exp_bits - 1075)
    };

    let tz = mantissa.trailing_zeros() as i64;
    mantissa >>= tz;
    exp += tz;

    if exp >= 0 {
        // 整数值；调用方只传入 [0, 1]
        let shifted = (mantissa as u128).checked_shl(exp as u32)?;
        return Some((shifted, 1));
    }

    if -exp > 90 {
        return None;
    }
    Some((mantissa as u128, 1u128 << (-exp)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_binary_fractions() {
        assert_eq!(Rational::limit_denominator(0.75, 96), Rational::new(3, 4));
        assert_eq!(Rational::limit_denominator(0.125, 96), Rational::new(1, 8));
        assert_eq!(Rational::limit_denominator(1.0, 96), Rational::new(1, 1));
        assert_eq!(Rational::limit_denominator(0.0, 96), Rational::new(0, 1));
    }

    #[test]
    fn test_decimal_thirds() {
        assert_eq!(Rational::limit_denominator(0.33333, 96), Rational::new(1, 3));
        assert_eq!(Rational::limit_denominator(0.333333, 96), Rational::new(1, 3));
        assert_eq!(Rational::limit_denominator(0.1, 96), Rational::new(1, 10));
    }

    #[test]
    fn test_bounded_approximation() {
        // pi - 3 = 0.14159...; 收敛子 1/7 之后是 15/106，上限内最佳为半收敛子 13/92
        let r = Rational::limit_denominator(std::f64::consts::PI - 3.0, 96);
        assert_eq!(r, Rational::new(13, 92));
        let r = Rational::limit_denominator(std::f64::consts::PI - 3.0, 10);
        assert_eq!(r, Rational::new(1, 7));

        let r = Rational::limit_denominator(0.3, 2);
        assert_eq!(r, Rational::new(1, 2));

        assert_eq!(Rational::limit_denominator(0.3, 1), Rational::new(0, 1));
        assert_eq!(Rational::limit_denominator(0.7, 1), Rational::new(1, 1));
    }

    #[test]
    fn test_tiny_value_rounds_to_zero() {
        assert_eq!(Rational::limit_denominator(1e-300, 96), Rational::new(0, 1));
        assert_eq!(Rational::limit_denominator(f64::MIN_POSITIVE, 96), Rational::new(0, 1));
    }

    #[test]
    fn test_floor_mul() {
        assert_eq!(Rational::new(3, 4).floor_mul(56), 42);
        assert_eq!(Rational::new(1, 3).floor_mul(16), 5);
        assert_eq!(Rational::new(2, 4).to_string(), "1/2");
    }
}
