use rand_core::RngCore;
use rug::{Assign, Complete, Integer};

use crate::error::{Bug, Error, Reason};

/// Wraps any randomness source that implements [`rand_core::RngCore`] and makes
/// it compatible with [`rug::rand`].
pub fn external_rand(rng: &mut impl RngCore) -> rug::rand::ThreadRandState {
    use bytemuck::TransparentWrapper;

    #[derive(TransparentWrapper)]
    #[repr(transparent)]
    pub struct ExternalRand<R>(R);

    impl<R: RngCore> rug::rand::ThreadRandGen for ExternalRand<R> {
        fn gen(&mut self) -> u32 {
            self.0.next_u32()
        }
    }

    rug::rand::ThreadRandState::new_custom(ExternalRand::wrap_mut(rng))
}

/// Checks that `x` is in Z*_n
#[inline(always)]
pub fn in_mult_group(x: &Integer, n: &Integer) -> bool {
    x.cmp0().is_ge() && in_mult_group_abs(x, n)
}

/// Checks that `abs(x)` is in Z*_n
#[inline(always)]
pub fn in_mult_group_abs(x: &Integer, n: &Integer) -> bool {
    x.gcd_ref(n).complete() == *Integer::ONE
}

/// Samples `x` in Z*_n
pub fn sample_in_mult_group(rng: &mut impl RngCore, n: &Integer) -> Integer {
    let mut rng = external_rand(rng);
    let mut x = Integer::new();
    loop {
        x.assign(n.random_below_ref(&mut rng));
        if in_mult_group(&x, n) {
            return x;
        }
    }
}

/// Samples a value uniformly in `[1, n)`.
///
/// Draws a bit-string of exactly `n`'s bit length and retries on `0` or on values `>= n`, so the
/// distribution stays uniform over `[1, n)` instead of skewing towards the low end of the next
/// power of two.
///
/// Fails with [`Error`] (invalid argument) when `n <= 1`.
pub fn random_positive_number(rng: &mut impl RngCore, n: &Integer) -> Result<Integer, Error> {
    if *n <= *Integer::ONE {
        return Err(Reason::InvalidArgument.into());
    }
    let bits = n.significant_bits();
    let mut rng = external_rand(rng);
    let mut x = Integer::new();
    loop {
        x.assign(Integer::random_bits(bits, &mut rng));
        if x.cmp0().is_gt() && x < *n {
            return Ok(x);
        }
    }
}

/// Returns `floor(sqrt(n))` for non-negative `n`.
///
/// Delegates to `rug`'s (GMP's) integer square root, which already implements the Newton
/// iteration this is conceptually specified as; there is no benefit in this crate maintaining a
/// second copy of the same algorithm.
pub fn isqrt(n: &Integer) -> Integer {
    n.clone().sqrt()
}

/// `b^e mod m`, supporting negative `e` by first inverting `b` modulo `m` and exponentiating the
/// inverse by `|e|`.
pub fn mod_pow(b: &Integer, e: &Integer, m: &Integer) -> Result<Integer, Error> {
    if e.cmp0().is_lt() {
        let inv = b.clone().invert(m).map_err(|_| Reason::Ops)?;
        let abs_e = e.clone().abs();
        inv.pow_mod(&abs_e, m).map_err(|_| Bug::PowModUndef.into())
    } else {
        b.clone().pow_mod(e, m).map_err(|_| Bug::PowModUndef.into())
    }
}

/// Generates a random prime of exactly `bits` bits (top bit set).
///
/// The Paillier scheme places no structural requirement on its primes beyond primality and
/// `p != q`; this samples ordinary random primes rather than safe primes.
pub fn generate_prime(rng: &mut impl RngCore, bits: u32) -> Integer {
    use rug::integer::IsPrime;
    let mut rng = external_rand(rng);
    let mut x = Integer::new();
    loop {
        x.assign(Integer::random_bits(bits, &mut rng));
        x.set_bit(bits - 1, true);
        x.set_bit(0, true);

        if let IsPrime::Yes | IsPrime::Probably = x.is_probably_prime(25) {
            return x;
        }
    }
}

/// Provides functionality that's yet missing in [`rug::Integer`]
pub trait IntegerExt {
    /// Returns `self mod module`
    fn modulo(&self, module: &Self) -> Self;
}

impl IntegerExt for Integer {
    fn modulo(&self, module: &Self) -> Self {
        let c = (self % module).complete();
        if c.cmp0().is_lt() {
            module + c
        } else {
            c
        }
    }
}
