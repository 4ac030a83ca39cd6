//! Random sampling filters: `ans_random`, `shuffle`, `random_mac`.
//!
//! Every filter takes an optional `seed`. With a seed the values come from a
//! private [`MersenneTwister`], so the same seed and input always render the same
//! output. Without one they come from the thread-local OS-seeded generator.
//!
//! The sampling helpers are generic over [`RngCore`], so both sources go through
//! the same code path:
//!
//! ```rust
//! use standout_scaffold::filters::random::{randrange, RandomSource, Seed};
//!
//! let mut rng = RandomSource::seeded(&Seed::Text("123".into()));
//! assert_eq!(randrange(&mut rng, 0, 100, 1).unwrap(), 93);
//! ```

mod mersenne;

pub use mersenne::{MersenneTwister, Seed};

use minijinja::value::{Kwargs, ValueKind};
use minijinja::{Error, Value};
use rand::rngs::ThreadRng;
use rand::RngCore;

use super::args;
use crate::error::FilterError;

/// Where random values come from.
#[derive(Debug)]
pub enum RandomSource {
    /// Reproducible stream derived from a seed.
    Seeded(Box<MersenneTwister>),
    /// Fresh entropy from the thread-local generator.
    Entropy(ThreadRng),
}

impl RandomSource {
    pub fn seeded(seed: &Seed) -> Self {
        RandomSource::Seeded(Box::new(MersenneTwister::from_seed(seed)))
    }

    pub fn entropy() -> Self {
        RandomSource::Entropy(rand::thread_rng())
    }

    /// Seeded when `seed` is given (even if empty), entropy otherwise.
    pub fn from_seed_value(seed: Option<&Value>) -> Self {
        match seed {
            Some(value) => Self::seeded(&seed_from_value(value)),
            None => Self::entropy(),
        }
    }
}

impl RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        match self {
            RandomSource::Seeded(mt) => mt.next_u32(),
            RandomSource::Entropy(rng) => rng.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            RandomSource::Seeded(mt) => mt.next_u64(),
            RandomSource::Entropy(rng) => rng.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            RandomSource::Seeded(mt) => mt.fill_bytes(dest),
            RandomSource::Entropy(rng) => rng.fill_bytes(dest),
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        match self {
            RandomSource::Seeded(mt) => mt.try_fill_bytes(dest),
            RandomSource::Entropy(rng) => rng.try_fill_bytes(dest),
        }
    }
}

fn seed_from_value(value: &Value) -> Seed {
    if value.kind() == ValueKind::Bytes {
        if let Some(bytes) = value.as_bytes() {
            return Seed::Bytes(bytes.to_vec());
        }
    }
    if let Some(text) = value.as_str() {
        return Seed::Text(text.to_string());
    }
    if value.kind() == ValueKind::Bool {
        return Seed::Int(i128::from(value.is_true()));
    }
    if value.is_integer() {
        if let Some(n) = value.as_i64() {
            return Seed::Int(i128::from(n));
        }
    }
    Seed::Text(value.to_string())
}

/// `k` random bits (`k <= 64`), consuming whole 32-bit words.
pub fn getrandbits<R: RngCore + ?Sized>(rng: &mut R, k: u32) -> u64 {
    match k {
        0 => 0,
        1..=32 => u64::from(rng.next_u32() >> (32 - k)),
        _ => {
            let k = k.min(64);
            let low = u64::from(rng.next_u32());
            let high = u64::from(rng.next_u32() >> (64 - k));
            (high << 32) | low
        }
    }
}

/// Uniform integer in `0..n` by rejection sampling (`n > 0`).
pub fn below<R: RngCore + ?Sized>(rng: &mut R, n: u64) -> u64 {
    let bits = u64::BITS - n.leading_zeros();
    loop {
        let r = getrandbits(rng, bits);
        if r < n {
            return r;
        }
    }
}

fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Uniform choice from `range(start, stop, step)`.
pub fn randrange<R: RngCore + ?Sized>(
    rng: &mut R,
    start: i64,
    stop: i64,
    step: i64,
) -> Result<i64, FilterError> {
    let empty = || FilterError::EmptyRange { start, stop, step };
    let width = i128::from(stop) - i128::from(start);
    let step_wide = i128::from(step);

    let count = match step {
        0 => return Err(FilterError::ZeroStep),
        1 => width,
        s if s > 0 => floor_div(width + step_wide - 1, step_wide),
        _ => floor_div(width + step_wide + 1, step_wide),
    };
    if count <= 0 {
        return Err(empty());
    }

    let offset = below(rng, u64::try_from(count).map_err(|_| empty())?);
    let value = i128::from(start) + step_wide * i128::from(offset);
    i64::try_from(value).map_err(|_| empty())
}

/// Uniform choice of one element.
pub fn choice<'a, R: RngCore + ?Sized, T>(
    rng: &mut R,
    items: &'a [T],
) -> Result<&'a T, FilterError> {
    if items.is_empty() {
        return Err(FilterError::EmptySequence);
    }
    Ok(&items[below(rng, items.len() as u64) as usize])
}

/// In-place Fisher–Yates shuffle, walking from the last element down.
pub fn shuffle<R: RngCore + ?Sized, T>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = below(rng, i as u64 + 1) as usize;
        items.swap(i, j);
    }
}

/// Completes a MAC address prefix to six octets.
pub fn random_mac<R: RngCore + ?Sized>(rng: &mut R, prefix: &str) -> Result<String, FilterError> {
    let mut octets: Vec<String> = if prefix.is_empty() {
        Vec::new()
    } else {
        prefix.split(':').map(str::to_string).collect()
    };

    if octets.len() > 5 {
        return Err(FilterError::TooManyMacParts {
            prefix: prefix.to_string(),
        });
    }
    if let Some(bad) = octets
        .iter()
        .find(|part| part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()))
    {
        return Err(FilterError::InvalidMacByte {
            prefix: prefix.to_string(),
            part: bad.clone(),
        });
    }

    while octets.len() < 6 {
        octets.push(format!("{:02x}", below(rng, 256)));
    }
    Ok(octets.join(":"))
}

/// `ans_random(stop, start=None, step=None, seed=None)`
///
/// Samples an integer from a range when `stop` is an integer, otherwise picks one
/// element of `stop`.
pub fn ans_random(
    stop: Value,
    start: Option<Value>,
    step: Option<Value>,
    seed: Option<Value>,
    kwargs: Kwargs,
) -> Result<Value, Error> {
    let start = args::param(start, &kwargs, "start")?;
    let step = args::param(step, &kwargs, "step")?;
    let seed = args::param(seed, &kwargs, "seed")?;
    kwargs.assert_all_used()?;

    let mut rng = RandomSource::from_seed_value(seed.as_ref());

    if stop.is_integer() {
        let stop = args::as_int(&stop, "stop")?;
        let start = start.map(|v| args::as_int(&v, "start")).transpose()?;
        let step = step.map(|v| args::as_int(&v, "step")).transpose()?;
        let value = randrange(&mut rng, start.unwrap_or(0), stop, step.unwrap_or(1))?;
        return Ok(Value::from(value));
    }

    if start.is_some() {
        return Err(FilterError::IncompatibleArgument { param: "start" }.into());
    }
    if step.is_some() {
        return Err(FilterError::IncompatibleArgument { param: "step" }.into());
    }

    let items: Vec<Value> = stop
        .try_iter()
        .map_err(|_| {
            FilterError::invalid(format!(
                "ans_random expects an integer or a sequence, got {}",
                stop.kind()
            ))
        })?
        .collect();
    Ok(choice(&mut rng, &items)?.clone())
}

/// `shuffle(seq, seed=None)`: a shuffled copy of `seq`.
pub fn shuffle_filter(seq: Value, seed: Option<Value>, kwargs: Kwargs) -> Result<Value, Error> {
    let seed = args::param(seed, &kwargs, "seed")?;
    kwargs.assert_all_used()?;

    let mut items: Vec<Value> = seq.try_iter()?.collect();
    let mut rng = RandomSource::from_seed_value(seed.as_ref());
    shuffle(&mut rng, &mut items);
    Ok(Value::from(items))
}

/// `random_mac(prefix, seed=None)`
pub fn random_mac_filter(
    prefix: Value,
    seed: Option<Value>,
    kwargs: Kwargs,
) -> Result<String, Error> {
    let seed = args::param(seed, &kwargs, "seed")?;
    kwargs.assert_all_used()?;

    let prefix = if prefix.is_none() || prefix.is_undefined() {
        String::new()
    } else {
        prefix.to_string()
    };
    let mut rng = RandomSource::from_seed_value(seed.as_ref());
    Ok(random_mac(&mut rng, &prefix)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: &str) -> RandomSource {
        RandomSource::seeded(&Seed::Text(seed.into()))
    }

    #[test]
    fn test_randrange_reference_values() {
        assert_eq!(randrange(&mut seeded("123"), 0, 100, 1).unwrap(), 93);
        assert_eq!(randrange(&mut seeded("123"), 94, 100, 2).unwrap(), 98);
        assert_eq!(randrange(&mut seeded(""), 0, 100, 1).unwrap(), 58);
    }

    #[test]
    fn test_randrange_negative_values() {
        let mut rng = seeded("123");
        assert_eq!(randrange(&mut rng, -5, 5, 1).unwrap(), -4);
        assert_eq!(randrange(&mut rng, 10, 0, -3).unwrap(), 4);
    }

    #[test]
    fn test_randrange_rejects_empty_and_zero_step() {
        let mut rng = seeded("x");
        assert!(matches!(
            randrange(&mut rng, 5, 5, 1),
            Err(FilterError::EmptyRange { .. })
        ));
        assert!(matches!(
            randrange(&mut rng, 0, 10, -1),
            Err(FilterError::EmptyRange { .. })
        ));
        assert!(matches!(
            randrange(&mut rng, 0, 10, 0),
            Err(FilterError::ZeroStep)
        ));
    }

    #[test]
    fn test_getrandbits_wide() {
        let mut rng = RandomSource::seeded(&Seed::Int(123));
        assert_eq!(getrandbits(&mut rng, 40), 292_282_676_070);
    }

    #[test]
    fn test_choice_and_shuffle_reference_values() {
        assert_eq!(*choice(&mut seeded("123"), &[1, 2, 3]).unwrap(), 3);

        let mut items = vec![1, 2, 3];
        shuffle(&mut seeded("123"), &mut items);
        assert_eq!(items, vec![2, 1, 3]);
    }

    #[test]
    fn test_choice_from_empty_fails() {
        let empty: [i32; 0] = [];
        assert!(matches!(
            choice(&mut seeded("123"), &empty),
            Err(FilterError::EmptySequence)
        ));
    }

    #[test]
    fn test_random_mac_fills_from_seed_stream() {
        let cases = [
            ("", "25:a4:fc:1f:87:08"),
            ("52", "52:25:a4:fc:1f:87"),
            ("52:54", "52:54:25:a4:fc:1f"),
            ("52:54:00", "52:54:00:25:a4:fc"),
            ("52:54:00:25", "52:54:00:25:25:a4"),
            ("52:54:00:25:a4", "52:54:00:25:a4:25"),
        ];
        for (prefix, expected) in cases {
            assert_eq!(random_mac(&mut seeded("123"), prefix).unwrap(), expected);
        }
    }

    #[test]
    fn test_random_mac_rejects_bad_prefix() {
        let err = random_mac(&mut seeded("123"), "52:54:xy").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid MAC address prefix \"52:54:xy\": \"xy\" is not a hexadecimal byte"
        );

        let err = random_mac(&mut seeded("123"), "52:54:00:25:a4:fc").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid MAC address prefix \"52:54:00:25:a4:fc\": too many parts"
        );
    }

    #[test]
    fn test_seed_from_value_kinds() {
        assert_eq!(seed_from_value(&Value::from("abc")), Seed::Text("abc".into()));
        assert_eq!(seed_from_value(&Value::from(42)), Seed::Int(42));
        assert_eq!(seed_from_value(&Value::from(true)), Seed::Int(1));
        assert_eq!(
            seed_from_value(&Value::from_bytes(b"ab".to_vec())),
            Seed::Bytes(b"ab".to_vec())
        );
    }

    #[test]
    fn test_entropy_source_stays_in_range() {
        let mut rng = RandomSource::entropy();
        for _ in 0..100 {
            let n = randrange(&mut rng, 10, 20, 3).unwrap();
            assert!([10, 13, 16, 19].contains(&n));
        }
    }
}
