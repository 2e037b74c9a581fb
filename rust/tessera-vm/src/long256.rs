//! 256-bit integers stored as four 64-bit limbs, least significant first.

use std::cmp::Ordering;
use std::fmt;

/// A 256-bit value as stored in a column.
///
/// The value with every limb equal to `i64::MIN` is the null value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Long256 {
    limbs: [i64; 4],
}

impl Long256 {
    pub const NULL: Long256 = Long256 {
        limbs: [i64::MIN; 4],
    };

    pub const ZERO: Long256 = Long256 { limbs: [0; 4] };

    pub const fn new(l0: i64, l1: i64, l2: i64, l3: i64) -> Long256 {
        Long256 {
            limbs: [l0, l1, l2, l3],
        }
    }

    pub const fn from_limbs(limbs: [i64; 4]) -> Long256 {
        Long256 { limbs }
    }

    /// Limbs, least significant first.
    #[inline]
    pub fn limbs(&self) -> [i64; 4] {
        self.limbs
    }

    /// # Panics
    ///
    /// Panics if `index > 3`.
    #[inline]
    pub fn limb(&self, index: usize) -> i64 {
        self.limbs[index]
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.limbs == [i64::MIN; 4]
    }

    /// Writes the hex rendering to `sink`.
    ///
    /// Null writes nothing. Otherwise the output is `0x`, the most significant
    /// non-zero limb without leading zeros, then each lower limb padded to 16
    /// digits. Zero is written as `0x00`.
    pub fn write_hex(&self, sink: &mut dyn fmt::Write) -> fmt::Result {
        write_hex_limbs(&self.limbs, sink)
    }
}

pub(crate) fn write_hex_limbs(limbs: &[i64; 4], sink: &mut dyn fmt::Write) -> fmt::Result {
    if limbs == &[i64::MIN; 4] {
        return Ok(());
    }
    let Some(top) = limbs.iter().rposition(|&l| l != 0) else {
        return sink.write_str("0x00");
    };
    // The top limb keeps whole bytes: an even digit count.
    let top_limb = limbs[top] as u64;
    let digits = (16 - top_limb.leading_zeros() / 4) as usize;
    let width = digits + digits % 2;
    write!(sink, "0x{top_limb:0width$x}")?;
    for &limb in limbs[..top].iter().rev() {
        write!(sink, "{:016x}", limb as u64)?;
    }
    Ok(())
}

impl fmt::Display for Long256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_hex(f)
    }
}

/// Unsigned 256-bit ordering.
impl Ord for Long256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.limbs
            .iter()
            .rev()
            .map(|&l| l as u64)
            .cmp(other.limbs.iter().rev().map(|&l| l as u64))
    }
}

impl PartialOrd for Long256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<[i64; 4]> for Long256 {
    fn from(limbs: [i64; 4]) -> Self {
        Long256 { limbs }
    }
}

/// Receives the four limbs of a 256-bit value in one call.
pub trait Long256Acceptor {
    type Output;

    fn set_all(&mut self, l0: i64, l1: i64, l2: i64, l3: i64) -> Self::Output;
}

impl Long256Acceptor for Long256 {
    type Output = ();

    fn set_all(&mut self, l0: i64, l1: i64, l2: i64, l3: i64) {
        self.limbs = [l0, l1, l2, l3];
    }
}

impl<F, R> Long256Acceptor for F
where
    F: FnMut(i64, i64, i64, i64) -> R,
{
    type Output = R;

    fn set_all(&mut self, l0: i64, l1: i64, l2: i64, l3: i64) -> R {
        self(l0, l1, l2, l3)
    }
}
