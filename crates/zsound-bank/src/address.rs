//! Temp-address allocation.
//!
//! Each sample gets a placeholder address standing in for its eventual
//! location in the sample table. All randomness flows through an injected
//! generator so a fixed seed yields a fixed bank.

use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

/// Range temp addresses are drawn from. The top bit stays clear so tools
/// reading the field as signed still see a positive value.
pub const TEMP_ADDRESS_RANGE: RangeInclusive<u32> = 0x1000_0000..=0x7FFF_FFFF;

/// A placeholder sample-table address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TempAddress(u32);

impl TempAddress {
    /// Wraps a raw value, or `None` if it is outside [`TEMP_ADDRESS_RANGE`].
    pub fn new(value: u32) -> Option<Self> {
        TEMP_ADDRESS_RANGE.contains(&value).then_some(Self(value))
    }

    /// The raw address.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Eight upper-case hex digits.
    pub fn to_hex(self) -> String {
        format!("{:08X}", self.0)
    }
}

impl fmt::Display for TempAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

/// Creates a PCG32 generator from a 32-bit seed.
///
/// The seed is duplicated into both halves of the 64-bit state seed.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = u64::from(seed) | (u64::from(seed) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Derives an independent seed for one sample from a batch seed.
///
/// Hashes the base seed (little-endian) followed by the sample key with
/// BLAKE3 and keeps the first four bytes.
pub fn derive_sample_seed(base_seed: u32, key: &str) -> u32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&base_seed.to_le_bytes());
    hasher.update(key.as_bytes());
    let hash = hasher.finalize();

    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&hash.as_bytes()[..4]);
    u32::from_le_bytes(bytes)
}

/// Draws a single address from `rng`.
pub fn random_address<R: Rng + ?Sized>(rng: &mut R) -> TempAddress {
    TempAddress(rng.gen_range(TEMP_ADDRESS_RANGE))
}

/// Hands out distinct temp addresses for one batch.
#[derive(Debug)]
pub struct AddressAllocator<R> {
    rng: R,
    issued: HashSet<TempAddress>,
}

impl<R: Rng> AddressAllocator<R> {
    /// Wraps an injected generator.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            issued: HashSet::new(),
        }
    }

    /// Returns an address not yet issued by this allocator.
    pub fn allocate(&mut self) -> TempAddress {
        loop {
            let address = random_address(&mut self.rng);
            if self.issued.insert(address) {
                log::debug!("allocated temp address {}", address);
                return address;
            }
            log::debug!("temp address {} already issued; redrawing", address);
        }
    }

    /// Addresses issued so far.
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

impl AddressAllocator<Pcg32> {
    /// Allocator over a PCG32 stream seeded from `seed`.
    pub fn from_seed(seed: u32) -> Self {
        Self::new(create_rng(seed))
    }

    /// Allocator over OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(Pcg32::from_entropy())
    }
}

/// Allocates one sample's address from a stream seeded by
/// [`derive_sample_seed`], independent of any other sample.
pub fn address_for_sample(base_seed: u32, key: &str) -> TempAddress {
    random_address(&mut create_rng(derive_sample_seed(base_seed, key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_new_checks_range() {
        assert!(TempAddress::new(0x0FFF_FFFF).is_none());
        assert!(TempAddress::new(0x1000_0000).is_some());
        assert!(TempAddress::new(0x7FFF_FFFF).is_some());
        assert!(TempAddress::new(0x8000_0000).is_none());
    }

    #[test]
    fn test_hex_and_display() {
        let address = TempAddress::new(0x1A2B_3C4D).unwrap();
        assert_eq!(address.to_hex(), "1A2B3C4D");
        assert_eq!(address.to_string(), "0x1A2B3C4D");
    }

    #[test]
    fn test_seeded_allocation_is_deterministic() {
        let mut a = AddressAllocator::from_seed(42);
        let mut b = AddressAllocator::from_seed(42);
        let first: Vec<_> = (0..3).map(|_| a.allocate()).collect();
        let second: Vec<_> = (0..3).map(|_| b.allocate()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_allocations_stay_in_range() {
        let mut allocator = AddressAllocator::from_seed(7);
        for _ in 0..1000 {
            assert!(TEMP_ADDRESS_RANGE.contains(&allocator.allocate().value()));
        }
        assert_eq!(allocator.issued(), 1000);
    }

    #[test]
    fn test_duplicates_are_redrawn() {
        // Consecutive small draws map onto the same address.
        let mut allocator = AddressAllocator::new(StepRng::new(0, 1));
        let first = allocator.allocate();
        let second = allocator.allocate();
        assert_eq!(first.value(), 0x1000_0000);
        assert_ne!(first, second);
        assert_eq!(allocator.issued(), 2);
    }

    #[test]
    fn test_derive_sample_seed() {
        assert_eq!(derive_sample_seed(42, "kick"), derive_sample_seed(42, "kick"));
        assert_ne!(derive_sample_seed(42, "kick"), derive_sample_seed(42, "snare"));
        assert_ne!(derive_sample_seed(42, "kick"), derive_sample_seed(43, "kick"));
        assert_eq!(address_for_sample(1, "pad"), address_for_sample(1, "pad"));
    }
}
