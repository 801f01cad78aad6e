//! Opaque polygon identifiers and the bit-partitioning id manager
//!
//! A [`PolyRef`] packs salt, tile index and polygon index into a single
//! 32-bit value. How many bits each part receives depends on the mesh
//! capacities, so the partitioning lives in [`PolyIdManager`] rather than in
//! the reference itself. Everything that merely stores or transports a
//! reference treats it as opaque.

/// Opaque reference to a polygon (or, with a zero polygon index, a tile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PolyRef(u32);

impl PolyRef {
    /// Creates a reference from a raw 32-bit value
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw 32-bit value
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Partitions 32-bit polygon references into salt, tile and polygon fields
///
/// The bit widths are fixed at construction; references produced by one
/// manager are only meaningful to managers with the same widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PolyIdManager {
    poly_bits: u32,
    tile_bits: u32,
    salt_bits: u32,
}

impl PolyIdManager {
    /// Creates a manager with explicit field widths
    ///
    /// The three widths must not exceed 32 bits in total.
    pub fn new(poly_bits: u32, tile_bits: u32, salt_bits: u32) -> Self {
        debug_assert!(poly_bits + tile_bits + salt_bits <= 32);
        Self {
            poly_bits,
            tile_bits,
            salt_bits,
        }
    }

    /// Derives field widths from mesh capacities
    ///
    /// Tile and polygon fields are sized to the next power of two of the
    /// respective capacity; the salt receives whatever remains of the 32
    /// bits, capped at 31.
    pub fn for_capacities(max_tiles: i32, max_polys: i32) -> Self {
        let tile_bits = ceil_log2(max_tiles.max(1) as u32).max(1);
        let poly_bits = ceil_log2(max_polys.max(1) as u32).max(1);
        let salt_bits = 32u32.saturating_sub(tile_bits + poly_bits).min(31);
        Self::new(poly_bits, tile_bits, salt_bits)
    }

    /// Number of bits used for the polygon index
    pub fn poly_bits(&self) -> u32 {
        self.poly_bits
    }

    /// Number of bits used for the tile index
    pub fn tile_bits(&self) -> u32 {
        self.tile_bits
    }

    /// Number of bits used for the salt
    pub fn salt_bits(&self) -> u32 {
        self.salt_bits
    }

    /// Packs salt, tile index and polygon index into a reference
    pub fn encode(&self, salt: u32, tile_index: u32, poly_index: u32) -> PolyRef {
        PolyRef::new(
            ((salt & self.salt_mask()) << (self.poly_bits + self.tile_bits))
                | ((tile_index & self.tile_mask()) << self.poly_bits)
                | (poly_index & self.poly_mask()),
        )
    }

    /// Extracts the polygon index from a reference
    pub fn decode_poly_index(&self, reference: PolyRef) -> u32 {
        reference.id() & self.poly_mask()
    }

    /// Extracts the tile index from a reference
    pub fn decode_tile_index(&self, reference: PolyRef) -> u32 {
        (reference.id() >> self.poly_bits) & self.tile_mask()
    }

    /// Extracts the salt from a reference
    pub fn decode_salt(&self, reference: PolyRef) -> u32 {
        (reference.id() >> (self.poly_bits + self.tile_bits)) & self.salt_mask()
    }

    fn poly_mask(&self) -> u32 {
        mask(self.poly_bits)
    }

    fn tile_mask(&self) -> u32 {
        mask(self.tile_bits)
    }

    fn salt_mask(&self) -> u32 {
        mask(self.salt_bits)
    }
}

/// All-ones mask of the given width
fn mask(bits: u32) -> u32 {
    if bits >= 32 { u32::MAX } else { (1 << bits) - 1 }
}

/// Smallest n such that 2^n >= value (value >= 1)
fn ceil_log2(value: u32) -> u32 {
    value.next_power_of_two().trailing_zeros()
}
