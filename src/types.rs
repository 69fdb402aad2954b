//! Shared types used throughout the crate.

/// Galileo week number.
pub type Wn = u16;
/// Time of week, in seconds.
pub type Tow = u32;

/// A slice of bits.
///
/// A [`BitSlice`](bitvec::slice::BitSlice) from the `bitvec` crate used to
/// represent binary data whose length is not a multiple of 8 bits, or which is
/// not byte aligned within its containing message.
///
/// In the Galileo documentation, the most significant bit of the first byte of
/// the data is numbered as bit 0, so we use the [`Msb0`](bitvec::order::Msb0)
/// ordering everywhere.
pub type BitSlice = bitvec::slice::BitSlice<u8, bitvec::order::Msb0>;
/// An owned, growable bit vector with the same bit ordering as [`BitSlice`].
pub type BitVec = bitvec::vec::BitVec<u8, bitvec::order::Msb0>;

/// Number of pages in one I/NAV subframe.
pub const PAGES_PER_SUBFRAME: usize = 15;
/// Number of bits in the even half (E1-B) of an I/NAV page.
pub const PAGE_EVEN_BITS: usize = 114;
/// Number of bits in the odd half (E1-B) of an I/NAV page.
pub const PAGE_ODD_BITS: usize = 120;
/// Total number of bits in an I/NAV subframe: 15 pages, each the concatenation
/// of a 114-bit even half and a 120-bit odd half, with the 6-bit inter-page
/// tail already removed.
pub const SUBFRAME_BITS: usize = PAGES_PER_SUBFRAME * (PAGE_EVEN_BITS + PAGE_ODD_BITS);

/// Number of bytes in the HKROOT field of one subframe (120 bits).
pub const HKROOT_MESSAGE_BYTES: usize = 15;
/// Number of bytes in the MACK field of one subframe (480 bits).
pub const MACK_MESSAGE_BYTES: usize = 60;
/// HKROOT message: the NMA-header-and-DSM-block section of a subframe,
/// reassembled from the 15 8-bit sections carried one per page.
pub type HkrootMessage = [u8; HKROOT_MESSAGE_BYTES];
/// MACK message: the tags-and-disclosed-key section of a subframe,
/// reassembled from the 15 32-bit sections carried one per page.
pub type MackMessage = [u8; MACK_MESSAGE_BYTES];

/// Size of a DSM block in bytes (13 bytes, 104 bits).
pub const DSM_BLOCK_BYTES: usize = 13;
/// One DSM block: the HKROOT message minus the NMA header and DSM header.
pub type DsmBlock = [u8; DSM_BLOCK_BYTES];

/// Size in bytes of a 256-bit Merkle tree node (leaf, sibling or root).
pub const MERKLE_TREE_NODE_BYTES: usize = 32;
/// A 256-bit Merkle tree node.
pub type MerkleTreeNode = [u8; MERKLE_TREE_NODE_BYTES];

/// The number of SVNs in the Galileo constellation.
pub const NUM_SVNS: usize = 36;

/// The time of week given in hours, as an 8-bit integer.
///
/// This is used in the DSM-KROOT message.
pub type Towh = u8;

/// Duration of one subframe, in seconds.
pub const SECONDS_PER_SUBFRAME: Tow = 30;
