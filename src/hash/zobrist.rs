// src/hash/zobrist.rs
//
// The static Zobrist key table and the small pure helpers the position
// tracker XORs against. Keys are generated once from a seeded RNG
// (fixed seed under `deterministic_rng`, OS entropy otherwise) so two
// processes running the same feature set always hash identically.

use once_cell::sync::OnceCell;
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::board::castle_bits::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::board::{Board, Color, PieceKind, Square};

#[cfg(feature = "deterministic_rng")]
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

fn make_zobrist_rng() -> StdRng {
    #[cfg(feature = "deterministic_rng")]
    {
        StdRng::seed_from_u64(ZOBRIST_SEED)
    }
    #[cfg(not(feature = "deterministic_rng"))]
    {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        StdRng::from_seed(seed)
    }
}

pub struct ZobristKeys {
    /// `[color][kind][square]`, color White=0/Black=1, kind in piece order.
    pub piece: [[[u64; 64]; 6]; 2],
    pub side_to_move: u64,
    /// `[0]`=WK, `[1]`=WQ, `[2]`=BK, `[3]`=BQ, matching `castle_bits`.
    pub castling: [u64; 4],
    /// file a..h => 0..7
    pub ep_file: [u64; 8],
}

#[inline]
pub fn kind_index(kind: PieceKind) -> usize {
    match kind {
        PieceKind::Pawn => 0,
        PieceKind::Knight => 1,
        PieceKind::Bishop => 2,
        PieceKind::Rook => 3,
        PieceKind::Queen => 4,
        PieceKind::King => 5,
    }
}

#[inline]
pub fn psq_key(color: Color, kind: PieceKind, sq_index: u8) -> u64 {
    zobrist_keys().piece[color as usize][kind_index(kind)][sq_index as usize]
}

#[inline]
pub fn side_key() -> u64 {
    zobrist_keys().side_to_move
}

#[inline]
pub fn ep_key(file: u8) -> u64 {
    zobrist_keys().ep_file[file as usize]
}

#[inline]
pub fn castle_hash(rights: u8) -> u64 {
    let keys = zobrist_keys();
    let mut h = 0u64;
    if rights & CASTLE_WK != 0 {
        h ^= keys.castling[0];
    }
    if rights & CASTLE_WQ != 0 {
        h ^= keys.castling[1];
    }
    if rights & CASTLE_BK != 0 {
        h ^= keys.castling[2];
    }
    if rights & CASTLE_BQ != 0 {
        h ^= keys.castling[3];
    }
    h
}

/// `Some(file)` iff a pawn of `side_to_move` sits adjacent to the en
/// passant square and could actually capture onto it this ply — a
/// refinement over "the last move was a double push" that keeps
/// positions that differ only in a dead en passant right from hashing
/// distinctly.
pub fn ep_file_to_hash(board: &Board, side_to_move: Color) -> Option<u8> {
    let ep = board.en_passant?;
    let r = ep.rank();
    let (pawn_rank, expected_side) = match r {
        2 => (r + 1, Color::Black),
        5 => (r - 1, Color::White),
        _ => return None,
    };
    if side_to_move != expected_side {
        return None;
    }
    for df in [-1, 1] {
        if let Some(sq) = Square::new(ep.file() + df, pawn_rank) {
            if let Some(p) = board.piece_at(sq) {
                if p.kind == PieceKind::Pawn && p.color == side_to_move {
                    return Some(ep.file() as u8);
                }
            }
        }
    }
    None
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_zobrist_keys_with_rng(make_zobrist_rng()))
}

fn generate_zobrist_keys_with_rng(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0u64; 4],
        ep_file: [0u64; 8],
    };

    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece[c][p][sq] = non_zero(&mut rng);
            }
        }
    }
    for i in 0..4 {
        keys.castling[i] = non_zero(&mut rng);
    }
    for f in 0..8 {
        keys.ep_file[f] = non_zero(&mut rng);
    }
    keys.side_to_move = non_zero(&mut rng);

    keys
}
