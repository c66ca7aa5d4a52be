// src/moves/types.rs

use std::fmt;
use std::ops::{Deref, DerefMut};

use arrayvec::ArrayVec;

use crate::board::{Color, Meta, Piece, PieceKind, Uid};
use crate::square::Square;

/// A buffer moves can be pushed into, implemented for both a heap `Vec`
/// (used by the generic legal-move path) and a fixed-capacity
/// `ArrayVec` (used by perft's reusable per-ply buffers).
pub trait MoveBuffer: Deref<Target = [Move]> + DerefMut {
    fn push(&mut self, mv: Move);
    fn clear(&mut self);
}

impl MoveBuffer for Vec<Move> {
    fn push(&mut self, mv: Move) {
        Vec::push(self, mv);
    }
    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<const N: usize> MoveBuffer for ArrayVec<Move, N> {
    fn push(&mut self, mv: Move) {
        ArrayVec::push(self, mv);
    }
    fn clear(&mut self) {
        ArrayVec::clear(self);
    }
}

/// The closed family of move values. Each variant carries enough to
/// apply and later fully reverse itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Move {
    Normal {
        from: Square,
        to: Square,
        double_pawn_push: bool,
    },
    EnPassant {
        from: Square,
        to: Square,
        captured_sq: Square,
    },
    Castle {
        from: Square,
        to: Square,
        rook_from: Square,
        rook_to: Square,
    },
    Promotion {
        from: Square,
        to: Square,
        promote_to: PieceKind,
    },
    RemoteCapture {
        from: Square,
        to: Square,
        origin_sq: Square,
    },
}

impl Move {
    pub fn from_sq(&self) -> Square {
        match *self {
            Move::Normal { from, .. }
            | Move::EnPassant { from, .. }
            | Move::Castle { from, .. }
            | Move::Promotion { from, .. }
            | Move::RemoteCapture { from, .. } => from,
        }
    }

    pub fn to_sq(&self) -> Square {
        match *self {
            Move::Normal { to, .. }
            | Move::EnPassant { to, .. }
            | Move::Castle { to, .. }
            | Move::Promotion { to, .. }
            | Move::RemoteCapture { to, .. } => to,
        }
    }

    /// The move's "effective origin" used by CaptureDefense's Block Path
    /// direction test: `from` for Normal/EnPassant, `origin_sq` for
    /// RemoteCapture.
    pub fn effective_origin(&self) -> Square {
        match *self {
            Move::RemoteCapture { origin_sq, .. } => origin_sq,
            _ => self.from_sq(),
        }
    }

    pub fn is_double_pawn_push(&self) -> bool {
        matches!(self, Move::Normal { double_pawn_push: true, .. })
    }

    /// Structural equality used for "forbidden move" comparisons (Redo)
    /// and illegal-move detection: same variant, same from/to/extra
    /// fields. `Move` already derives `PartialEq`, so this is just a
    /// named alias kept for readability at call sites.
    pub fn structurally_equal(&self, other: &Move) -> bool {
        self == other
    }

    pub fn to_uci(&self) -> String {
        let mut s = format!("{}{}", self.from_sq(), self.to_sq());
        if let Move::Promotion { promote_to, .. } = self {
            let c = match promote_to {
                PieceKind::Queen => 'q',
                PieceKind::Rook => 'r',
                PieceKind::Bishop => 'b',
                PieceKind::Knight => 'n',
                _ => '?',
            };
            s.push(c);
        }
        if let Move::RemoteCapture { origin_sq, .. } = self {
            s.push('@');
            s.push_str(&origin_sq.to_string());
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// One reversal entry: the piece's value at the time of snapshotting,
/// along with the position/has_moved it should be restored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalEntry {
    pub piece: Piece,
    pub prior_pos: Square,
    pub prior_has_moved: bool,
}

/// Reversible delta for one applied move. Four disjoint reversal
/// classes (see `SPEC_FULL.md` §3) plus an opaque `extras` bag the
/// arcane subsystem uses to stash its own one-shot snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Undo {
    pub mv: Move,
    /// The pre-move actor: for Promotion this is the pawn; for
    /// RemoteCapture, the non-moving attacking piece.
    pub mover: Piece,
    pub captured_piece: Option<Piece>,

    pub changed: Vec<ReversalEntry>,
    pub captured: Vec<ReversalEntry>,
    pub removed: Vec<ReversalEntry>,
    pub added: Vec<Piece>,

    /// Per-piece meta snapshots taken before mutation (uid, meta).
    pub meta_snapshots: Vec<(Uid, Meta)>,

    pub prev_side: Color,
    pub prev_last_move: Option<Move>,
    pub prev_castling_rights: u8,
    pub prev_en_passant: Option<Square>,
    pub prev_halfmove_clock: u32,
    pub prev_fullmove_number: u32,

    pub extras: crate::arcane::resolution::UndoExtras,
}

impl Undo {
    pub fn new(mv: Move, mover: Piece, prev_side: Color, prev_last_move: Option<Move>) -> Self {
        Undo {
            mv,
            mover,
            captured_piece: None,
            changed: Vec::new(),
            captured: Vec::new(),
            removed: Vec::new(),
            added: Vec::new(),
            meta_snapshots: Vec::new(),
            prev_side,
            prev_last_move,
            prev_castling_rights: 0,
            prev_en_passant: None,
            prev_halfmove_clock: 0,
            prev_fullmove_number: 1,
            extras: Default::default(),
        }
    }
}
