// src/board/piece.rs

use std::collections::HashMap;

use crate::board::Color;
use crate::square::Square;

/// Stable per-piece identity, unique within one `Game` for the lifetime
/// of the process. Never reused, even after the piece is captured.
pub type Uid = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Piece rank per the glossary: P=1, N=B=3, R=5, Q=9, K=100. Used by
    /// Stalwart/Belligerent/Dagger/Double-Kill/Quantum-Kill/Necromancer.
    #[inline]
    pub fn rank(self) -> u32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 100,
        }
    }

    /// Material value for the reference evaluator only (not used by the
    /// core engine itself).
    #[inline]
    pub fn material_value(self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 0,
        }
    }

    pub fn symbol(self, color: Color) -> char {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        if color == Color::White {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CardinalDir {
    North,
    South,
    East,
    West,
}

/// Per-piece metadata. The spec describes this as "a small string→value
/// map; notably `block_dir`" — kept as a real map (rather than a single
/// `Option<CardinalDir>` field) so future per-piece flags compose without
/// changing the `Undo` snapshot shape, while the only value variant
/// actually produced by this engine is `Dir`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Meta(HashMap<String, MetaValue>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MetaValue {
    Dir(CardinalDir),
}

impl Meta {
    pub fn block_dir(&self) -> Option<CardinalDir> {
        match self.0.get("block_dir") {
            Some(MetaValue::Dir(d)) => Some(*d),
            None => None,
        }
    }

    pub fn set_block_dir(&mut self, dir: CardinalDir) {
        self.0.insert("block_dir".to_string(), MetaValue::Dir(dir));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Piece {
    pub uid: Uid,
    pub color: Color,
    pub kind: PieceKind,
    pub pos: Square,
    pub has_moved: bool,
    pub meta: Meta,
}

impl Piece {
    pub fn new(uid: Uid, color: Color, kind: PieceKind, pos: Square) -> Self {
        Piece {
            uid,
            color,
            kind,
            pos,
            has_moved: false,
            meta: Meta::default(),
        }
    }
}
