// src/moves/execute.rs
//
// `apply_move`/`unapply`: turns a `Move` into board mutations plus a
// fully-reversing `Undo`. Clock bookkeeping is kept separate
// (`update_clocks`/`restore_clocks`) since it is a `Game`-level concern
// applied after `apply_move` returns. Grounded in
// `original_source/core/moves.py` and `original_source/arcane/moves.py`
// (the `RemoteCaptureMove` variant).

use crate::board::castle_bits::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::board::{Board, Color, PieceKind, Square};
use crate::moves::types::{Move, ReversalEntry, Undo};

fn rook_corner_mask(color: Color, sq: Square) -> u8 {
    match (color, sq.index()) {
        (Color::White, 0) => CASTLE_WQ,
        (Color::White, 7) => CASTLE_WK,
        (Color::Black, 56) => CASTLE_BQ,
        (Color::Black, 63) => CASTLE_BK,
        _ => 0,
    }
}

fn clear_rights_on_move(board: &mut Board, color: Color, kind: PieceKind, from: Square) {
    let mut mask = 0u8;
    if kind == PieceKind::King {
        mask |= match color {
            Color::White => CASTLE_WK | CASTLE_WQ,
            Color::Black => CASTLE_BK | CASTLE_BQ,
        };
    }
    if kind == PieceKind::Rook {
        mask |= rook_corner_mask(color, from);
    }
    board.castling_rights &= !mask;
}

fn clear_rights_on_capture(board: &mut Board, color: Color, kind: PieceKind, sq: Square) {
    if kind == PieceKind::Rook {
        board.castling_rights &= !rook_corner_mask(color, sq);
    }
}

fn ep_target_for_double_push(from: Square, to: Square) -> Square {
    Square::new(from.file(), (from.rank() + to.rank()) / 2).expect("double pawn push spans two ranks on the same file")
}

/// Mutate `board` per `mv` and produce the `Undo` that reverses it.
/// `remote_should_capture` is `Some(bool)` only for `RemoteCapture`
/// against an enemy-occupied square (the gate computed by
/// `Game::remote_capture_should_capture`); ignored for every other variant.
pub fn apply_move(
    mv: &Move,
    board: &mut Board,
    prev_side: Color,
    prev_last_move: Option<Move>,
    remote_should_capture: Option<bool>,
) -> Undo {
    let prev_castling_rights = board.castling_rights;
    let prev_en_passant = board.en_passant;

    let mut undo = match mv {
        Move::Normal { from, to, double_pawn_push } => {
            apply_normal(board, *from, *to, *double_pawn_push, prev_side, prev_last_move, mv.clone())
        }
        Move::EnPassant { from, to, captured_sq } => {
            apply_en_passant(board, *from, *to, *captured_sq, prev_side, prev_last_move, mv.clone())
        }
        Move::Castle { from, to, rook_from, rook_to } => {
            apply_castle(board, *from, *to, *rook_from, *rook_to, prev_side, prev_last_move, mv.clone())
        }
        Move::Promotion { from, to, promote_to } => {
            apply_promotion(board, *from, *to, *promote_to, prev_side, prev_last_move, mv.clone())
        }
        Move::RemoteCapture { from, to, origin_sq } => apply_remote_capture(
            board,
            *from,
            *to,
            *origin_sq,
            remote_should_capture.unwrap_or(false),
            prev_side,
            prev_last_move,
            mv.clone(),
        ),
    };

    undo.prev_castling_rights = prev_castling_rights;
    undo.prev_en_passant = prev_en_passant;
    undo
}

fn apply_normal(board: &mut Board, from: Square, to: Square, double: bool, prev_side: Color, prev_last_move: Option<Move>, mv: Move) -> Undo {
    let mover = board.piece_at(from).cloned().expect("apply_normal: mover must be present at from");
    let captured = board.piece_at(to).cloned();
    let mut undo = Undo::new(mv, mover.clone(), prev_side, prev_last_move);
    undo.captured_piece = captured.clone();

    undo.changed.push(ReversalEntry { piece: mover.clone(), prior_pos: from, prior_has_moved: mover.has_moved });
    if let Some(cap) = &captured {
        undo.captured.push(ReversalEntry { piece: cap.clone(), prior_pos: to, prior_has_moved: cap.has_moved });
        board.remove(to);
    }
    board.remove(from);
    let mut moved = mover.clone();
    moved.pos = to;
    moved.has_moved = true;
    board.place(moved);

    clear_rights_on_move(board, mover.color, mover.kind, from);
    if let Some(cap) = &captured {
        clear_rights_on_capture(board, cap.color, cap.kind, to);
    }
    board.en_passant = if double { Some(ep_target_for_double_push(from, to)) } else { None };

    undo
}

fn apply_en_passant(
    board: &mut Board,
    from: Square,
    to: Square,
    captured_sq: Square,
    prev_side: Color,
    prev_last_move: Option<Move>,
    mv: Move,
) -> Undo {
    let mover = board.piece_at(from).cloned().expect("apply_en_passant: mover must be present at from");
    let captured = board.piece_at(captured_sq).cloned().expect("apply_en_passant: captured pawn must be present");
    let mut undo = Undo::new(mv, mover.clone(), prev_side, prev_last_move);
    undo.captured_piece = Some(captured.clone());

    undo.changed.push(ReversalEntry { piece: mover.clone(), prior_pos: from, prior_has_moved: mover.has_moved });
    undo.captured.push(ReversalEntry { piece: captured.clone(), prior_pos: captured_sq, prior_has_moved: captured.has_moved });

    board.remove(captured_sq);
    board.remove(from);
    let mut moved = mover.clone();
    moved.pos = to;
    moved.has_moved = true;
    board.place(moved);

    board.en_passant = None;
    undo
}

fn apply_castle(
    board: &mut Board,
    from: Square,
    to: Square,
    rook_from: Square,
    rook_to: Square,
    prev_side: Color,
    prev_last_move: Option<Move>,
    mv: Move,
) -> Undo {
    let king = board.piece_at(from).cloned().expect("apply_castle: king must be present at from");
    let rook = board.piece_at(rook_from).cloned().expect("apply_castle: rook must be present at rook_from");
    let mut undo = Undo::new(mv, king.clone(), prev_side, prev_last_move);

    undo.changed.push(ReversalEntry { piece: king.clone(), prior_pos: from, prior_has_moved: king.has_moved });
    undo.changed.push(ReversalEntry { piece: rook.clone(), prior_pos: rook_from, prior_has_moved: rook.has_moved });

    board.remove(from);
    board.remove(rook_from);
    let mut moved_king = king.clone();
    moved_king.pos = to;
    moved_king.has_moved = true;
    board.place(moved_king);
    let mut moved_rook = rook.clone();
    moved_rook.pos = rook_to;
    moved_rook.has_moved = true;
    board.place(moved_rook);

    clear_rights_on_move(board, king.color, PieceKind::King, from);
    board.en_passant = None;
    undo
}

fn apply_promotion(
    board: &mut Board,
    from: Square,
    to: Square,
    promote_to: PieceKind,
    prev_side: Color,
    prev_last_move: Option<Move>,
    mv: Move,
) -> Undo {
    let pawn = board.piece_at(from).cloned().expect("apply_promotion: pawn must be present at from");
    let captured = board.piece_at(to).cloned();
    // `undo.mover` is the pre-promotion pawn: Poisoned Dagger and the
    // rest of the rank-comparison matrix must read the pawn's rank
    // even though the board now holds the promoted piece (open question
    // resolved against `PromotionMove.apply`; see DESIGN.md).
    let mut undo = Undo::new(mv, pawn.clone(), prev_side, prev_last_move);
    undo.captured_piece = captured.clone();

    undo.removed.push(ReversalEntry { piece: pawn.clone(), prior_pos: from, prior_has_moved: pawn.has_moved });
    if let Some(cap) = &captured {
        undo.captured.push(ReversalEntry { piece: cap.clone(), prior_pos: to, prior_has_moved: cap.has_moved });
        board.remove(to);
    }
    board.remove(from);

    board.spawn(pawn.color, promote_to, to);
    if let Some(live) = board.piece_at_mut(to) {
        live.has_moved = true;
    }
    undo.added.push(board.piece_at(to).cloned().expect("promoted piece was just placed"));

    if let Some(cap) = &captured {
        clear_rights_on_capture(board, cap.color, cap.kind, to);
    }
    board.en_passant = None;
    undo
}

fn apply_remote_capture(
    board: &mut Board,
    from: Square,
    to: Square,
    origin_sq: Square,
    should_capture: bool,
    prev_side: Color,
    prev_last_move: Option<Move>,
    mv: Move,
) -> Undo {
    let attacker = board.piece_at(from).cloned().expect("apply_remote_capture: attacker must be present at from");
    let mut undo = Undo::new(mv, attacker.clone(), prev_side, prev_last_move);
    undo.changed.push(ReversalEntry { piece: attacker.clone(), prior_pos: from, prior_has_moved: attacker.has_moved });

    if let Some(target) = board.piece_at(to).cloned() {
        if target.color != attacker.color && should_capture {
            undo.captured_piece = Some(target.clone());
            undo.captured.push(ReversalEntry { piece: target.clone(), prior_pos: to, prior_has_moved: target.has_moved });
            board.remove(to);
            clear_rights_on_capture(board, target.color, target.kind, to);
        }
    }

    if let Some(live) = board.piece_at_mut(from) {
        live.has_moved = true;
    }
    let _ = origin_sq;
    board.en_passant = None;
    undo
}

/// Reverse every board mutation `apply_move` made: remove everything in
/// `added`, then restore `removed`, `captured`, and `changed` to their
/// recorded `(pos, has_moved)`. Per-piece `meta` is restored separately
/// by the caller via `Undo::meta_snapshots`.
pub fn unapply(board: &mut Board, undo: &Undo) {
    for p in &undo.added {
        board.remove(p.pos);
    }
    for entry in &undo.removed {
        board.place(entry.piece.clone());
    }
    for entry in &undo.captured {
        board.place(entry.piece.clone());
    }
    for entry in &undo.changed {
        if let Some(mut live) = board.take_by_uid(entry.piece.uid) {
            live.pos = entry.prior_pos;
            live.has_moved = entry.prior_has_moved;
            board.place(live);
        }
    }
    board.castling_rights = undo.prev_castling_rights;
    board.en_passant = undo.prev_en_passant;
}

/// Halfmove clock resets on a pawn move or a capture, else increments;
/// fullmove number increments whenever Black just moved. Stores the
/// pre-update values into `undo` for `restore_clocks`.
pub fn update_clocks(board: &mut Board, prev_side: Color, undo: &mut Undo) {
    undo.prev_halfmove_clock = board.halfmove_clock;
    undo.prev_fullmove_number = board.fullmove_number;

    let resets = undo.captured_piece.is_some() || undo.mover.kind == PieceKind::Pawn;
    if resets {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }
    if prev_side == Color::Black {
        board.fullmove_number += 1;
    }
}

pub fn restore_clocks(board: &mut Board, undo: &Undo) {
    board.halfmove_clock = undo.prev_halfmove_clock;
    board.fullmove_number = undo.prev_fullmove_number;
}
