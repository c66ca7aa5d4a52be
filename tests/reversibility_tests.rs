// tests/reversibility_tests.rs
//
// Undo reversibility, Zobrist soundness, and monotonicity of the
// arcane resource pools across push/pop.

use arcanum::arcane::{Ability, AbilityScope, DefaultDecisions, Element, Item, Loadout, PlayerConfig};
use arcanum::board::{Board, Color, PieceKind};
use arcanum::game::Game;
use arcanum::moves::Move;

fn inert(element: Element) -> PlayerConfig {
    PlayerConfig { element, items: Default::default(), loadout: Default::default() }
}

#[test]
fn pushing_then_popping_every_move_restores_the_exact_starting_snapshot() {
    let mut game = Game::new_chess_only();
    let before_board = game.board().clone();
    let before_hash = game.zobrist_hash();

    let moves = game.legal_moves(Color::White);
    let mut pushed = 0;
    for mv in moves.into_iter().take(5) {
        game.push(mv).unwrap();
        pushed += 1;
    }
    assert!(pushed > 0);
    assert_ne!(game.board(), &before_board);

    for _ in 0..pushed {
        game.pop().unwrap();
    }

    assert_eq!(game.board(), &before_board);
    assert_eq!(game.side_to_move(), Color::White);
    assert_eq!(game.zobrist_hash(), before_hash);
    assert_eq!(game.zobrist_hash(), game.recompute_hash());
}

#[test]
fn zobrist_hash_always_agrees_with_a_full_recompute() {
    let mut game = Game::new_chess_only();
    for _ in 0..6 {
        let color = game.side_to_move();
        let mv = game.legal_moves(color).into_iter().next().expect("starting game never runs out of moves this shallow");
        game.push(mv).unwrap();
        assert_eq!(game.zobrist_hash(), game.recompute_hash());
    }
    for _ in 0..6 {
        game.pop().unwrap();
        assert_eq!(game.zobrist_hash(), game.recompute_hash());
    }
}

#[test]
fn current_hash_always_has_at_least_one_repetition_recorded() {
    let mut game = Game::new_chess_only();
    assert!(game.is_threefold_repetition() == false);
    for _ in 0..4 {
        let color = game.side_to_move();
        let mv = game.legal_moves(color).into_iter().next().unwrap();
        game.push(mv).unwrap();
    }
    // a freshly-reached position has been seen at least once by definition
    game.pop().unwrap();
    game.pop().unwrap();
    assert_eq!(game.zobrist_hash(), game.recompute_hash());
}

#[test]
fn pop_never_changes_monotonic_resource_pools() {
    let mut loadout = Loadout::default();
    loadout.abilities.push((Ability::Redo, AbilityScope::Army));
    let white = PlayerConfig { element: Element::Water, items: [Item::Multitasker].into_iter().collect(), loadout };
    let black = inert(Element::Fire);

    let mut game = Game::new(white, black, Box::new(DefaultDecisions), 1337).unwrap();

    let redo_before = game.arcane().redo_charges.clone();
    let solar_before = game.arcane().solar_uses.clone();
    let necro_before = game.arcane().necro_bonus.clone();

    let mv = {
        let color = game.side_to_move();
        game.legal_moves(color).into_iter().next().unwrap()
    };
    game.push(mv).unwrap();
    game.pop().unwrap();

    assert_eq!(game.arcane().redo_charges, redo_before);
    assert_eq!(game.arcane().solar_uses, solar_before);
    assert_eq!(game.arcane().necro_bonus, necro_before);
}

// A plain Normal-move capture must leave the capturing side's graveyard
// exactly as it was before `push`, with no phantom entry surviving
// `pop` (the graveyard push must not happen before the arcane-undoable
// snapshot it is reversed by).
#[test]
fn undoing_a_capture_restores_both_graveyards_exactly() {
    let mut board = Board::new_empty();
    board.spawn(Color::White, PieceKind::King, "e1".parse().unwrap());
    board.spawn(Color::Black, PieceKind::King, "e8".parse().unwrap());
    board.spawn(Color::White, PieceKind::Pawn, "e4".parse().unwrap());
    board.spawn(Color::Black, PieceKind::Knight, "d5".parse().unwrap());

    let mut game = Game::with_board(board, inert(Element::Earth), inert(Element::Earth), Box::new(DefaultDecisions), 1337).unwrap();

    assert!(game.graveyard(Color::White).is_empty());
    assert!(game.graveyard(Color::Black).is_empty());

    let capture = game
        .legal_moves(Color::White)
        .into_iter()
        .find(|m| matches!(m, Move::Normal { .. }) && m.to_sq() == "d5".parse().unwrap())
        .expect("the e4 pawn should be able to capture the d5 knight");
    game.push(capture).unwrap();

    assert_eq!(game.graveyard(Color::Black).len(), 1, "the captured knight should be recorded once");
    assert!(game.graveyard(Color::White).is_empty());

    game.pop().unwrap();

    assert!(game.graveyard(Color::White).is_empty(), "undo must not leave a phantom graveyard entry");
    assert!(game.graveyard(Color::Black).is_empty(), "undo must remove the graveyard entry the capture added");
}

// Poisoned Dagger firing on a Normal-move capturer (the mover itself,
// not a promoted or remote piece) must still fully reverse: the mover
// was already recorded in `Undo.changed` before Dagger removed it from
// the board, so burying it must fold that entry into `captured` rather
// than append a second, colliding reversal entry for the same square.
#[test]
fn poisoned_dagger_on_a_normal_capture_is_fully_reversible() {
    let white = inert(Element::Earth);
    let black = PlayerConfig {
        element: Element::Earth,
        items: [Item::PoisonedDagger].into_iter().collect(),
        loadout: Loadout::default(),
    };

    let mut board = Board::new_empty();
    board.spawn(Color::White, PieceKind::King, "e1".parse().unwrap());
    board.spawn(Color::Black, PieceKind::King, "e8".parse().unwrap());
    board.spawn(Color::White, PieceKind::Pawn, "e4".parse().unwrap());
    board.spawn(Color::Black, PieceKind::Knight, "d5".parse().unwrap());
    let before_board = board.clone();

    let mut game = Game::with_board(board, white, black, Box::new(DefaultDecisions), 1337).unwrap();

    let capture = game
        .legal_moves(Color::White)
        .into_iter()
        .find(|m| matches!(m, Move::Normal { .. }) && m.to_sq() == "d5".parse().unwrap())
        .expect("the e4 pawn should be able to capture the d5 knight");
    game.push(capture).unwrap();

    // rank(Pawn=1) <= rank(Knight=3), so the dagger fires and removes
    // the pawn right back off d5.
    assert!(game.board().piece_at("d5".parse().unwrap()).is_none(), "poisoned dagger should kill the capturing pawn");
    assert!(game.board().piece_at("e4".parse().unwrap()).is_none(), "the pawn is gone, not back at its origin yet");

    game.pop().unwrap();

    assert_eq!(game.board(), &before_board, "undo must restore both the knight and the daggered pawn to their original squares");
}

#[test]
fn solar_topup_only_ever_increases_its_target_pool() {
    use arcanum::arcane::SolarTarget;

    let white = PlayerConfig { element: Element::Earth, items: [Item::Solar].into_iter().collect(), loadout: Loadout::default() };
    let black = inert(Element::Earth);
    let mut game = Game::new(white, black, Box::new(DefaultDecisions), 1337).unwrap();

    let before = game.arcane().necro_pool.get(&Color::White).copied().unwrap_or(0);
    game.arcane_mut().spend_solar(Color::White, SolarTarget::NecromancerPool(Color::White)).unwrap();
    let after = game.arcane().necro_pool.get(&Color::White).copied().unwrap_or(0);
    assert_eq!(after, before + 1);
}
