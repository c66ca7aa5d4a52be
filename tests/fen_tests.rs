// tests/fen_tests.rs
//
// The FEN facade's round-trip property: parse then serialize a
// standard FEN yields the input back, for positions covering every
// field (placement, side to move, partial castling rights, en
// passant, clocks).

use arcanum::fen;

#[test]
fn standard_starting_fen_round_trips() {
    let input = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let (board, side) = fen::parse(input).unwrap();
    assert_eq!(fen::to_fen(&board, side), input);
}

#[test]
fn black_to_move_with_en_passant_round_trips() {
    let input = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2";
    let (board, side) = fen::parse(input).unwrap();
    assert_eq!(fen::to_fen(&board, side), input);
}

#[test]
fn partial_castling_rights_round_trip() {
    let input = "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 12 30";
    let (board, side) = fen::parse(input).unwrap();
    assert_eq!(fen::to_fen(&board, side), input);
}

#[test]
fn no_castling_rights_serializes_to_a_dash() {
    let input = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";
    let (board, side) = fen::parse(input).unwrap();
    assert_eq!(fen::to_fen(&board, side), input);
}

#[test]
fn malformed_fen_fields_are_rejected() {
    assert!(fen::parse("not a fen").is_err());
    assert!(fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
    assert!(fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN w KQkq - 0 1").is_err());
}
