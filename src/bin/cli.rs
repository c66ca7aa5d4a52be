// src/bin/cli.rs
//
// Demo driver: perft sweeps over well-known FEN positions and a
// one-shot position inspector. Not a UCI engine; there is no search
// loop here, only the movegen/rule pipeline plus the material-only
// evaluator for display purposes.

use std::time::Instant;

use arcanum::arcane::{DefaultDecisions, Element, PlayerConfig};
use arcanum::eval::evaluate_material;
use arcanum::fen;
use arcanum::game::Game;
use arcanum::moves::perft::{perft, perft_divide};
use indicatif::{ProgressBar, ProgressStyle};

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn main() {
    arcanum::logger::init_logging("logs/arcanum.log", "info");

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("perft") => {
            let depth: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
            run_perft_sweep(depth);
        }
        Some("divide") => {
            let depth: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
            run_divide(STARTPOS, depth);
        }
        Some("fen") => {
            let fen_str = args.next().unwrap_or_else(|| STARTPOS.to_string());
            run_fen_demo(&fen_str);
        }
        _ => {
            println!("usage:");
            println!("  arcanum perft [depth]      sweep perft over startpos and kiwipete");
            println!("  arcanum divide [depth]     perft divide over startpos");
            println!("  arcanum fen [<fen-string>] load a position and list its legal moves");
        }
    }
}

fn inert(element: Element) -> PlayerConfig {
    PlayerConfig { element, items: Default::default(), loadout: Default::default() }
}

fn load(fen_str: &str) -> Option<Game> {
    let (board, side) = match fen::parse(fen_str) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("bad fen '{fen_str}': {e}");
            return None;
        }
    };
    Game::with_board_and_side(board, side, inert(Element::Earth), inert(Element::Earth), Box::new(DefaultDecisions), 1337)
        .map_err(|e| eprintln!("could not build game: {e}"))
        .ok()
}

fn run_perft_sweep(max_depth: u32) {
    let positions = [("startpos", STARTPOS, max_depth), ("kiwipete", KIWIPETE, max_depth.min(4))];
    let bar = ProgressBar::new(positions.len() as u64);
    bar.set_style(ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} positions ({elapsed})").unwrap());

    for (label, fen_str, depth_cap) in positions {
        println!("-- {label} --");
        let Some(mut game) = load(fen_str) else {
            bar.inc(1);
            continue;
        };

        for depth in 1..=depth_cap {
            let start = Instant::now();
            let nodes = perft(&mut game, depth);
            println!("  depth {depth}: {nodes} nodes in {:?}", start.elapsed());
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
}

fn run_divide(fen_str: &str, depth: u32) {
    let Some(mut game) = load(fen_str) else { return };
    for (uci, nodes) in perft_divide(&mut game, depth) {
        println!("{uci}: {nodes}");
    }
}

fn run_fen_demo(fen_str: &str) {
    let Some(mut game) = load(fen_str) else { return };

    println!("{}", game.board());
    println!("side to move: {:?}", game.side_to_move());
    println!("material eval (White's perspective): {}", evaluate_material(&game));

    let side = game.side_to_move();
    let moves = game.legal_moves(side);
    println!("{} legal moves", moves.len());
    for mv in &moves {
        print!("{} ", mv.to_uci());
    }
    println!();
}
