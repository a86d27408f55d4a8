//! Integration tests for go-uct
//!
//! These exercise the public API end to end: the board, the rollout policy,
//! the search tree, the search driver and the GTP front-end.

use go_uct::board::{Board, Color};
use go_uct::config::SearchConfig;
use go_uct::constants::{N, PASS_MOVE};
use go_uct::features::{GammaModel, NoPrior, PriorModel};
use go_uct::gtp::GtpEngine;
use go_uct::mcts::SearchTree;
use go_uct::playout::play_game;
use go_uct::policy::{PolicyKind, PolicyOptions, generate_move, is_self_atari, policy_moves};
use go_uct::position::{MoveError, Point, Position, parse_coord, str_coord};
use go_uct::search::MctsPlayer;

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn pt(s: &str) -> Point {
    parse_coord(s).unwrap_or_else(|| panic!("bad coordinate {s}"))
}

/// Apply a sequence of moves, alternating colors starting with Black.
/// "pass" can be used to pass.
fn setup_position(moves: &[&str]) -> Position {
    let mut pos = Position::new();
    for mv in moves {
        pos.play_next(pt(mv))
            .unwrap_or_else(|e| panic!("{mv} should be legal: {e}"));
    }
    pos
}

/// Get the far corner coordinate string based on board size.
/// Returns "J9" for 9x9 and "N13" for 13x13.
fn far_corner() -> &'static str {
    if N == 9 { "J9" } else { "N13" }
}

/// A coordinate far away from the lower left, where tests set up shapes.
fn elsewhere() -> &'static str {
    if N == 9 { "H8" } else { "M12" }
}

fn elsewhere2() -> &'static str {
    if N == 9 { "H9" } else { "L12" }
}

fn elsewhere3() -> &'static str {
    if N == 9 { "J8" } else { "K11" }
}

// =============================================================================
// Coordinate parsing and string conversion tests
// =============================================================================

#[test]
fn test_parse_coord_corners() {
    let pos = Position::new();
    let a1 = pt("A1");
    let far = pt(far_corner());
    assert!(pos.is_empty(a1));
    assert!(pos.is_empty(far));
    assert_ne!(a1, far);
    assert_eq!(pos.coord(a1), (N, 1));
    assert_eq!(pos.coord(far), (1, N));
}

#[test]
fn test_parse_coord_skips_i() {
    assert_eq!(pt("J5") - pt("H5"), 1, "J should be one column after H");
    assert_eq!(parse_coord("I5"), None);
}

#[test]
fn test_str_coord_roundtrip() {
    for coord in ["A1", "D4", "G7", "H5", "J5", far_corner()] {
        assert_eq!(str_coord(pt(coord)), coord);
    }
    assert_eq!(parse_coord("PASS"), Some(PASS_MOVE));
    assert_eq!(str_coord(PASS_MOVE), "pass");
}

// =============================================================================
// Board adapter tests
// =============================================================================

#[test]
fn test_play_single_stone() {
    let pos = setup_position(&["D4"]);
    assert_eq!(pos.n, 1);
    assert_eq!(pos.stone_at(pt("D4")), Some(Color::Black));
    assert_eq!(pos.last_move(), Some(pt("D4")));
    assert_eq!(pos.current_player(), Color::White);
}

#[test]
fn test_illegal_move_occupied() {
    let mut pos = setup_position(&["D4"]);
    assert_eq!(pos.play(pt("D4"), Color::White), Err(MoveError::Occupied));
    assert_eq!(pos.n, 1, "a rejected move changes nothing");
}

#[test]
fn test_capture_group() {
    // Two white stones on the edge, captured by E1
    let pos = setup_position(&["B1", "C1", "C2", "D1", "D2", elsewhere(), "E1"]);
    assert!(pos.is_empty(pt("C1")));
    assert!(pos.is_empty(pt("D1")));
    assert_eq!(pos.cap_black, 2);
}

#[test]
fn test_capture_single_stone() {
    let pos = setup_position(&[
        "C4", "D4", "E4", elsewhere(), "D5", elsewhere2(), "D3",
    ]);
    assert!(pos.is_empty(pt("D4")));
    assert_eq!(pos.cap_black, 1);
}

#[test]
fn test_suicide_rejected() {
    let pos = setup_position(&["B1", elsewhere(), "A2"]);
    assert!(!pos.is_legal(pt("A1"), Color::White));
    let mut copy = pos.clone();
    assert_eq!(copy.play(pt("A1"), Color::White), Err(MoveError::Suicide));
}

#[test]
fn test_simple_ko() {
    let mut pos = setup_position(&["C4", "E5", "D5", "E3", "D3", "F4", "E4", "D4"]);
    assert!(pos.is_empty(pt("E4")), "D4 captures E4");
    assert_eq!(pos.play(pt("E4"), Color::Black), Err(MoveError::Ko));
    // A pass elsewhere clears the ko
    pos.play(PASS_MOVE, Color::Black).unwrap();
    pos.play(PASS_MOVE, Color::White).unwrap();
    assert!(pos.is_legal(pt("E4"), Color::Black));
}

#[test]
fn test_copy_is_independent() {
    let original = setup_position(&["D4", "E5"]);
    let legal_before: Vec<Point> = original
        .empty_points()
        .into_iter()
        .filter(|&p| original.is_legal(p, Color::Black))
        .collect();

    let mut copy = original.clone();
    for mv in ["C3", "F6", "C5", "G7"] {
        copy.play_next(pt(mv)).unwrap();
    }

    assert_eq!(original, setup_position(&["D4", "E5"]));
    let legal_after: Vec<Point> = original
        .empty_points()
        .into_iter()
        .filter(|&p| original.is_legal(p, Color::Black))
        .collect();
    assert_eq!(legal_before, legal_after);
    assert_ne!(copy, original);
}

#[test]
fn test_is_eye_true_and_false() {
    // Black eye at B2 surrounded on four sides
    let pos = setup_position(&[
        "B1", elsewhere(), "A2", elsewhere2(), "C2", elsewhere3(), "B3",
    ]);
    assert!(pos.is_eye(pt("B2"), Color::Black));
    assert!(!pos.is_eye(pt("B2"), Color::White));

    // Two white diagonals make it false
    let mut false_eye = pos.clone();
    false_eye.play(pt("C3"), Color::White).unwrap();
    false_eye.play(pt("C1"), Color::White).unwrap();
    assert!(!false_eye.is_eye(pt("B2"), Color::Black));
}

#[test]
fn test_score_empty_board() {
    let pos = Position::new();
    assert_eq!(pos.score(6.5), Color::White);
    assert_eq!(pos.score(-0.5), Color::Black);
}

// =============================================================================
// Policy tests
// =============================================================================

#[test]
fn test_policy_atari_capture_first() {
    let pos = setup_position(&[
        "C4", elsewhere(), "E4", elsewhere2(), "D5", "D4",
    ]);
    let (kind, moves) = policy_moves(&pos, Color::Black, PolicyOptions::default());
    assert_eq!(kind, PolicyKind::AtariCapture);
    assert_eq!(moves, vec![pt("D3")]);

    let mut rng = fastrand::Rng::with_seed(1);
    assert_eq!(
        generate_move(&pos, Color::Black, PolicyOptions::default(), &mut rng),
        Some(pt("D3"))
    );
}

#[test]
fn test_self_atari_detection() {
    // A lone stone with one liberty left is self-atari
    let pos = setup_position(&["B1", elsewhere()]);
    assert!(is_self_atari(&pos, pt("A1"), Color::White));
    // Extending a healthy block is not
    let pos = setup_position(&["E5", elsewhere()]);
    assert!(!is_self_atari(&pos, pt("E4"), Color::Black));
}

#[test]
fn test_random_tier_on_empty_board() {
    let pos = Position::new();
    let (kind, moves) = policy_moves(&pos, Color::Black, PolicyOptions::default());
    assert_eq!(kind, PolicyKind::Random);
    assert_eq!(moves.len(), N * N);
}

// =============================================================================
// Playout tests
// =============================================================================

#[test]
fn test_rollout_stops_after_two_passes() {
    let config = SearchConfig::new().with_rollout_limit(5000);
    let mut rng = fastrand::Rng::with_seed(3);
    let mut pos = Position::new();
    let winner = play_game(&mut pos, Color::Black, &config, &mut rng).unwrap();
    assert_eq!(pos.last_move(), None);
    assert_eq!(pos.last2_move(), None);
    assert_eq!(winner, pos.score(config.komi));
}

// =============================================================================
// Search tree tests
// =============================================================================

#[test]
fn test_priors_sum_to_one() {
    let model: GammaModel = "capture 8\nline_1 0.2\nline_2 0.9\ndist_last_1 3\npass 0.05"
        .parse()
        .unwrap();
    let pos = setup_position(&["E5", "D4"]);
    let mut tree = SearchTree::new();
    let root = tree.root();
    tree.expand(root, &pos, Color::Black, &model);
    let total: f64 = tree
        .root_node()
        .children()
        .iter()
        .map(|&(_, c)| tree.node(c).prior)
        .sum();
    assert!((total - 1.0).abs() < 1e-6);
}

#[test]
fn test_unvisited_child_selected_first() {
    let pos = Position::new();
    let mut tree = SearchTree::new();
    let root = tree.root();
    tree.expand(root, &pos, Color::Black, &NoPrior);
    let children = tree.root_node().children().to_vec();
    // Visit every child but the last with wins
    for &(_, c) in &children[..children.len() - 1] {
        tree.backpropagate(c, 1.0);
    }
    let last = *children.last().unwrap();
    assert_eq!(tree.select(root, 0.0, Color::Black), Some(last));
    assert_eq!(tree.select(root, 1000.0, Color::Black), Some(last));
}

#[test]
fn test_advance_root_clears_parent() {
    let pos = Position::new();
    let config = SearchConfig::new().with_playouts(100).with_rollout_limit(30);
    let mut player = MctsPlayer::with_seed(NoPrior, 10);
    let mv = player.choose_move(&pos, Color::Black, &config).unwrap();
    player.advance_root(mv);
    let tree = player.tree();
    assert!(tree.root_node().parent.is_none());
    assert_eq!(tree.nodes().iter().filter(|n| n.parent.is_none()).count(), 1);
}

#[test]
fn test_black_wins_bounded_by_visits() {
    let pos = setup_position(&["E5", "D4", "F3"]);
    let config = SearchConfig::new().with_playouts(80).with_rollout_limit(40);
    let mut player = MctsPlayer::with_seed(NoPrior, 11);
    player.choose_move(&pos, Color::White, &config).unwrap();
    for node in player.tree().nodes() {
        assert!(node.black_wins <= node.visits as f64);
        assert!(node.black_wins >= 0.0);
    }
    assert_eq!(player.tree().root_node().visits, 80);
}

// =============================================================================
// End-to-end tests
// =============================================================================

#[test]
fn test_choose_move_twice_picks_most_visited() {
    let pos = Position::new();
    let config = SearchConfig::new().with_playouts(50);
    let mut player = MctsPlayer::with_seed(NoPrior, 42);

    player.choose_move(&pos, Color::Black, &config).unwrap();
    let mv = player.choose_move(&pos, Color::Black, &config).unwrap();

    let visits = player.root_visits();
    let max = visits.iter().map(|&(_, v)| v).max().unwrap();
    let chosen = visits.iter().find(|&&(m, _)| m == mv).unwrap().1;
    assert_eq!(chosen, max);
    // The second search continued the same tree
    assert_eq!(player.tree().root_node().visits, 100);
}

#[test]
fn test_gamma_prior_player() {
    let model: Box<dyn PriorModel<Position>> =
        Box::new("line_1 0.01\nline_2 0.5\npass 0.001".parse::<GammaModel>().unwrap());
    let pos = Position::new();
    let config = SearchConfig::new().with_playouts(40).with_rollout_limit(30);
    let mut player = MctsPlayer::with_seed(model, 5);
    let mv = player.choose_move(&pos, Color::Black, &config).unwrap();
    assert!(pos.is_legal(mv, Color::Black));
}

#[test]
fn test_gtp_session() {
    let config = SearchConfig::new().with_playouts(20).with_rollout_limit(30);
    let mut engine = GtpEngine::new(Box::new(NoPrior), config, Some(3));
    let script = format!("boardsize {N}\nclear_board\nkomi 7.5\nplay b D4\n5 genmove w\nquit\n");
    let mut output = Vec::new();
    engine.run_with(script.as_bytes(), &mut output).unwrap();
    let text = String::from_utf8(output).unwrap();
    let replies: Vec<&str> = text.split("\n\n").filter(|r| !r.is_empty()).collect();
    assert_eq!(replies.len(), 6);
    let genmove = replies[4].strip_prefix("=5 ").unwrap();
    assert!(parse_coord(genmove).is_some());
}
