use super::moves::Move;
use super::piece::Piece;
use super::piece::Role;
use super::piece::Side;
use super::rights::Rights;
use super::square::Square;
use serde::Deserialize;
use serde::Serialize;
use std::hash::Hash;
use std::hash::Hasher;

const ORTHO: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAG: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const ADJACENT: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Terminal reading of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    InPlay,
    Checkmate(Side),
    Stalemate,
    Draw(DrawReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    FiftyMoves,
    Repetition,
}

/// Full chess position: piece placement plus every auxiliary flag the
/// rules need (castling rights, the one-ply en passant window, the
/// 50-move clock, and position hashes for threefold repetition).
///
/// Immutable from the outside; apply returns a fresh Board so the session
/// layer can diff and replay without aliasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: Vec<Option<Piece>>,
    turn: Side,
    rights: Rights,
    en_passant: Option<Square>,
    halfmoves: u16,
    fullmoves: u16,
    seen: Vec<u64>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut squares = vec![None; 64];
        let back = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];
        for (i, role) in back.iter().enumerate() {
            squares[i] = Some(Piece::new(Side::White, *role));
            squares[56 + i] = Some(Piece::new(Side::Black, *role));
        }
        for i in 8..16 {
            squares[i] = Some(Piece::new(Side::White, Role::Pawn));
            squares[i + 40] = Some(Piece::new(Side::Black, Role::Pawn));
        }
        let mut board = Self {
            squares,
            turn: Side::White,
            rights: Rights::default(),
            en_passant: None,
            halfmoves: 0,
            fullmoves: 1,
            seen: Vec::new(),
        };
        board.seen.push(board.position_hash());
        board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }
    pub fn fullmoves(&self) -> u16 {
        self.fullmoves
    }
    pub fn at(&self, square: Square) -> Option<Piece> {
        self.squares[u8::from(square) as usize]
    }

    /// every legal move for the side to move
    pub fn legal(&self) -> Vec<Move> {
        Square::all()
            .flat_map(|from| self.pseudo(from))
            .filter(|m| self.is_safe(m))
            .collect()
    }

    /// legal destination squares from one square, for UI highlighting
    pub fn destinations(&self, from: Square) -> Vec<Square> {
        self.legal()
            .into_iter()
            .filter(|m| m.from == from)
            .map(|m| m.to)
            .collect()
    }

    pub fn is_allowed(&self, m: &Move) -> bool {
        if let Some(role) = m.promotion {
            if !matches!(role, Role::Knight | Role::Bishop | Role::Rook | Role::Queen) {
                return false;
            }
            if !self.is_promotion(m) {
                return false;
            }
        }
        self.legal().contains(m)
    }

    /// functional update: validate, then produce the successor position
    pub fn apply(&self, m: Move) -> anyhow::Result<Self> {
        anyhow::ensure!(self.is_allowed(&m), "illegal move: {}", m);
        let mut child = self.clone();
        child.advance(m);
        Ok(child)
    }

    pub fn in_check(&self, side: Side) -> bool {
        self.attacked(self.king(side), side.flip())
    }

    /// timeouts and resignations are judged upstream; this reads only the rules
    pub fn verdict(&self) -> Verdict {
        if self.legal().is_empty() {
            if self.in_check(self.turn) {
                Verdict::Checkmate(self.turn.flip())
            } else {
                Verdict::Stalemate
            }
        } else if self.halfmoves >= 100 {
            Verdict::Draw(DrawReason::FiftyMoves)
        } else if self.repetitions() >= 3 {
            Verdict::Draw(DrawReason::Repetition)
        } else {
            Verdict::InPlay
        }
    }

    /// SAN-style notation for a not-yet-applied move
    pub fn notation(&self, m: &Move) -> String {
        let piece = match self.at(m.from) {
            Some(p) => p,
            None => return m.to_string(),
        };
        if piece.role == Role::King && (m.to.file() - m.from.file()).abs() == 2 {
            return if m.to.file() > m.from.file() {
                "O-O".to_string()
            } else {
                "O-O-O".to_string()
            };
        }
        let takes = self.at(m.to).is_some() || self.is_en_passant(m, &piece);
        let capture = match (takes, piece.role) {
            (false, _) => String::new(),
            (true, Role::Pawn) => format!("{}x", (b'a' + m.from.file() as u8) as char),
            (true, _) => "x".to_string(),
        };
        let promote = match (self.is_promotion(m), m.promotion) {
            (false, _) => String::new(),
            (true, Some(role)) => format!("={}", role.letter()),
            (true, None) => "=Q".to_string(),
        };
        format!("{}{}{}{}", piece.role.letter(), capture, m.to, promote)
    }
}

// move generation
impl Board {
    fn pseudo(&self, from: Square) -> Vec<Move> {
        let piece = match self.at(from) {
            Some(p) if p.side == self.turn => p,
            _ => return Vec::new(),
        };
        match piece.role {
            Role::Pawn => self.pawn_moves(from, piece.side),
            Role::Knight => self.leaper_moves(from, &KNIGHT),
            Role::Bishop => self.slider_moves(from, &DIAG),
            Role::Rook => self.slider_moves(from, &ORTHO),
            Role::Queen => self
                .slider_moves(from, &DIAG)
                .into_iter()
                .chain(self.slider_moves(from, &ORTHO))
                .collect(),
            Role::King => self
                .leaper_moves(from, &ADJACENT)
                .into_iter()
                .chain(self.castle_moves(from))
                .collect(),
        }
    }

    fn pawn_moves(&self, from: Square, side: Side) -> Vec<Move> {
        let mut moves = Vec::new();
        let dir = side.forward();
        if let Some(one) = from.offset(0, dir) {
            if self.at(one).is_none() {
                moves.push(Move::new(from, one));
                if from.rank() == side.pawn_rank() {
                    if let Some(two) = from.offset(0, dir * 2) {
                        if self.at(two).is_none() {
                            moves.push(Move::new(from, two));
                        }
                    }
                }
            }
        }
        for df in [-1, 1] {
            if let Some(to) = from.offset(df, dir) {
                let enemy = self.at(to).is_some_and(|p| p.side != side);
                let en_passant = self.en_passant == Some(to);
                if enemy || en_passant {
                    moves.push(Move::new(from, to));
                }
            }
        }
        moves
    }

    fn leaper_moves(&self, from: Square, offsets: &[(i8, i8)]) -> Vec<Move> {
        offsets
            .iter()
            .filter_map(|(df, dr)| from.offset(*df, *dr))
            .filter(|to| self.at(*to).is_none_or(|p| p.side != self.turn))
            .map(|to| Move::new(from, to))
            .collect()
    }

    fn slider_moves(&self, from: Square, rays: &[(i8, i8)]) -> Vec<Move> {
        let mut moves = Vec::new();
        for (df, dr) in rays {
            let mut square = from;
            while let Some(to) = square.offset(*df, *dr) {
                match self.at(to) {
                    None => moves.push(Move::new(from, to)),
                    Some(p) => {
                        if p.side != self.turn {
                            moves.push(Move::new(from, to));
                        }
                        break;
                    }
                }
                square = to;
            }
        }
        moves
    }

    fn castle_moves(&self, from: Square) -> Vec<Move> {
        let side = self.turn;
        let home = match side {
            Side::White => 4u8,
            Side::Black => 60u8,
        };
        if u8::from(from) != home || self.in_check(side) {
            return Vec::new();
        }
        let mut moves = Vec::new();
        // short: f and g files empty, king path not attacked
        if self.rights.short(side)
            && self.clear(&[home + 1, home + 2])
            && self.safe_path(side, &[home + 1, home + 2])
        {
            moves.push(Move::new(from, Square::from(home + 2)));
        }
        // long: b, c, d files empty, king crosses d and c only
        if self.rights.long(side)
            && self.clear(&[home - 1, home - 2, home - 3])
            && self.safe_path(side, &[home - 1, home - 2])
        {
            moves.push(Move::new(from, Square::from(home - 2)));
        }
        moves
    }

    fn clear(&self, squares: &[u8]) -> bool {
        squares.iter().all(|s| self.at(Square::from(*s)).is_none())
    }
    fn safe_path(&self, side: Side, squares: &[u8]) -> bool {
        squares
            .iter()
            .all(|s| !self.attacked(Square::from(*s), side.flip()))
    }

    /// simulate and reject any move that leaves the mover's own king attacked
    fn is_safe(&self, m: &Move) -> bool {
        let mut child = self.clone();
        child.advance(*m);
        !child.attacked(child.king(self.turn), self.turn.flip())
    }
}

// attack detection
impl Board {
    fn king(&self, side: Side) -> Square {
        Square::all()
            .find(|s| self.at(*s) == Some(Piece::new(side, Role::King)))
            .expect("king always on board")
    }

    fn attacked(&self, square: Square, by: Side) -> bool {
        let pawn = [-1, 1].iter().any(|df| {
            square
                .offset(*df, -by.forward())
                .and_then(|s| self.at(s))
                .is_some_and(|p| p == Piece::new(by, Role::Pawn))
        });
        let leap = |offsets: &[(i8, i8)], role: Role| {
            offsets.iter().any(|(df, dr)| {
                square
                    .offset(*df, *dr)
                    .and_then(|s| self.at(s))
                    .is_some_and(|p| p == Piece::new(by, role))
            })
        };
        let slide = |rays: &[(i8, i8)], role: Role| {
            rays.iter().any(|(df, dr)| {
                let mut s = square;
                while let Some(next) = s.offset(*df, *dr) {
                    match self.at(next) {
                        None => s = next,
                        Some(p) => {
                            return p.side == by && (p.role == role || p.role == Role::Queen);
                        }
                    }
                }
                false
            })
        };
        pawn || leap(&KNIGHT, Role::Knight)
            || leap(&ADJACENT, Role::King)
            || slide(&DIAG, Role::Bishop)
            || slide(&ORTHO, Role::Rook)
    }
}

// state transition
impl Board {
    fn is_promotion(&self, m: &Move) -> bool {
        self.at(m.from)
            .is_some_and(|p| p.role == Role::Pawn && m.to.rank() == p.side.last_rank())
    }
    fn is_en_passant(&self, m: &Move, piece: &Piece) -> bool {
        piece.role == Role::Pawn && self.en_passant == Some(m.to) && m.from.file() != m.to.file()
    }

    /// mutate in place; legality is the caller's responsibility
    fn advance(&mut self, m: Move) {
        let from = u8::from(m.from) as usize;
        let to = u8::from(m.to) as usize;
        let piece = self.squares[from].expect("moving piece exists");
        let capture = self.squares[to].is_some();
        // en passant takes the pawn beside the destination
        if self.is_en_passant(&m, &piece) {
            let taken = m
                .to
                .offset(0, -piece.side.forward())
                .expect("en passant target on board");
            self.squares[u8::from(taken) as usize] = None;
        }
        // castling drags the rook across the king
        if piece.role == Role::King && (m.to.file() - m.from.file()).abs() == 2 {
            let (rook_from, rook_to) = if m.to.file() > m.from.file() {
                (to + 1, to - 1)
            } else {
                (to - 2, to + 1)
            };
            self.squares[rook_to] = self.squares[rook_from].take();
        }
        // the one-ply en passant window
        self.en_passant = if piece.role == Role::Pawn && (m.to.rank() - m.from.rank()).abs() == 2 {
            m.from.offset(0, piece.side.forward())
        } else {
            None
        };
        // rights shrink on king or rook movement, and on rook capture
        if piece.role == Role::King {
            self.rights.revoke_all(piece.side);
        }
        if piece.role == Role::Rook {
            self.rights.revoke_rook(from as u8);
        }
        if capture {
            self.rights.revoke_rook(to as u8);
        }
        let placed = if self.is_promotion(&m) {
            Piece::new(piece.side, m.promotion.unwrap_or(Role::Queen))
        } else {
            piece
        };
        let irreversible = piece.role == Role::Pawn || capture;
        self.squares[to] = Some(placed);
        self.squares[from] = None;
        self.halfmoves = if irreversible { 0 } else { self.halfmoves + 1 };
        if self.turn == Side::Black {
            self.fullmoves += 1;
        }
        self.turn = self.turn.flip();
        // positions before an irreversible move can never recur
        if irreversible {
            self.seen.clear();
        }
        self.seen.push(self.position_hash());
    }

    fn repetitions(&self) -> usize {
        let current = self.seen.last().expect("hash pushed on every move");
        self.seen.iter().filter(|h| *h == current).count()
    }

    /// the en passant window only distinguishes repeated positions when a
    /// pawn is actually placed to use it
    fn live_en_passant(&self) -> Option<Square> {
        self.en_passant.filter(|ep| {
            [-1, 1].iter().any(|df| {
                ep.offset(*df, -self.turn.forward())
                    .and_then(|s| self.at(s))
                    .is_some_and(|p| p == Piece::new(self.turn, Role::Pawn))
            })
        })
    }

    fn position_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.squares.hash(&mut hasher);
        self.turn.hash(&mut hasher);
        self.rights.hash(&mut hasher);
        self.live_en_passant().hash(&mut hasher);
        hasher.finish()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                match self.squares[rank * 8 + file] {
                    Some(p) => write!(f, "{} ", p)?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(board: Board, moves: &[&str]) -> Board {
        moves.iter().fold(board, |b, m| {
            b.apply(Move::try_from(*m).unwrap())
                .unwrap_or_else(|e| panic!("{}: {}", m, e))
        })
    }

    #[test]
    fn twenty_openings() {
        assert_eq!(Board::new().legal().len(), 20);
    }

    #[test]
    fn movegen_is_color_symmetric() {
        // a quiet rook-pawn push leaves black the mirrored twenty openings
        let board = play(Board::new(), &["a2a3"]);
        assert_eq!(board.turn(), Side::Black);
        assert_eq!(board.legal().len(), 20);
    }

    #[test]
    fn apply_switches_turn() {
        let board = play(Board::new(), &["e2e4"]);
        assert_eq!(board.turn(), Side::Black);
        assert!(board.at(Square::try_from("e4").unwrap()).is_some());
        assert!(board.at(Square::try_from("e2").unwrap()).is_none());
    }

    #[test]
    fn illegal_moves_are_rejected() {
        let board = Board::new();
        assert!(board.apply(Move::try_from("e2e5").unwrap()).is_err());
        assert!(board.apply(Move::try_from("e7e5").unwrap()).is_err());
        assert!(board.apply(Move::try_from("d1h5").unwrap()).is_err());
    }

    #[test]
    fn sliders_stop_at_first_occupied() {
        let board = play(Board::new(), &["e2e4", "e7e5"]);
        let queen = Square::try_from("d1").unwrap();
        let reachable = board.destinations(queen);
        assert!(reachable.contains(&Square::try_from("h5").unwrap()));
        assert!(!reachable.contains(&Square::try_from("d8").unwrap()));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        // after e4 e5 Bb5, the d7 pawn is pinned against the king
        let board = play(Board::new(), &["e2e4", "e7e5", "f1b5"]);
        assert!(board.destinations(Square::try_from("d7").unwrap()).is_empty());
    }

    #[test]
    fn scholars_mate() {
        let board = play(Board::new(), &["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6", "h5f7"]);
        assert_eq!(board.verdict(), Verdict::Checkmate(Side::White));
        assert!(board.legal().is_empty());
    }

    #[test]
    fn en_passant_window_lasts_one_ply() {
        // white pawn reaches e5, black answers d7d5: exd6 available exactly now
        let board = play(Board::new(), &["e2e4", "a7a6", "e4e5", "d7d5"]);
        let takes = Move::try_from("e5d6").unwrap();
        assert!(board.is_allowed(&takes));
        // any other move closes the window
        let later = play(board, &["b1c3", "a6a5"]);
        assert!(!later.is_allowed(&takes));
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let board = play(Board::new(), &["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"]);
        assert!(board.at(Square::try_from("d5").unwrap()).is_none());
        assert!(board.at(Square::try_from("d6").unwrap()).is_some());
    }

    #[test]
    fn castling_short() {
        let board = play(Board::new(), &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"]);
        let castle = Move::try_from("e1g1").unwrap();
        assert_eq!(board.notation(&castle), "O-O");
        let board = board.apply(castle).unwrap();
        let rook = board.at(Square::try_from("f1").unwrap()).unwrap();
        assert_eq!(rook.role, Role::Rook);
        let king = board.at(Square::try_from("g1").unwrap()).unwrap();
        assert_eq!(king.role, Role::King);
    }

    #[test]
    fn castling_revoked_by_king_move() {
        let board = play(
            Board::new(),
            &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5", "e1e2", "d7d6", "e2e1", "c8d7"],
        );
        assert!(!board.is_allowed(&Move::try_from("e1g1").unwrap()));
    }

    #[test]
    fn castling_denied_through_attacked_square() {
        // black knight lands on h2 and covers f1 while e1/h1 are unmoved
        let board = play(
            Board::new(),
            &["e2e4", "g8h6", "g1f3", "h6g4", "f1c4", "g4h2", "d2d3", "a7a6"],
        );
        assert!(!board.in_check(Side::White));
        assert!(!board.is_allowed(&Move::try_from("e1g1").unwrap()));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let board = play(
            Board::new(),
            &["a2a4", "b7b5", "a4b5", "b8c6", "b5b6", "a8b8", "b6a7", "c6d4"],
        );
        let board = board.apply(Move::try_from("a7b8").unwrap()).unwrap();
        let piece = board.at(Square::try_from("b8").unwrap()).unwrap();
        assert_eq!(piece.role, Role::Queen);
    }

    #[test]
    fn underpromotion_is_honored() {
        let board = play(
            Board::new(),
            &["a2a4", "b7b5", "a4b5", "b8c6", "b5b6", "a8b8", "b6a7", "c6d4"],
        );
        let board = board.apply(Move::try_from("a7b8n").unwrap()).unwrap();
        let piece = board.at(Square::try_from("b8").unwrap()).unwrap();
        assert_eq!(piece.role, Role::Knight);
    }

    #[test]
    fn threefold_repetition_draw() {
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        let mut board = Board::new();
        for _ in 0..2 {
            board = play(board, &shuffle);
        }
        assert_eq!(board.verdict(), Verdict::Draw(DrawReason::Repetition));
    }

    #[test]
    fn dead_en_passant_window_does_not_break_repetition() {
        // the double step opens a window no black pawn can use, so the
        // position right after it counts toward the later repetitions
        let shuffle = ["g8f6", "b1c3", "f6g8", "c3b1"];
        let mut board = play(Board::new(), &["e2e4"]);
        for _ in 0..2 {
            board = play(board, &shuffle);
        }
        assert_eq!(board.verdict(), Verdict::Draw(DrawReason::Repetition));
    }

    #[test]
    fn notation_samples() {
        let board = Board::new();
        assert_eq!(board.notation(&Move::try_from("g1f3").unwrap()), "Nf3");
        assert_eq!(board.notation(&Move::try_from("e2e4").unwrap()), "e4");
        let board = play(board, &["e2e4", "d7d5"]);
        assert_eq!(board.notation(&Move::try_from("e4d5").unwrap()), "exd5");
    }

    #[test]
    fn check_detection() {
        let board = play(Board::new(), &["e2e4", "f7f6", "d1h5"]);
        assert!(board.in_check(Side::Black));
        assert!(board.verdict() == Verdict::InPlay);
    }
}
